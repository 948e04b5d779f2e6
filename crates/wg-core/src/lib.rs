pub mod binding;
pub mod config;
pub mod error;
pub mod export;
pub mod gateway;
pub mod id;
pub mod lint;
pub mod markup;
pub mod model;
pub mod scene;
pub mod storage;
pub mod style;

pub use binding::{PropertyEdit, apply_property_edit, render};
pub use config::{ElementDefaults, ExportConfig, FontChoice};
pub use error::{BindingError, GatewayError, SceneError, StorageError, ValidationError};
pub use export::export_static_document;
pub use gateway::ComponentGateway;
pub use id::ElementId;
pub use lint::{LintDiagnostic, LintSeverity, lint_template};
pub use model::*;
pub use scene::Scene;
pub use storage::{KeyValueStore, MemoryStore, PersistedState, load_state};
