pub mod editor;
pub mod error;
pub mod generator;
pub mod library;

pub use editor::{Editor, SceneMutation};
pub use error::EditorError;
pub use generator::{GeneratorSession, GeneratorState};
pub use library::Library;
