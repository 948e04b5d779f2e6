use crate::id::ElementId;
use crate::model::{ElementKind, PropertyKind};
use thiserror::Error;

/// Errors from the template binding engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("property '{id}' of kind {kind} not found")]
    PropertyNotFound { id: String, kind: PropertyKind },

    #[error("element {0} is not a component")]
    NotAComponent(ElementId),
}

/// Errors from scene operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    #[error("cannot set content of component {0}; edit its properties instead")]
    ContentOnComponent(ElementId),

    #[error("{0} elements are created from a saved template")]
    NotBasicKind(ElementKind),

    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Errors from the AI generation gateway. No state is committed on any of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway transport failed: {0}")]
    Transport(String),

    #[error("model output could not be decoded: {0}")]
    Decode(String),

    #[error("model output rejected: {0}")]
    InvalidResponse(String),
}

/// Errors from the key/value persistence layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("stored entry '{key}' is not valid JSON: {message}")]
    Parse { key: String, message: String },

    #[error("could not encode entry '{key}': {message}")]
    Encode { key: String, message: String },

    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// User input rejected before any state changes (empty description, empty name).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);
