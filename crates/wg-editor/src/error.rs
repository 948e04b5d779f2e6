use thiserror::Error;
use wg_core::{BindingError, ElementId, GatewayError, SceneError, ValidationError};

/// Everything an editor operation can refuse with. The editor state is
/// unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    #[error("saved component {0} not found")]
    TemplateNotFound(ElementId),

    #[error("a generation request is already in flight")]
    RequestInFlight,
}

impl From<SceneError> for EditorError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::ElementNotFound(id) => EditorError::ElementNotFound(id),
            SceneError::Binding(e) => EditorError::Binding(e),
            SceneError::ContentOnComponent(_) | SceneError::NotBasicKind(_) => {
                EditorError::Validation(ValidationError(err.to_string()))
            }
        }
    }
}

impl EditorError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        EditorError::Validation(ValidationError(message.into()))
    }
}
