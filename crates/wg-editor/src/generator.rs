//! Generator session: one outstanding generate request at a time.
//!
//! The page disables its Generate button while a request is out; this is
//! the same guard as state. A session moves
//! `Idle → Pending → Ready | Failed`, and a new `begin` is refused with
//! [`EditorError::RequestInFlight`] while one is pending. There is no
//! cancellation.
//!
//! `begin`/`finish` split the call for asynchronous transports (the wasm
//! bridge resolves a JS promise in between); `run` does both around a
//! synchronous [`ComponentGateway`].

use crate::error::EditorError;
use wg_core::gateway::{GenerateRequest, GenerateResponse, validate_generate_output};
use wg_core::{ComponentGateway, GatewayError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GeneratorState {
    #[default]
    Idle,
    Pending(GenerateRequest),
    Ready {
        result: GenerateResponse,
        saved: bool,
    },
    Failed(GatewayError),
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorSession {
    state: GeneratorState,
}

impl GeneratorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, GeneratorState::Pending(_))
    }

    /// The last successful result, if any.
    pub fn result(&self) -> Option<&GenerateResponse> {
        match &self.state {
            GeneratorState::Ready { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Start a request. Clears any previous result.
    pub fn begin(&mut self, description: &str) -> Result<GenerateRequest, EditorError> {
        if self.is_pending() {
            return Err(EditorError::RequestInFlight);
        }
        let request = GenerateRequest::new(description)?;
        log::debug!("generate: \"{}\"", request.description);
        self.state = GeneratorState::Pending(request.clone());
        Ok(request)
    }

    /// Complete the pending request with the gateway's outcome.
    pub fn finish(
        &mut self,
        outcome: Result<GenerateResponse, GatewayError>,
    ) -> Result<GenerateResponse, EditorError> {
        if !self.is_pending() {
            return Err(EditorError::validation("No generation request is in flight."));
        }
        match outcome.and_then(|r| validate_generate_output(&r).map(|()| r)) {
            Ok(result) => {
                self.state = GeneratorState::Ready {
                    result: result.clone(),
                    saved: false,
                };
                Ok(result)
            }
            Err(e) => {
                log::warn!("generation failed: {e}");
                self.state = GeneratorState::Failed(e.clone());
                Err(e.into())
            }
        }
    }

    /// `begin`, call the gateway, `finish`.
    pub fn run<G: ComponentGateway + ?Sized>(
        &mut self,
        gateway: &G,
        description: &str,
    ) -> Result<GenerateResponse, EditorError> {
        let request = self.begin(description)?;
        let outcome = gateway.generate(&request);
        self.finish(outcome)
    }

    /// The result to save, refusing when there is none or it was already saved.
    pub(crate) fn savable(&self) -> Result<&GenerateResponse, EditorError> {
        match &self.state {
            GeneratorState::Ready { saved: true, .. } => {
                Err(EditorError::validation("This component is already saved."))
            }
            GeneratorState::Ready { result, .. } => Ok(result),
            _ => Err(EditorError::validation("No component to save.")),
        }
    }

    pub(crate) fn mark_saved(&mut self) {
        if let GeneratorState::Ready { saved, .. } = &mut self.state {
            *saved = true;
        }
    }
}
