//! Core error types.

use thiserror::Error;

/// Errors from loading state graphs and binding instances to them.
///
/// Structural mutations (`add_state`, `add_transition`) and trigger queries
/// report rejection through their `bool` result instead.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("state not found: {state}")]
    UnknownState { state: String },

    #[error("transition '{trigger}' from '{from}' targets unknown state '{to}'")]
    DanglingTransition {
        from: String,
        trigger: String,
        to: String,
    },

    #[error("document has no layers")]
    MissingLayers,

    #[error("first layer has no stateMachine")]
    MissingStateMachine,

    #[error("graph has no default state")]
    NoInitialState,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Returns a stable error code for logs and host-side reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::UnknownState { .. } => "UNKNOWN_STATE",
            CoreError::DanglingTransition { .. } => "DANGLING_TRANSITION",
            CoreError::MissingLayers => "BAD_DOCUMENT",
            CoreError::MissingStateMachine => "BAD_DOCUMENT",
            CoreError::NoInitialState => "NO_INITIAL_STATE",
            CoreError::Json(_) => "BAD_DOCUMENT",
        }
    }

    /// Returns true if the error came from the shape or content of a loaded document.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            CoreError::DanglingTransition { .. }
                | CoreError::MissingLayers
                | CoreError::MissingStateMachine
                | CoreError::Json(_)
        )
    }
}
