//! Host error types.

use crate::config::ConfigError;
use thiserror::Error;

/// Host errors.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] animstate_core::CoreError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("graph error in '{path}': {source}")]
    Graph {
        path: String,
        #[source]
        source: animstate_core::CoreError,
    },
}

impl HostError {
    /// Returns whether the error points at user input (config or graph file).
    pub fn is_user_error(&self) -> bool {
        match self {
            HostError::Io(_) => false,
            HostError::Core(e) => e.is_load_error(),
            HostError::Config(_) => true,
            HostError::Graph { .. } => true,
        }
    }
}
