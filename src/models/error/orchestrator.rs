use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the orchestrator and the job lifecycle manager.
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum OrchestratorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dependency failure: {0}")]
    DependencyFailure(String),

    #[error("Data corrupted: {0}")]
    DataCorrupted(String),
}

impl OrchestratorError {
    /// Prefixes the message with the name of the component re-raising the error.
    /// The variant is kept so callers can still match on the error kind.
    pub fn extend(self, component: &str) -> Self {
        match self {
            OrchestratorError::InvalidParameter(msg) => {
                OrchestratorError::InvalidParameter(format!("{}: {}", component, msg))
            }
            OrchestratorError::AlreadyExists(msg) => {
                OrchestratorError::AlreadyExists(format!("{}: {}", component, msg))
            }
            OrchestratorError::NotFound(msg) => {
                OrchestratorError::NotFound(format!("{}: {}", component, msg))
            }
            OrchestratorError::DependencyFailure(msg) => {
                OrchestratorError::DependencyFailure(format!("{}: {}", component, msg))
            }
            OrchestratorError::DataCorrupted(msg) => {
                OrchestratorError::DataCorrupted(format!("{}: {}", component, msg))
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, OrchestratorError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, OrchestratorError::AlreadyExists(_))
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, OrchestratorError::InvalidParameter(_))
    }

    pub fn is_dependency_failure(&self) -> bool {
        matches!(self, OrchestratorError::DependencyFailure(_))
    }
}
