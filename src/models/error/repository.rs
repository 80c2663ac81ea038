use thiserror::Error;

use crate::models::OrchestratorError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

impl From<RepositoryError> for OrchestratorError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(msg) => OrchestratorError::NotFound(msg),
            RepositoryError::AlreadyExists(msg) => OrchestratorError::AlreadyExists(msg),
            RepositoryError::ConstraintViolation(msg) => OrchestratorError::InvalidParameter(msg),
            RepositoryError::Conflict(msg) => OrchestratorError::InvalidParameter(msg),
            RepositoryError::InvalidData(msg) => OrchestratorError::DataCorrupted(msg),
            RepositoryError::Unknown(msg) => OrchestratorError::DependencyFailure(msg),
        }
    }
}
