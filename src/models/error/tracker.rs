use serde::Serialize;
use thiserror::Error;

use crate::models::OrchestratorError;

#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum TrackerError {
    #[error("Entry already tracked: {0}")]
    AlreadyExists(String),

    #[error("Entry not tracked: {0}")]
    NotFound(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
}

impl From<TrackerError> for OrchestratorError {
    fn from(error: TrackerError) -> Self {
        match error {
            TrackerError::AlreadyExists(msg) => OrchestratorError::AlreadyExists(msg),
            TrackerError::NotFound(msg) => OrchestratorError::NotFound(msg),
            TrackerError::InvalidEntry(msg) => OrchestratorError::InvalidParameter(msg),
        }
    }
}
