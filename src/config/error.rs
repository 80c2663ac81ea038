//! Error types for configuration system.
//!
//! Variant messages name the offending chain or faucet.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Duplicate entry: {0}")]
    DuplicateId(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}
