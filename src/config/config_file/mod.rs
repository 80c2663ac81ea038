//! This module provides functionality for loading and validating the
//! orchestrator configuration file.
//!
//! The file declares the chains requests are sent to and the faucets able to
//! pre-fund accounts on them. It is validated as a whole before any entry
//! reaches a repository.
//!
//! # Modules
//! - `chain`: Chain entries.
//! - `faucet`: Faucet entries and their chain references.
//!
//! # Usage
//! Load a configuration file using `load_config`, which parses the file and
//! validates its contents.
use crate::config::ConfigFileError;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs};

mod chain;
pub use chain::*;

mod faucet;
pub use faucet::*;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub chains: Vec<ChainFileConfig>,
    #[serde(default)]
    pub faucets: Vec<FaucetFileConfig>,
}

impl Config {
    /// Validates chains, faucets and the references between them.
    ///
    /// # Errors
    /// Returns a `ConfigFileError` if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        validate_chains(&self.chains)?;

        let chain_uuids: HashSet<&str> = self.chains.iter().map(|c| c.uuid.as_str()).collect();
        validate_faucets(&self.faucets, &chain_uuids)?;

        Ok(())
    }
}

/// Loads and validates a configuration file from the specified path.
///
/// # Errors
/// Returns a `ConfigFileError` if the file cannot be read, parsed, or if the
/// configuration is invalid.
pub fn load_config(config_file_path: &str) -> Result<Config, ConfigFileError> {
    let config_str = fs::read_to_string(config_file_path)?;
    let config: Config = serde_json::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}
