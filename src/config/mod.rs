//! Configuration system for the orchestrator.
//!
//! This module handles:
//! - Environment variable integration
//! - Loading and parsing the config file
//! - Configuration validation
//!
//! # Structure
//!
//! Configuration is organized into sections:
//! - Chains: Networks transaction requests are sent to
//! - Faucets: Accounts pre-funding senders on those networks
mod server_config;
pub use server_config::*;

mod config_file;
pub use config_file::*;

mod error;
pub use error::*;
