//! Initialization routines for the orchestrator
//!
//! This module contains functions for initializing the components of the
//! orchestrator: configuration, application state and trackers.
//!
//! # Submodules
//!
//! - `config_processor`: Functions for processing configuration files
//! - `initialize_app_state`: Functions for initializing application state
//! - `initialize_trackers`: Functions for rebuilding trackers from the job store
mod config_processor;
pub use config_processor::*;

mod initialize_app_state;
pub use initialize_app_state::*;

mod initialize_trackers;
pub use initialize_trackers::*;
