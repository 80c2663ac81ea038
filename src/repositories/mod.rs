//! # Repository Module
//!
//! Implements the data persistence layer of the orchestrator using the Repository pattern.

mod store;
pub use store::*;

mod chain;
pub use chain::*;

mod faucet;
pub use faucet::*;
