//! # Services Module
//!
//! Collaborators of the job lifecycle manager and the orchestrator.

mod notification;
pub use notification::*;

mod faucet;
pub use faucet::*;

mod tracker;
pub use tracker::*;
