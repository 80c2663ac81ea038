//! # Models Module
//!
//! Contains core data structures and type definitions for the orchestrator.

mod app_state;
pub use app_state::*;

mod chain;
pub use chain::*;

mod error;
pub use error::*;

mod faucet;
pub use faucet::*;

mod job;
pub use job::*;

mod notification;
pub use notification::*;

mod schedule;
pub use schedule::*;

mod tx_request;
pub use tx_request::*;

mod user_info;
pub use user_info::*;
