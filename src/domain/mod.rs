//! # Domain Module
//!
//! Core logic of the orchestrator:
//!
//! * Transaction request intake and idempotency
//! * Job lifecycle and gas price escalation

pub mod job;
pub use job::*;

pub mod tx_request;
pub use tx_request::*;
