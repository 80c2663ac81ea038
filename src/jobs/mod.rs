/// This module handles job queue operations.
mod queue;
pub use queue::*;

/// This module is responsible for producing jobs.
mod job_producer;
pub use job_producer::*;

/// This module defines the message envelope and payloads.
mod job;
pub use job::*;
