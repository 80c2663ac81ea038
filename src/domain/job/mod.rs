//! Job lifecycle: status changes, chaining inside a schedule, resends and
//! gas price escalation of pending jobs.
mod job_manager;
pub use job_manager::*;

mod retry;
pub use retry::*;
