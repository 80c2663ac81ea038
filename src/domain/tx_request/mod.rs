//! Transaction request intake: pipelines, raw transaction decoding and the
//! orchestrator tying them to the job lifecycle.
mod orchestrator;
pub use orchestrator::*;

mod pipeline;
pub use pipeline::*;

mod raw;
pub use raw::*;
