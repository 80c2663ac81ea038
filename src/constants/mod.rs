//! This module contains all the constant values used in the system
mod authorization;
pub use authorization::*;

mod job;
pub use job::*;

mod queue;
pub use queue::*;

mod validation;
pub use validation::*;
