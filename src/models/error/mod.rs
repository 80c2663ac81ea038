mod repository;
pub use repository::*;

mod orchestrator;
pub use orchestrator::*;

mod tracker;
pub use tracker::*;
