/// Minimum gas price bump for a replacement transaction to be accepted by the pool (10%).
pub const MIN_BUMP_PERCENT: u128 = 10;

pub const JOB_CREATED_MESSAGE: &str = "job created";
pub const JOB_STARTED_MESSAGE: &str = "job started";
pub const JOB_RESENDING_MESSAGE: &str = "resending transaction";

pub const JOB_UPDATE_EVENT: &str = "job_update";
