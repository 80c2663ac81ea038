pub const START_JOB_QUEUE: &str = "start_job_queue";
pub const RESEND_TX_QUEUE: &str = "resend_tx_queue";
pub const NOTIFICATION_QUEUE: &str = "notification_queue";

pub const QUEUE_MAX_RETRIES: usize = 5;
