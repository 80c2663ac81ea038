//! Notification payloads emitted when a job reaches a reportable status.
//!
//! Payloads are queued through the job producer; delivery to the webhook or
//! stream transport happens in a separate worker.

mod response;
pub use response::*;

mod webhook_notification;
pub use webhook_notification::*;
