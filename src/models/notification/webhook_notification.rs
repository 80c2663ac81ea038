use crate::{
    constants::JOB_UPDATE_EVENT,
    jobs::NotificationSend,
    models::{Job, JobResponse},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WebhookNotification {
    pub id: String,
    pub event: String,
    pub payload: WebhookPayload,
    pub timestamp: String,
}

impl WebhookNotification {
    pub fn new(event: String, payload: WebhookPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event,
            payload,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "payload_type")]
pub enum WebhookPayload {
    Job(Box<JobResponse>),
}

pub fn produce_job_update_notification_payload(
    notification_id: &str,
    job: &Job,
) -> NotificationSend {
    let job_payload: JobResponse = job.clone().into();
    NotificationSend::new(
        notification_id.to_string(),
        WebhookNotification::new(
            JOB_UPDATE_EVENT.to_string(),
            WebhookPayload::Job(Box::new(job_payload)),
        ),
    )
}
