//! Queue message envelope and payloads.
//!
//! Provides the envelope shared by every queue and the payloads produced by
//! the job lifecycle manager:
//! - Job start requests
//! - Raw transaction re-dispatch
//! - Notifications
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::Display;
use uuid::Uuid;

use crate::models::{Job, WebhookNotification};

// Common message structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobMessage<T> {
    pub message_id: String,
    pub version: String,
    pub timestamp: String,
    pub message_type: JobMessageType,
    pub data: T,
}

impl<T> JobMessage<T> {
    pub fn new(message_type: JobMessageType, data: T) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            version: "1.0".to_string(),
            timestamp: Utc::now().timestamp().to_string(),
            message_type,
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobMessageType {
    JobStart,
    TransactionResend,
    NotificationSend,
}

/// Request to execute a job: the consumer crafts, signs and sends its transaction.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StartJob {
    pub job: Job,
    pub metadata: Option<HashMap<String, String>>,
}

impl StartJob {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Request to push an already signed payload to the network again.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResendTransaction {
    pub job_uuid: String,
    pub chain_uuid: String,
    pub raw: String,
    pub tx_hash: Option<String>,
}

impl ResendTransaction {
    pub fn new(
        job_uuid: impl Into<String>,
        chain_uuid: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            job_uuid: job_uuid.into(),
            chain_uuid: chain_uuid.into(),
            raw: raw.into(),
            tx_hash: None,
        }
    }

    pub fn with_tx_hash(mut self, tx_hash: Option<String>) -> Self {
        self.tx_hash = tx_hash;
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NotificationSend {
    pub notification_id: String,
    pub notification: WebhookNotification,
}

impl NotificationSend {
    pub fn new(notification_id: String, notification: WebhookNotification) -> Self {
        Self {
            notification_id,
            notification,
        }
    }
}
