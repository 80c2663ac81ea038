//! This module provides the `JobNotifier` reporting job status changes to the
//! notification queue.
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use thiserror::Error;

use crate::{
    jobs::{JobProducerError, JobProducerTrait},
    models::{produce_job_update_notification_payload, Job, OrchestratorError},
};

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotifierError {
    #[error("Failed to queue notification: {0}")]
    QueueError(String),
}

impl From<JobProducerError> for NotifierError {
    fn from(error: JobProducerError) -> Self {
        NotifierError::QueueError(error.to_string())
    }
}

impl From<NotifierError> for OrchestratorError {
    fn from(error: NotifierError) -> Self {
        OrchestratorError::DependencyFailure(error.to_string())
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait NotifierTrait: Send + Sync {
    async fn notify_job_update(&self, job: &Job) -> Result<(), NotifierError>;
}

pub struct JobNotifier<J: JobProducerTrait> {
    job_producer: Arc<J>,
    notification_id: String,
}

impl<J: JobProducerTrait> JobNotifier<J> {
    pub fn new(job_producer: Arc<J>, notification_id: impl Into<String>) -> Self {
        Self {
            job_producer,
            notification_id: notification_id.into(),
        }
    }
}

#[async_trait]
impl<J: JobProducerTrait> NotifierTrait for JobNotifier<J> {
    async fn notify_job_update(&self, job: &Job) -> Result<(), NotifierError> {
        debug!("Queueing {} notification for job {}", job.status, job.uuid);
        let notification = produce_job_update_notification_payload(&self.notification_id, job);
        self.job_producer
            .produce_send_notification_job(notification, None)
            .await?;
        Ok(())
    }
}
