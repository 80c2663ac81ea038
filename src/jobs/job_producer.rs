//! Job producer module for enqueueing messages to Redis queues.
//!
//! Provides functionality for producing:
//! - Job start messages
//! - Raw transaction re-dispatch messages
//! - Notification messages

use crate::{
    jobs::{JobMessage, JobMessageType, NotificationSend, Queue, ResendTransaction, StartJob},
    models::OrchestratorError,
};
use apalis::prelude::Storage;
use apalis_redis::RedisError;
use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error, Serialize, Clone, PartialEq)]
pub enum JobProducerError {
    #[error("Queue error: {0}")]
    QueueError(String),
}

impl From<RedisError> for JobProducerError {
    fn from(error: RedisError) -> Self {
        JobProducerError::QueueError(error.to_string())
    }
}

impl From<JobProducerError> for OrchestratorError {
    fn from(error: JobProducerError) -> Self {
        OrchestratorError::DependencyFailure(error.to_string())
    }
}

#[derive(Debug)]
pub struct JobProducer {
    queue: Mutex<Queue>,
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait JobProducerTrait: Send + Sync {
    async fn produce_start_job(
        &self,
        start_job: StartJob,
        scheduled_on: Option<i64>,
    ) -> Result<(), JobProducerError>;

    async fn produce_resend_tx_job(
        &self,
        resend_job: ResendTransaction,
        scheduled_on: Option<i64>,
    ) -> Result<(), JobProducerError>;

    async fn produce_send_notification_job(
        &self,
        notification_send_job: NotificationSend,
        scheduled_on: Option<i64>,
    ) -> Result<(), JobProducerError>;
}

impl JobProducer {
    pub fn new(queue: Queue) -> Self {
        Self {
            queue: Mutex::new(queue),
        }
    }

    pub async fn get_queue(&self) -> Result<Queue, JobProducerError> {
        let queue = self.queue.lock().await;

        Ok(queue.clone())
    }
}

#[async_trait]
impl JobProducerTrait for JobProducer {
    async fn produce_start_job(
        &self,
        start_job: StartJob,
        scheduled_on: Option<i64>,
    ) -> Result<(), JobProducerError> {
        debug!("Producing start job message for job {}", start_job.job.uuid);
        let mut queue = self.queue.lock().await;
        let job_uuid = start_job.job.uuid.clone();
        let message = JobMessage::new(JobMessageType::JobStart, start_job);

        match scheduled_on {
            Some(scheduled_on) => {
                queue.start_job_queue.schedule(message, scheduled_on).await?;
            }
            None => {
                queue.start_job_queue.push(message).await?;
            }
        }
        info!("Start job message produced for job {}", job_uuid);

        Ok(())
    }

    async fn produce_resend_tx_job(
        &self,
        resend_job: ResendTransaction,
        scheduled_on: Option<i64>,
    ) -> Result<(), JobProducerError> {
        let mut queue = self.queue.lock().await;
        let job_uuid = resend_job.job_uuid.clone();
        let message = JobMessage::new(JobMessageType::TransactionResend, resend_job);

        match scheduled_on {
            Some(on) => {
                queue.resend_tx_queue.schedule(message, on).await?;
            }
            None => {
                queue.resend_tx_queue.push(message).await?;
            }
        }
        info!("Resend transaction message produced for job {}", job_uuid);

        Ok(())
    }

    async fn produce_send_notification_job(
        &self,
        notification_send_job: NotificationSend,
        scheduled_on: Option<i64>,
    ) -> Result<(), JobProducerError> {
        let mut queue = self.queue.lock().await;
        let message = JobMessage::new(JobMessageType::NotificationSend, notification_send_job);

        match scheduled_on {
            Some(on) => {
                queue.notification_queue.schedule(message, on).await?;
            }
            None => {
                queue.notification_queue.push(message).await?;
            }
        }

        info!("Notification Send job produced successfully");
        Ok(())
    }
}
