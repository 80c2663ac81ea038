//! Outgoing representation of a job, as carried by notifications.
use crate::models::{EthTransaction, Job, JobStatus, JobType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JobResponse {
    pub uuid: String,
    pub schedule_uuid: String,
    pub chain_uuid: String,
    pub tenant_id: String,
    pub owner_id: Option<String>,
    pub job_type: JobType,
    pub status: JobStatus,
    pub labels: HashMap<String, String>,
    pub transaction: EthTransaction,
    pub parent_job_uuid: Option<String>,
    /// Message of the latest log entry.
    pub message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            message: job.logs.last().map(|log| log.message.clone()),
            uuid: job.uuid,
            schedule_uuid: job.schedule_uuid,
            chain_uuid: job.chain_uuid,
            tenant_id: job.tenant_id,
            owner_id: job.owner_id,
            job_type: job.job_type,
            status: job.status,
            labels: job.labels,
            transaction: job.transaction,
            parent_job_uuid: job.internal_data.parent_job_uuid,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}
