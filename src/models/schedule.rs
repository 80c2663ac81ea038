use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{models::Job, utils::generate_uuid};

/// Ordered aggregate of jobs executed one after the other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub uuid: String,
    pub tenant_id: String,
    pub owner_id: Option<String>,
    pub jobs: Vec<Job>,
    pub created_at: String,
}

impl Schedule {
    pub fn new(tenant_id: impl Into<String>, owner_id: Option<String>) -> Self {
        Self {
            uuid: generate_uuid(),
            tenant_id: tenant_id.into(),
            owner_id,
            jobs: Vec::new(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Replaces the job list and derives every `next_job_uuid` from its order.
    pub fn link_jobs(&mut self, mut jobs: Vec<Job>) {
        let next_uuids: Vec<Option<String>> = jobs
            .iter()
            .skip(1)
            .map(|job| Some(job.uuid.clone()))
            .chain(std::iter::once(None))
            .collect();

        for (job, next) in jobs.iter_mut().zip(next_uuids) {
            job.schedule_uuid = self.uuid.clone();
            job.next_job_uuid = next;
        }

        self.jobs = jobs;
    }

    pub fn first_job(&self) -> Option<&Job> {
        self.jobs.first()
    }

    /// Storage view of the schedule: the job rows are kept separately.
    pub fn without_jobs(&self) -> Self {
        Self {
            jobs: Vec::new(),
            ..self.clone()
        }
    }
}
