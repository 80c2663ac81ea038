//! Job model: one discrete on-chain submission attempt within a schedule.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

use crate::utils::generate_uuid;

mod status;
pub use status::*;

mod transaction;
pub use transaction::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum JobType {
    #[serde(rename = "eth://ethereum/transaction")]
    #[strum(serialize = "eth://ethereum/transaction")]
    EthereumTransaction,
    #[serde(rename = "eth://ethereum/rawTransaction")]
    #[strum(serialize = "eth://ethereum/rawTransaction")]
    EthereumRawTransaction,
    #[serde(rename = "eth://eea/privateTransaction")]
    #[strum(serialize = "eth://eea/privateTransaction")]
    EeaPrivateTransaction,
    #[serde(rename = "eth://eea/markingTransaction")]
    #[strum(serialize = "eth://eea/markingTransaction")]
    EeaMarkingTransaction,
    #[serde(rename = "eth://tessera/privateTransaction")]
    #[strum(serialize = "eth://tessera/privateTransaction")]
    TesseraPrivateTransaction,
    #[serde(rename = "eth://tessera/markingTransaction")]
    #[strum(serialize = "eth://tessera/markingTransaction")]
    TesseraMarkingTransaction,
}

impl JobType {
    pub fn is_marking(&self) -> bool {
        matches!(
            self,
            JobType::EeaMarkingTransaction | JobType::TesseraMarkingTransaction
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InternalData {
    pub chain_id: u64,
    pub one_time_key: bool,
    /// Set on funding jobs and retry clones.
    pub parent_job_uuid: Option<String>,
    pub retry_interval_ms: Option<u64>,
    pub gas_price_increment: Option<f64>,
    /// Maximum bump over `base_gas_price`, as a fraction.
    pub gas_price_limit: Option<f64>,
    /// Gas price (or fee cap) of the first job of a retry family.
    pub base_gas_price: Option<u128>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobLog {
    pub status: JobStatus,
    pub message: String,
    pub created_at: String,
}

impl JobLog {
    pub fn new(status: JobStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub uuid: String,
    pub next_job_uuid: Option<String>,
    pub schedule_uuid: String,
    pub chain_uuid: String,
    pub tenant_id: String,
    pub owner_id: Option<String>,
    pub job_type: JobType,
    pub status: JobStatus,
    pub labels: HashMap<String, String>,
    pub transaction: EthTransaction,
    pub internal_data: InternalData,
    pub logs: Vec<JobLog>,
    pub created_at: String,
    pub updated_at: String,
}

impl Job {
    pub fn new(
        schedule_uuid: impl Into<String>,
        chain_uuid: impl Into<String>,
        job_type: JobType,
        tenant_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            uuid: generate_uuid(),
            next_job_uuid: None,
            schedule_uuid: schedule_uuid.into(),
            chain_uuid: chain_uuid.into(),
            tenant_id: tenant_id.into(),
            owner_id: None,
            job_type,
            status: JobStatus::Created,
            labels: HashMap::new(),
            transaction: EthTransaction::default(),
            internal_data: InternalData::default(),
            logs: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn with_transaction(mut self, transaction: EthTransaction) -> Self {
        self.transaction = transaction;
        self
    }

    pub fn with_internal_data(mut self, internal_data: InternalData) -> Self {
        self.internal_data = internal_data;
        self
    }

    pub fn with_owner(mut self, owner_id: Option<String>) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the status and appends the matching log entry.
    pub fn apply_status(&mut self, status: JobStatus, message: impl Into<String>) {
        self.status = status;
        self.logs.push(JobLog::new(status, message));
        self.updated_at = Utc::now().to_rfc3339();
    }

    pub fn is_child(&self) -> bool {
        self.internal_data.parent_job_uuid.is_some()
    }

    /// Whether the job may be picked up by a gas escalation session.
    /// Child jobs are excluded even when they carry a retry interval.
    pub fn should_be_retried(&self) -> bool {
        !self.is_child() && self.internal_data.retry_interval_ms.is_some()
    }

    pub fn tx_hash(&self) -> Option<&str> {
        self.transaction.tx_hash.as_deref()
    }
}

/// Partial update applied by the job lifecycle manager.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub message: Option<String>,
    pub transaction: Option<EthTransaction>,
    pub labels: Option<HashMap<String, String>>,
}

impl JobUpdate {
    pub fn status(status: JobStatus, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_transaction(mut self, transaction: EthTransaction) -> Self {
        self.transaction = Some(transaction);
        self
    }
}

/// Speed-up or cancel request for a pending job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryJobRequest {
    /// Fractional gas price bump, `0.1` means +10%.
    pub gas_increment: f64,
    /// Replacement call data; an empty string cancels the original call.
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub statuses: Option<Vec<JobStatus>>,
    pub chain_uuid: Option<String>,
    pub schedule_uuid: Option<String>,
    pub tx_hashes: Option<Vec<String>>,
    pub parent_job_uuid: Option<String>,
    pub tenant_ids: Option<Vec<String>>,
    pub only_parents: bool,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&job.status) {
                return false;
            }
        }
        if let Some(chain_uuid) = &self.chain_uuid {
            if &job.chain_uuid != chain_uuid {
                return false;
            }
        }
        if let Some(schedule_uuid) = &self.schedule_uuid {
            if &job.schedule_uuid != schedule_uuid {
                return false;
            }
        }
        if let Some(tx_hashes) = &self.tx_hashes {
            match job.tx_hash() {
                Some(hash) if tx_hashes.iter().any(|h| h.eq_ignore_ascii_case(hash)) => {}
                _ => return false,
            }
        }
        if let Some(parent) = &self.parent_job_uuid {
            if job.internal_data.parent_job_uuid.as_ref() != Some(parent) {
                return false;
            }
        }
        if let Some(tenants) = &self.tenant_ids {
            if !tenants.contains(&job.tenant_id) {
                return false;
            }
        }
        if self.only_parents && job.is_child() {
            return false;
        }
        true
    }
}
