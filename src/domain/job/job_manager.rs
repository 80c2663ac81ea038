//! Job lifecycle manager.
//!
//! Owns every status change of a job. Each mutation that must reach a
//! consumer is published to the queue first and committed after, with the
//! previous status as an optimistic check, so a message is never lost
//! behind a committed status.
use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use dashmap::DashSet;
use log::{debug, error, info, warn};

use crate::{
    constants::{JOB_CREATED_MESSAGE, JOB_RESENDING_MESSAGE, JOB_STARTED_MESSAGE},
    domain::job::{bump_fees, BumpedFees},
    jobs::{JobProducerTrait, ResendTransaction, StartJob},
    models::{
        EthTransaction, InternalData, Job, JobLog, JobStatus, JobType, JobUpdate,
        OrchestratorError, RetryJobRequest, UserInfo,
    },
    repositories::{DbTransaction, Store},
    services::NotifierTrait,
};

#[cfg(test)]
use mockall::automock;

const COMPONENT: &str = "job_manager";

#[async_trait]
#[cfg_attr(test, automock)]
pub trait JobManagerTrait: Send + Sync {
    /// Stages the insertion of `job` in status CREATED and returns it as staged.
    fn stage_create(&self, db_tx: &mut DbTransaction, job: Job) -> Job;

    /// Inserts `job` into an existing schedule.
    async fn create(&self, job: Job, user: &UserInfo) -> Result<Job, OrchestratorError>;

    /// Moves a CREATED job to STARTED and hands it to the job consumer.
    async fn start(&self, job_uuid: &str, user: &UserInfo) -> Result<Job, OrchestratorError>;

    /// Starts the job following `job` in its schedule, if any.
    async fn start_next(
        &self,
        job: &Job,
        user: &UserInfo,
    ) -> Result<Option<Job>, OrchestratorError>;

    async fn update(
        &self,
        job_uuid: &str,
        update: JobUpdate,
        user: &UserInfo,
    ) -> Result<Job, OrchestratorError>;

    /// Re-dispatches the signed payload of a pending job.
    async fn resend_tx(&self, job_uuid: &str, user: &UserInfo) -> Result<Job, OrchestratorError>;

    /// Creates and starts a replacement of a pending job with a higher gas price.
    async fn retry_tx(
        &self,
        job_uuid: &str,
        request: RetryJobRequest,
        user: &UserInfo,
    ) -> Result<Job, OrchestratorError>;
}

/// Released when dropped, whatever path the claiming call returns through.
struct JobClaim<'a> {
    claims: &'a DashSet<String>,
    job_uuid: String,
}

impl Drop for JobClaim<'_> {
    fn drop(&mut self) {
        self.claims.remove(&self.job_uuid);
    }
}

pub struct JobManager<S, J, N>
where
    S: Store,
    J: JobProducerTrait,
    N: NotifierTrait,
{
    store: Arc<S>,
    job_producer: Arc<J>,
    notifier: Arc<N>,
    in_flight: DashSet<String>,
}

impl<S, J, N> JobManager<S, J, N>
where
    S: Store,
    J: JobProducerTrait,
    N: NotifierTrait,
{
    pub fn new(store: Arc<S>, job_producer: Arc<J>, notifier: Arc<N>) -> Self {
        Self {
            store,
            job_producer,
            notifier,
            in_flight: DashSet::new(),
        }
    }

    fn claim(&self, job_uuid: &str) -> Result<JobClaim<'_>, OrchestratorError> {
        if !self.in_flight.insert(job_uuid.to_string()) {
            return Err(OrchestratorError::InvalidParameter(format!(
                "job {} is already being processed",
                job_uuid
            )));
        }
        Ok(JobClaim {
            claims: &self.in_flight,
            job_uuid: job_uuid.to_string(),
        })
    }

    async fn find_job(&self, job_uuid: &str, user: &UserInfo) -> Result<Job, OrchestratorError> {
        self.store
            .find_job_by_uuid(job_uuid, user.tenant_filter())
            .await
            .map_err(|e| OrchestratorError::from(e).extend(COMPONENT))
    }

    async fn commit(&self, db_tx: DbTransaction) -> Result<(), OrchestratorError> {
        self.store
            .commit(db_tx)
            .await
            .map_err(|e| OrchestratorError::from(e).extend(COMPONENT))
    }

    async fn commit_update(
        &self,
        job: Job,
        expected_status: JobStatus,
    ) -> Result<(), OrchestratorError> {
        let mut db_tx = DbTransaction::new();
        db_tx.update_job(job, Some(expected_status));
        self.commit(db_tx).await
    }

    async fn publish_start(&self, start_job: StartJob) -> Result<(), OrchestratorError> {
        let job_uuid = start_job.job.uuid.clone();
        self.job_producer
            .produce_start_job(start_job, None)
            .await
            .map_err(|e| {
                error!("Failed to queue start of job {}: {}", job_uuid, e);
                OrchestratorError::from(e).extend(COMPONENT)
            })
    }

    /// Copies the enclave key of the private job into its marking job.
    async fn prepare_marking_job(
        &self,
        private_job: &Job,
        marking_job: &mut Job,
    ) -> Result<(), OrchestratorError> {
        let enclave_key = private_job.transaction.enclave_key.clone().ok_or_else(|| {
            OrchestratorError::DataCorrupted(format!(
                "private job {} has no enclave key",
                private_job.uuid
            ))
        })?;

        marking_job.transaction.data = Some(enclave_key);
        self.commit_update(marking_job.clone(), JobStatus::Created)
            .await
    }

    /// Starts the job following `job` once `job` is final. The caller's
    /// status change is already committed, so a failure here is only logged;
    /// re-sending the final status starts the next job again.
    async fn start_next_or_log(&self, job: &Job, user: &UserInfo) {
        if let Err(e) = self.start_next(job, user).await {
            error!(
                "Job {} is {} but its next job was not started: {}",
                job.uuid, job.status, e
            );
        }
    }
}

fn into_created(mut job: Job) -> Job {
    job.status = JobStatus::Created;
    job.logs = vec![JobLog::new(JobStatus::Created, JOB_CREATED_MESSAGE)];
    job.updated_at = job.created_at.clone();
    job
}

fn retry_metadata(retry: &Job, original: &Job) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert("retried_job_uuid".to_string(), original.uuid.clone());
    if let Some(parent) = &retry.internal_data.parent_job_uuid {
        metadata.insert("parent_job_uuid".to_string(), parent.clone());
    }
    metadata
}

/// Transaction of a replacement: same call, fresh signature and pricing.
fn retry_transaction(
    original: &EthTransaction,
    request: &RetryJobRequest,
    fees: &BumpedFees,
) -> EthTransaction {
    let data = match request.data.as_deref() {
        Some("") => None,
        Some(data) => Some(data.to_string()),
        None => original.data.clone(),
    };

    EthTransaction {
        gas_price: fees.gas_price,
        gas_fee_cap: fees.gas_fee_cap,
        gas_tip_cap: fees.gas_tip_cap,
        data,
        raw: None,
        tx_hash: None,
        enclave_key: None,
        ..original.clone()
    }
}

#[async_trait]
impl<S, J, N> JobManagerTrait for JobManager<S, J, N>
where
    S: Store,
    J: JobProducerTrait,
    N: NotifierTrait,
{
    fn stage_create(&self, db_tx: &mut DbTransaction, job: Job) -> Job {
        let job = into_created(job);
        db_tx.insert_job(job.clone());
        job
    }

    async fn create(&self, job: Job, user: &UserInfo) -> Result<Job, OrchestratorError> {
        if !user.can_access(&job.tenant_id) {
            return Err(OrchestratorError::NotFound(format!(
                "{}: schedule {} not found",
                COMPONENT, job.schedule_uuid
            )));
        }
        self.store
            .find_schedule_by_uuid(&job.schedule_uuid, user.tenant_filter())
            .await
            .map_err(|e| OrchestratorError::from(e).extend(COMPONENT))?;

        let mut db_tx = DbTransaction::new();
        let job = self.stage_create(&mut db_tx, job);
        self.commit(db_tx).await?;

        debug!("Job {} created in schedule {}", job.uuid, job.schedule_uuid);
        Ok(job)
    }

    async fn start(&self, job_uuid: &str, user: &UserInfo) -> Result<Job, OrchestratorError> {
        let _claim = self.claim(job_uuid)?;
        let job = self.find_job(job_uuid, user).await?;

        if job.status != JobStatus::Created {
            return Err(OrchestratorError::InvalidParameter(format!(
                "job {} cannot be started from status {}",
                job.uuid, job.status
            )));
        }

        let mut started = job;
        started.apply_status(JobStatus::Started, JOB_STARTED_MESSAGE);

        self.publish_start(StartJob::new(started.clone())).await?;
        self.commit_update(started.clone(), JobStatus::Created)
            .await
            .inspect_err(|e| error!("Job {} queued but not marked started: {}", job_uuid, e))?;

        info!("Job {} started ({})", started.uuid, started.job_type);
        Ok(started)
    }

    async fn start_next(
        &self,
        job: &Job,
        user: &UserInfo,
    ) -> Result<Option<Job>, OrchestratorError> {
        let Some(next_uuid) = job.next_job_uuid.as_deref() else {
            return Ok(None);
        };

        let mut next = self.find_job(next_uuid, user).await?;
        if next.status != JobStatus::Created {
            debug!("Next job {} already {}, not starting it", next.uuid, next.status);
            return Ok(None);
        }

        if next.job_type.is_marking() {
            self.prepare_marking_job(job, &mut next).await?;
        }

        self.start(&next.uuid, user).await.map(Some)
    }

    async fn update(
        &self,
        job_uuid: &str,
        update: JobUpdate,
        user: &UserInfo,
    ) -> Result<Job, OrchestratorError> {
        let mut job = self.find_job(job_uuid, user).await?;
        let previous_status = job.status;

        if update.status == Some(previous_status) && previous_status.is_successful_final() {
            debug!("Job {} already {}, checking its next job", job.uuid, previous_status);
            self.start_next_or_log(&job, user).await;
            return Ok(job);
        }

        if let Some(status) = update.status {
            if !previous_status.can_transition_to(status) {
                return Err(OrchestratorError::InvalidParameter(format!(
                    "job {} cannot move from {} to {}",
                    job.uuid, previous_status, status
                )));
            }
        }

        if let Some(transaction) = update.transaction {
            job.transaction
                .merge(transaction, previous_status.is_submitted())
                .map_err(|e| e.extend(COMPONENT))?;
        }

        if let Some(labels) = update.labels {
            job.labels.extend(labels);
        }

        match (update.status, update.message) {
            (Some(status), message) => job.apply_status(
                status,
                message.unwrap_or_else(|| format!("job status changed to {}", status)),
            ),
            (None, Some(message)) => job.apply_status(previous_status, message),
            (None, None) => {}
        }

        self.commit_update(job.clone(), previous_status).await?;
        debug!("Job {} updated to {}", job.uuid, job.status);

        if job.status != previous_status && job.status.is_notifiable() {
            if let Err(e) = self.notifier.notify_job_update(&job).await {
                warn!("Failed to notify update of job {}: {}", job.uuid, e);
            }
        }

        if job.status != previous_status && job.status.is_successful_final() {
            self.start_next_or_log(&job, user).await;
        }

        Ok(job)
    }

    async fn resend_tx(&self, job_uuid: &str, user: &UserInfo) -> Result<Job, OrchestratorError> {
        let _claim = self.claim(job_uuid)?;
        let job = self.find_job(job_uuid, user).await?;

        if !matches!(job.status, JobStatus::Pending | JobStatus::Warning) {
            return Err(OrchestratorError::InvalidParameter(format!(
                "job {} cannot be resent from status {}",
                job.uuid, job.status
            )));
        }
        let raw = job.transaction.raw.clone().ok_or_else(|| {
            OrchestratorError::InvalidParameter(format!(
                "job {} has no signed transaction to resend",
                job.uuid
            ))
        })?;

        let previous_status = job.status;
        let mut resending = job;
        resending.apply_status(JobStatus::Resending, JOB_RESENDING_MESSAGE);

        let message = ResendTransaction::new(&resending.uuid, &resending.chain_uuid, raw)
            .with_tx_hash(resending.transaction.tx_hash.clone());
        self.job_producer
            .produce_resend_tx_job(message, None)
            .await
            .map_err(|e| {
                error!("Failed to queue resend of job {}: {}", job_uuid, e);
                OrchestratorError::from(e).extend(COMPONENT)
            })?;
        self.commit_update(resending.clone(), previous_status).await?;

        info!("Job {} transaction resent", resending.uuid);
        Ok(resending)
    }

    async fn retry_tx(
        &self,
        job_uuid: &str,
        request: RetryJobRequest,
        user: &UserInfo,
    ) -> Result<Job, OrchestratorError> {
        let _claim = self.claim(job_uuid)?;
        let job = self.find_job(job_uuid, user).await?;

        if !matches!(job.status, JobStatus::Pending | JobStatus::Warning) {
            return Err(OrchestratorError::InvalidParameter(format!(
                "job {} cannot be retried from status {}",
                job.uuid, job.status
            )));
        }
        if job.job_type == JobType::EthereumRawTransaction {
            return Err(OrchestratorError::InvalidParameter(format!(
                "raw transaction job {} cannot be retried",
                job.uuid
            )));
        }
        if job.internal_data.one_time_key {
            return Err(OrchestratorError::InvalidParameter(format!(
                "job {} is signed with a one-time key and cannot be retried",
                job.uuid
            )));
        }

        let fees = bump_fees(&job.transaction, &job.internal_data, request.gas_increment)
            .map_err(|e| e.extend(COMPONENT))?;

        let parent_job_uuid = job
            .internal_data
            .parent_job_uuid
            .clone()
            .unwrap_or_else(|| job.uuid.clone());
        let mut retry = Job::new(&job.schedule_uuid, &job.chain_uuid, job.job_type, &job.tenant_id)
            .with_owner(job.owner_id.clone())
            .with_labels(job.labels.clone())
            .with_transaction(retry_transaction(&job.transaction, &request, &fees))
            .with_internal_data(InternalData {
                parent_job_uuid: Some(parent_job_uuid),
                base_gas_price: Some(fees.base_gas_price),
                ..job.internal_data.clone()
            });
        retry.next_job_uuid = job.next_job_uuid.clone();

        let mut retry = into_created(retry);
        retry.apply_status(JobStatus::Started, JOB_STARTED_MESSAGE);
        let mut db_tx = DbTransaction::new();
        db_tx.insert_job(retry.clone());

        let metadata = retry_metadata(&retry, &job);
        self.publish_start(StartJob::new(retry.clone()).with_metadata(metadata))
            .await?;
        self.commit(db_tx)
            .await
            .inspect_err(|e| error!("Retry {} of job {} queued but not stored: {}", retry.uuid, job_uuid, e))?;

        info!(
            "Job {} retried as {} with gas price {:?} / fee cap {:?}",
            job.uuid, retry.uuid, fees.gas_price, fees.gas_fee_cap
        );
        Ok(retry)
    }
}
