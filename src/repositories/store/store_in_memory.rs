//! This module defines an in-memory store for schedules, jobs and transaction
//! requests. All entities live behind a single `Mutex` so that a staged
//! `DbTransaction` is validated and applied while holding one lock.
use crate::{
    models::{Job, JobFilter, JobStatus, RepositoryError, Schedule, TxRequest},
    repositories::*,
};
use async_trait::async_trait;
use itertools::Itertools;
use log::debug;
use std::collections::{HashMap, HashSet};
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default, Clone)]
struct StoreState {
    schedules: HashMap<String, Schedule>,
    /// Job UUIDs of each schedule in insertion order.
    schedule_jobs: HashMap<String, Vec<String>>,
    jobs: HashMap<String, Job>,
    tx_requests: HashMap<String, TxRequest>,
    /// (idempotency key, tenant) -> tx request UUID
    idempotency_keys: HashMap<(String, String), String>,
}

impl StoreState {
    fn schedule_with_jobs(&self, schedule: &Schedule) -> Schedule {
        let jobs = self
            .schedule_jobs
            .get(&schedule.uuid)
            .map(|uuids| {
                uuids
                    .iter()
                    .filter_map(|uuid| self.jobs.get(uuid).cloned())
                    .collect()
            })
            .unwrap_or_default();

        Schedule {
            jobs,
            ..schedule.clone()
        }
    }

    fn tx_request_with_schedule(&self, tx_request: &TxRequest) -> TxRequest {
        let schedule = self
            .schedules
            .get(&tx_request.schedule.uuid)
            .map(|schedule| self.schedule_with_jobs(schedule))
            .unwrap_or_else(|| tx_request.schedule.clone());

        TxRequest {
            schedule,
            ..tx_request.clone()
        }
    }

    /// Checks every write against the current state and the writes staged before it.
    fn validate(&self, ops: &[WriteOp]) -> Result<(), RepositoryError> {
        let mut new_schedules: HashSet<&str> = HashSet::new();
        let mut job_statuses: HashMap<&str, JobStatus> = HashMap::new();
        let mut new_tx_requests: HashSet<&str> = HashSet::new();
        let mut new_keys: HashSet<(&str, &str)> = HashSet::new();

        let schedule_exists = |uuid: &str, staged: &HashSet<&str>| {
            self.schedules.contains_key(uuid) || staged.contains(uuid)
        };

        for op in ops {
            match op {
                WriteOp::InsertSchedule(schedule) => {
                    if schedule_exists(&schedule.uuid, &new_schedules) {
                        return Err(RepositoryError::AlreadyExists(format!(
                            "Schedule with UUID {} already exists",
                            schedule.uuid
                        )));
                    }
                    new_schedules.insert(&schedule.uuid);
                }
                WriteOp::InsertJob(job) => {
                    if self.jobs.contains_key(&job.uuid) || job_statuses.contains_key(job.uuid.as_str())
                    {
                        return Err(RepositoryError::AlreadyExists(format!(
                            "Job with UUID {} already exists",
                            job.uuid
                        )));
                    }
                    if !schedule_exists(&job.schedule_uuid, &new_schedules) {
                        return Err(RepositoryError::NotFound(format!(
                            "Schedule with UUID {} not found",
                            job.schedule_uuid
                        )));
                    }
                    job_statuses.insert(&job.uuid, job.status);
                }
                WriteOp::UpdateJob {
                    job,
                    expected_status,
                } => {
                    let current = job_statuses
                        .get(job.uuid.as_str())
                        .copied()
                        .or_else(|| self.jobs.get(&job.uuid).map(|stored| stored.status))
                        .ok_or_else(|| {
                            RepositoryError::NotFound(format!("Job with UUID {} not found", job.uuid))
                        })?;

                    if let Some(expected) = expected_status {
                        if *expected != current {
                            return Err(RepositoryError::Conflict(format!(
                                "Job {} is {} instead of {}",
                                job.uuid, current, expected
                            )));
                        }
                    }
                    job_statuses.insert(&job.uuid, job.status);
                }
                WriteOp::InsertTxRequest(tx_request) => {
                    if self.tx_requests.contains_key(&tx_request.uuid)
                        || new_tx_requests.contains(tx_request.uuid.as_str())
                    {
                        return Err(RepositoryError::AlreadyExists(format!(
                            "Transaction request with UUID {} already exists",
                            tx_request.uuid
                        )));
                    }
                    let key = (
                        tx_request.idempotency_key.as_str(),
                        tx_request.tenant_id.as_str(),
                    );
                    if self
                        .idempotency_keys
                        .contains_key(&(key.0.to_string(), key.1.to_string()))
                        || new_keys.contains(&key)
                    {
                        return Err(RepositoryError::AlreadyExists(format!(
                            "Transaction request with idempotency key {} already exists",
                            tx_request.idempotency_key
                        )));
                    }
                    if !schedule_exists(&tx_request.schedule.uuid, &new_schedules) {
                        return Err(RepositoryError::NotFound(format!(
                            "Schedule with UUID {} not found",
                            tx_request.schedule.uuid
                        )));
                    }
                    new_tx_requests.insert(&tx_request.uuid);
                    new_keys.insert(key);
                }
            }
        }

        Ok(())
    }

    fn apply(&mut self, ops: Vec<WriteOp>) {
        for op in ops {
            match op {
                WriteOp::InsertSchedule(schedule) => {
                    self.schedule_jobs.entry(schedule.uuid.clone()).or_default();
                    self.schedules
                        .insert(schedule.uuid.clone(), schedule.without_jobs());
                }
                WriteOp::InsertJob(job) => {
                    self.schedule_jobs
                        .entry(job.schedule_uuid.clone())
                        .or_default()
                        .push(job.uuid.clone());
                    self.jobs.insert(job.uuid.clone(), job);
                }
                WriteOp::UpdateJob { job, .. } => {
                    self.jobs.insert(job.uuid.clone(), job);
                }
                WriteOp::InsertTxRequest(tx_request) => {
                    self.idempotency_keys.insert(
                        (
                            tx_request.idempotency_key.clone(),
                            tx_request.tenant_id.clone(),
                        ),
                        tx_request.uuid.clone(),
                    );
                    let stored = TxRequest {
                        schedule: tx_request.schedule.without_jobs(),
                        ..tx_request
                    };
                    self.tx_requests.insert(stored.uuid.clone(), stored);
                }
            }
        }
    }
}

fn tenant_allowed(tenant_ids: &Option<Vec<String>>, tenant_id: &str) -> bool {
    tenant_ids
        .as_ref()
        .is_none_or(|tenants| tenants.iter().any(|t| t == tenant_id))
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
        }
    }

    async fn acquire_lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().await
    }

    async fn commit_single(&self, op: WriteOp) -> Result<(), RepositoryError> {
        let mut db_tx = DbTransaction::new();
        match op {
            WriteOp::InsertSchedule(schedule) => db_tx.insert_schedule(schedule),
            WriteOp::InsertJob(job) => db_tx.insert_job(job),
            WriteOp::UpdateJob {
                job,
                expected_status,
            } => db_tx.update_job(job, expected_status),
            WriteOp::InsertTxRequest(tx_request) => db_tx.insert_tx_request(tx_request),
        }
        self.commit(db_tx).await
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn commit(&self, db_tx: DbTransaction) -> Result<(), RepositoryError> {
        let mut state = self.acquire_lock().await;
        state.validate(db_tx.ops())?;

        debug!("Committing {} staged writes", db_tx.len());
        state.apply(db_tx.into_ops());
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryStore {
    async fn insert_schedule(&self, schedule: Schedule) -> Result<Schedule, RepositoryError> {
        self.commit_single(WriteOp::InsertSchedule(schedule.clone()))
            .await?;
        Ok(schedule)
    }

    async fn find_schedule_by_uuid(
        &self,
        uuid: &str,
        tenant_ids: Option<Vec<String>>,
    ) -> Result<Schedule, RepositoryError> {
        let state = self.acquire_lock().await;
        state
            .schedules
            .get(uuid)
            .filter(|schedule| tenant_allowed(&tenant_ids, &schedule.tenant_id))
            .map(|schedule| state.schedule_with_jobs(schedule))
            .ok_or_else(|| RepositoryError::NotFound(format!("Schedule with UUID {} not found", uuid)))
    }
}

#[async_trait]
impl JobRepository for InMemoryStore {
    async fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        self.commit_single(WriteOp::InsertJob(job.clone())).await?;
        Ok(job)
    }

    async fn update_job(&self, job: Job) -> Result<Job, RepositoryError> {
        self.commit_single(WriteOp::UpdateJob {
            job: job.clone(),
            expected_status: None,
        })
        .await?;
        Ok(job)
    }

    async fn find_job_by_uuid(
        &self,
        uuid: &str,
        tenant_ids: Option<Vec<String>>,
    ) -> Result<Job, RepositoryError> {
        let state = self.acquire_lock().await;
        state
            .jobs
            .get(uuid)
            .filter(|job| tenant_allowed(&tenant_ids, &job.tenant_id))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Job with UUID {} not found", uuid)))
    }

    async fn search_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, RepositoryError> {
        let state = self.acquire_lock().await;
        Ok(state
            .jobs
            .values()
            .filter(|job| filter.matches(job))
            .cloned()
            .sorted_by(|a, b| a.created_at.cmp(&b.created_at))
            .collect())
    }
}

#[async_trait]
impl TxRequestRepository for InMemoryStore {
    async fn insert_tx_request(
        &self,
        tx_request: TxRequest,
    ) -> Result<TxRequest, RepositoryError> {
        self.commit_single(WriteOp::InsertTxRequest(tx_request.clone()))
            .await?;
        Ok(tx_request)
    }

    async fn find_tx_request_by_idempotency_key(
        &self,
        idempotency_key: &str,
        tenant_id: &str,
    ) -> Result<TxRequest, RepositoryError> {
        let state = self.acquire_lock().await;
        state
            .idempotency_keys
            .get(&(idempotency_key.to_string(), tenant_id.to_string()))
            .and_then(|uuid| state.tx_requests.get(uuid))
            .map(|tx_request| state.tx_request_with_schedule(tx_request))
            .ok_or_else(|| {
                RepositoryError::NotFound(format!(
                    "Transaction request with idempotency key {} not found",
                    idempotency_key
                ))
            })
    }

    async fn find_tx_request_by_uuid(
        &self,
        uuid: &str,
        tenant_ids: Option<Vec<String>>,
    ) -> Result<TxRequest, RepositoryError> {
        let state = self.acquire_lock().await;
        state
            .tx_requests
            .get(uuid)
            .filter(|tx_request| tenant_allowed(&tenant_ids, &tx_request.tenant_id))
            .map(|tx_request| state.tx_request_with_schedule(tx_request))
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("Transaction request with UUID {} not found", uuid))
            })
    }
}
