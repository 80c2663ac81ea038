//! Job store module
//!
//! Transactional persistence for schedules, jobs and transaction requests.
//! Writes touching several entities are staged in a [`DbTransaction`] and
//! applied atomically by [`Store::commit`].
//!
//! ## Implementations
//!
//! - [`InMemoryStore`]: single-process store used by the service and the tests
mod db_transaction;
mod store_in_memory;

pub use db_transaction::*;
pub use store_in_memory::*;

use crate::models::{Job, JobFilter, RepositoryError, Schedule, TxRequest};
use async_trait::async_trait;

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn insert_schedule(&self, schedule: Schedule) -> Result<Schedule, RepositoryError>;

    /// Returns the schedule with its jobs attached in execution order.
    async fn find_schedule_by_uuid(
        &self,
        uuid: &str,
        tenant_ids: Option<Vec<String>>,
    ) -> Result<Schedule, RepositoryError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;

    async fn update_job(&self, job: Job) -> Result<Job, RepositoryError>;

    async fn find_job_by_uuid(
        &self,
        uuid: &str,
        tenant_ids: Option<Vec<String>>,
    ) -> Result<Job, RepositoryError>;

    async fn search_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, RepositoryError>;
}

#[async_trait]
pub trait TxRequestRepository: Send + Sync {
    async fn insert_tx_request(&self, tx_request: TxRequest)
        -> Result<TxRequest, RepositoryError>;

    /// Idempotency keys are scoped to a tenant.
    async fn find_tx_request_by_idempotency_key(
        &self,
        idempotency_key: &str,
        tenant_id: &str,
    ) -> Result<TxRequest, RepositoryError>;

    async fn find_tx_request_by_uuid(
        &self,
        uuid: &str,
        tenant_ids: Option<Vec<String>>,
    ) -> Result<TxRequest, RepositoryError>;
}

#[async_trait]
pub trait Store: ScheduleRepository + JobRepository + TxRequestRepository {
    /// Applies every staged write or none of them.
    async fn commit(&self, db_tx: DbTransaction) -> Result<(), RepositoryError>;
}

