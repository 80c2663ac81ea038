//! Staged multi-entity write set.
//!
//! A `DbTransaction` collects writes in order; nothing is visible to readers
//! until the store commits it, and the store applies all of them or none.
use crate::models::{Job, JobStatus, Schedule, TxRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    InsertSchedule(Schedule),
    InsertJob(Job),
    /// Replaces a job; when `expected_status` is set the stored status must still match it.
    UpdateJob {
        job: Job,
        expected_status: Option<JobStatus>,
    },
    InsertTxRequest(TxRequest),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbTransaction {
    ops: Vec<WriteOp>,
}

impl DbTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_schedule(&mut self, schedule: Schedule) {
        self.ops.push(WriteOp::InsertSchedule(schedule));
    }

    pub fn insert_job(&mut self, job: Job) {
        self.ops.push(WriteOp::InsertJob(job));
    }

    pub fn update_job(&mut self, job: Job, expected_status: Option<JobStatus>) {
        self.ops.push(WriteOp::UpdateJob {
            job,
            expected_status,
        });
    }

    pub fn insert_tx_request(&mut self, tx_request: TxRequest) {
        self.ops.push(WriteOp::InsertTxRequest(tx_request));
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobType;

    #[test]
    fn test_ops_keep_staging_order() {
        let schedule = Schedule::new("tenant", None);
        let job = Job::new(&schedule.uuid, "chain", JobType::EthereumTransaction, "tenant");

        let mut db_tx = DbTransaction::new();
        assert!(db_tx.is_empty());

        db_tx.insert_schedule(schedule.clone());
        db_tx.insert_job(job.clone());
        db_tx.update_job(job.clone(), Some(JobStatus::Created));

        assert_eq!(db_tx.len(), 3);
        assert_eq!(db_tx.ops()[0], WriteOp::InsertSchedule(schedule));
        assert!(matches!(db_tx.ops()[1], WriteOp::InsertJob(_)));
        assert!(matches!(
            db_tx.ops()[2],
            WriteOp::UpdateJob {
                expected_status: Some(JobStatus::Created),
                ..
            }
        ));
    }
}
