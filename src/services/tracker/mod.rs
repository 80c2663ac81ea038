//! In-memory trackers shared with the chain watcher.
//!
//! The watcher runs outside this crate: it adds pending jobs and retry
//! sessions as it observes broadcasts and removes them on receipts, so the
//! trackers are written from several threads at once. None of them is a
//! system of record: pending jobs are reloaded from the job store at
//! start-up (see `bootstrap::initialize_trackers`) and retry sessions are
//! reopened by the watcher.
mod chains;
pub use chains::*;

mod pending_jobs;
pub use pending_jobs::*;

mod retry_sessions;
pub use retry_sessions::*;

use log::info;

use crate::models::TrackerError;

/// Entries dropped by a chain deregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeregisteredChain {
    pub pending_jobs: usize,
    pub retry_sessions: usize,
}

#[derive(Debug, Default)]
pub struct TrackerState {
    pub chains: ChainTracker,
    pub pending_jobs: PendingJobTracker,
    pub retry_sessions: RetrySessionTracker,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops following a chain and forgets every pending job and retry session on it.
    pub fn deregister_chain(&self, chain_uuid: &str) -> Result<DeregisteredChain, TrackerError> {
        let chain = self.chains.remove(chain_uuid)?;
        let removed = DeregisteredChain {
            pending_jobs: self.pending_jobs.delete_per_chain(chain_uuid),
            retry_sessions: self.retry_sessions.delete_per_chain(chain_uuid),
        };

        info!(
            "Chain {} deregistered: {} pending jobs and {} retry sessions dropped",
            chain.name, removed.pending_jobs, removed.retry_sessions
        );
        Ok(removed)
    }
}
