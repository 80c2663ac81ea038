//! In-memory index of jobs whose transaction was sent and awaits mining.
//!
//! The chain watcher looks up every transaction hash it sees in mined blocks
//! here. The index is a projection of the job store and is rebuilt from it at
//! start-up.
use log::debug;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::models::{Job, TrackerError};

#[derive(Debug, Default)]
struct PendingJobIndex {
    by_uuid: HashMap<String, Job>,
    /// (chain UUID, lowercase tx hash) -> job UUID
    by_hash: HashMap<(String, String), String>,
    by_chain: HashMap<String, HashSet<String>>,
}

#[derive(Debug, Default)]
pub struct PendingJobTracker {
    index: Mutex<PendingJobIndex>,
}

fn hash_key(chain_uuid: &str, tx_hash: &str) -> (String, String) {
    (chain_uuid.to_string(), tx_hash.to_lowercase())
}

impl PendingJobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, job: Job) -> Result<(), TrackerError> {
        let tx_hash = job.tx_hash().ok_or_else(|| {
            TrackerError::InvalidEntry(format!("job {} has no transaction hash", job.uuid))
        })?;
        let key = hash_key(&job.chain_uuid, tx_hash);

        let mut index = self.index.lock();
        if index.by_uuid.contains_key(&job.uuid) {
            return Err(TrackerError::AlreadyExists(format!(
                "job {} is already pending",
                job.uuid
            )));
        }
        if index.by_hash.contains_key(&key) {
            return Err(TrackerError::AlreadyExists(format!(
                "transaction {} is already pending on chain {}",
                key.1, key.0
            )));
        }

        debug!("Tracking pending job {} ({})", job.uuid, key.1);
        index.by_hash.insert(key, job.uuid.clone());
        index
            .by_chain
            .entry(job.chain_uuid.clone())
            .or_default()
            .insert(job.uuid.clone());
        index.by_uuid.insert(job.uuid.clone(), job);
        Ok(())
    }

    pub fn remove(&self, job_uuid: &str) -> Result<Job, TrackerError> {
        let mut index = self.index.lock();
        let job = index
            .by_uuid
            .remove(job_uuid)
            .ok_or_else(|| TrackerError::NotFound(format!("job {} is not pending", job_uuid)))?;

        if let Some(tx_hash) = job.tx_hash() {
            index.by_hash.remove(&hash_key(&job.chain_uuid, tx_hash));
        }
        let chain_empty = index
            .by_chain
            .get_mut(&job.chain_uuid)
            .map(|uuids| {
                uuids.remove(job_uuid);
                uuids.is_empty()
            })
            .unwrap_or(false);
        if chain_empty {
            index.by_chain.remove(&job.chain_uuid);
        }

        debug!("Stopped tracking pending job {}", job_uuid);
        Ok(job)
    }

    pub fn get_by_tx_hash(&self, chain_uuid: &str, tx_hash: &str) -> Result<Job, TrackerError> {
        let index = self.index.lock();
        index
            .by_hash
            .get(&hash_key(chain_uuid, tx_hash))
            .and_then(|uuid| index.by_uuid.get(uuid))
            .cloned()
            .ok_or_else(|| {
                TrackerError::NotFound(format!(
                    "no pending job for transaction {} on chain {}",
                    tx_hash, chain_uuid
                ))
            })
    }

    pub fn get_by_uuid(&self, job_uuid: &str) -> Result<Job, TrackerError> {
        self.index
            .lock()
            .by_uuid
            .get(job_uuid)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("job {} is not pending", job_uuid)))
    }

    /// Pending jobs of a chain; an unknown chain has none.
    pub fn list_per_chain(&self, chain_uuid: &str) -> Vec<Job> {
        let index = self.index.lock();
        index
            .by_chain
            .get(chain_uuid)
            .map(|uuids| {
                uuids
                    .iter()
                    .filter_map(|uuid| index.by_uuid.get(uuid).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops every pending job of a chain and returns how many were removed.
    pub fn delete_per_chain(&self, chain_uuid: &str) -> usize {
        let mut index = self.index.lock();
        let Some(uuids) = index.by_chain.remove(chain_uuid) else {
            return 0;
        };

        for uuid in &uuids {
            if let Some(job) = index.by_uuid.remove(uuid) {
                if let Some(tx_hash) = job.tx_hash() {
                    index.by_hash.remove(&hash_key(chain_uuid, tx_hash));
                }
            }
        }

        debug!(
            "Removed {} pending jobs of chain {}",
            uuids.len(),
            chain_uuid
        );
        uuids.len()
    }

    pub fn len(&self) -> usize {
        self.index.lock().by_uuid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
