//! Active gas escalation sessions, one per job being sped up or cancelled.
use log::debug;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::models::{Job, TrackerError};

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySession {
    pub session_id: String,
    pub job: Job,
}

impl RetrySession {
    pub fn chain_uuid(&self) -> &str {
        &self.job.chain_uuid
    }
}

#[derive(Debug, Default)]
struct RetrySessionIndex {
    by_session: HashMap<String, RetrySession>,
    /// (chain UUID, lowercase tx hash) -> session ID
    by_hash: HashMap<(String, String), String>,
    by_chain: HashMap<String, HashSet<String>>,
    /// job UUID -> session ID
    by_job: HashMap<String, String>,
}

impl RetrySessionIndex {
    fn drop_session(&mut self, session: &RetrySession) {
        if let Some(tx_hash) = session.job.tx_hash() {
            self.by_hash
                .remove(&(session.chain_uuid().to_string(), tx_hash.to_lowercase()));
        }
        self.by_job.remove(&session.job.uuid);
    }
}

#[derive(Debug, Default)]
pub struct RetrySessionTracker {
    index: Mutex<RetrySessionIndex>,
}

impl RetrySessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, session_id: &str, job: Job) -> Result<(), TrackerError> {
        let tx_hash = job
            .tx_hash()
            .ok_or_else(|| {
                TrackerError::InvalidEntry(format!("job {} has no transaction hash", job.uuid))
            })?
            .to_lowercase();
        let hash_key = (job.chain_uuid.clone(), tx_hash);

        let mut index = self.index.lock();
        if index.by_session.contains_key(session_id) {
            return Err(TrackerError::AlreadyExists(format!(
                "retry session {} already exists",
                session_id
            )));
        }
        if index.by_job.contains_key(&job.uuid) {
            return Err(TrackerError::AlreadyExists(format!(
                "job {} already has a retry session",
                job.uuid
            )));
        }
        if index.by_hash.contains_key(&hash_key) {
            return Err(TrackerError::AlreadyExists(format!(
                "transaction {} already has a retry session",
                hash_key.1
            )));
        }

        debug!("Opening retry session {} for job {}", session_id, job.uuid);
        index.by_hash.insert(hash_key, session_id.to_string());
        index.by_job.insert(job.uuid.clone(), session_id.to_string());
        index
            .by_chain
            .entry(job.chain_uuid.clone())
            .or_default()
            .insert(session_id.to_string());
        index.by_session.insert(
            session_id.to_string(),
            RetrySession {
                session_id: session_id.to_string(),
                job,
            },
        );
        Ok(())
    }

    pub fn remove(&self, session_id: &str) -> Result<RetrySession, TrackerError> {
        let mut index = self.index.lock();
        let session = index.by_session.remove(session_id).ok_or_else(|| {
            TrackerError::NotFound(format!("retry session {} not found", session_id))
        })?;

        index.drop_session(&session);
        let chain_uuid = session.chain_uuid().to_string();
        let chain_empty = index
            .by_chain
            .get_mut(&chain_uuid)
            .map(|sessions| {
                sessions.remove(session_id);
                sessions.is_empty()
            })
            .unwrap_or(false);
        if chain_empty {
            index.by_chain.remove(&chain_uuid);
        }

        debug!("Closed retry session {}", session_id);
        Ok(session)
    }

    pub fn search_by_tx_hash(
        &self,
        chain_uuid: &str,
        tx_hash: &str,
    ) -> Result<RetrySession, TrackerError> {
        let index = self.index.lock();
        index
            .by_hash
            .get(&(chain_uuid.to_string(), tx_hash.to_lowercase()))
            .and_then(|session_id| index.by_session.get(session_id))
            .cloned()
            .ok_or_else(|| {
                TrackerError::NotFound(format!(
                    "no retry session for transaction {} on chain {}",
                    tx_hash, chain_uuid
                ))
            })
    }

    pub fn list_by_chain(&self, chain_uuid: &str) -> Vec<RetrySession> {
        let index = self.index.lock();
        index
            .by_chain
            .get(chain_uuid)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|id| index.by_session.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn delete_per_chain(&self, chain_uuid: &str) -> usize {
        let mut index = self.index.lock();
        let Some(session_ids) = index.by_chain.remove(chain_uuid) else {
            return 0;
        };

        for session_id in &session_ids {
            if let Some(session) = index.by_session.remove(session_id) {
                index.drop_session(&session);
            }
        }

        debug!(
            "Removed {} retry sessions of chain {}",
            session_ids.len(),
            chain_uuid
        );
        session_ids.len()
    }

    pub fn has_job(&self, job_uuid: &str) -> bool {
        self.index.lock().by_job.contains_key(job_uuid)
    }

    pub fn len(&self) -> usize {
        self.index.lock().by_session.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobStatus, JobType};

    fn pending_job(chain_uuid: &str, tx_hash: &str) -> Job {
        let mut job = Job::new("schedule", chain_uuid, JobType::EthereumTransaction, "tenant");
        job.status = JobStatus::Pending;
        job.transaction.tx_hash = Some(tx_hash.to_string());
        job.internal_data.retry_interval_ms = Some(5_000);
        job
    }

    #[test]
    fn test_session_lifecycle() {
        let tracker = RetrySessionTracker::new();
        let job = pending_job("chain-1", "0xAA");

        tracker.add("session-1", job.clone()).unwrap();
        assert!(tracker.has_job(&job.uuid));
        assert_eq!(
            tracker.search_by_tx_hash("chain-1", "0xaa").unwrap().session_id,
            "session-1"
        );
        assert_eq!(tracker.list_by_chain("chain-1").len(), 1);

        let removed = tracker.remove("session-1").unwrap();
        assert_eq!(removed.job.uuid, job.uuid);
        assert!(!tracker.has_job(&job.uuid));
        assert!(tracker.list_by_chain("chain-1").is_empty());
        assert!(matches!(
            tracker.search_by_tx_hash("chain-1", "0xaa"),
            Err(TrackerError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let tracker = RetrySessionTracker::new();
        let job = pending_job("chain-1", "0x01");
        tracker.add("session-1", job.clone()).unwrap();

        assert!(matches!(
            tracker.add("session-1", pending_job("chain-1", "0x02")),
            Err(TrackerError::AlreadyExists(_))
        ));
        assert!(matches!(
            tracker.add("session-2", job),
            Err(TrackerError::AlreadyExists(_))
        ));
        assert!(matches!(
            tracker.add("session-3", pending_job("chain-1", "0x01")),
            Err(TrackerError::AlreadyExists(_))
        ));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_remove_unknown_session() {
        let tracker = RetrySessionTracker::new();
        assert!(matches!(
            tracker.remove("missing"),
            Err(TrackerError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_per_chain() {
        let tracker = RetrySessionTracker::new();
        let doomed = pending_job("chain-1", "0x01");
        tracker.add("session-1", doomed.clone()).unwrap();
        tracker.add("session-2", pending_job("chain-2", "0x01")).unwrap();

        assert_eq!(tracker.delete_per_chain("chain-1"), 1);

        assert!(!tracker.has_job(&doomed.uuid));
        assert!(tracker.search_by_tx_hash("chain-1", "0x01").is_err());
        assert!(tracker.search_by_tx_hash("chain-2", "0x01").is_ok());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_concurrent_add_and_delete_per_chain() {
        const WRITERS: usize = 4;
        const SESSIONS: usize = 200;
        let tracker = RetrySessionTracker::new();

        let deleted: usize = std::thread::scope(|scope| {
            for writer in 0..WRITERS {
                let tracker = &tracker;
                scope.spawn(move || {
                    for i in 0..SESSIONS {
                        let hash = format!("0x{:02x}{:04x}", writer, i);
                        let session_id = format!("keep-{}-{}", writer, i);
                        tracker
                            .add(&session_id, pending_job("chain-keep", &hash))
                            .unwrap();
                        let session_id = format!("drop-{}-{}", writer, i);
                        tracker
                            .add(&session_id, pending_job("chain-drop", &hash))
                            .unwrap();
                    }
                });
            }
            let cleaner = scope.spawn(|| {
                (0..SESSIONS)
                    .map(|_| tracker.delete_per_chain("chain-drop"))
                    .sum::<usize>()
            });
            cleaner.join().unwrap()
        });
        let deleted = deleted + tracker.delete_per_chain("chain-drop");

        assert_eq!(deleted, WRITERS * SESSIONS);
        assert_eq!(tracker.len(), WRITERS * SESSIONS);
        assert!(tracker.list_by_chain("chain-drop").is_empty());
        let kept = tracker.list_by_chain("chain-keep");
        assert_eq!(kept.len(), WRITERS * SESSIONS);
        for session in kept {
            assert!(tracker.has_job(&session.job.uuid));
            let hash = session.job.tx_hash().unwrap();
            assert_eq!(
                tracker.search_by_tx_hash("chain-keep", hash).unwrap().session_id,
                session.session_id
            );
        }
    }
}
