//! Property-based tests for the pending job and retry session trackers.
//!
//! Operations are generated as sequences and replayed against a plain model
//! of the expected tracker content.
use proptest::{prelude::*, test_runner::Config};
use std::collections::HashMap;
use tx_orchestrator::{
    models::{Job, JobType},
    services::{PendingJobTracker, RetrySessionTracker},
};

const CHAINS: [&str; 3] = ["chain-a", "chain-b", "chain-c"];

fn job(chain: usize, hash: u8) -> Job {
    let mut job = Job::new("schedule", CHAINS[chain], JobType::EthereumTransaction, "tenant");
    job.transaction.tx_hash = Some(format!("0x{:064X}", hash));
    job
}

#[derive(Debug, Clone)]
enum Op {
    Add { chain: usize, hash: u8 },
    Remove(usize),
    DeleteChain(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..CHAINS.len(), 0u8..16).prop_map(|(chain, hash)| Op::Add { chain, hash }),
        2 => (0usize..64).prop_map(Op::Remove),
        1 => (0..CHAINS.len()).prop_map(Op::DeleteChain),
    ]
}

proptest! {
  #![proptest_config(Config {
    cases: 200, ..Config::default()
  })]

  /// Every index of the pending tracker agrees with the model after any sequence.
  #[test]
  fn prop_pending_tracker_indexes_stay_consistent(ops in prop::collection::vec(op(), 1..40)) {
      let tracker = PendingJobTracker::new();
      // job UUID -> (chain index, hash)
      let mut model: HashMap<String, (usize, u8)> = HashMap::new();
      let mut known: Vec<String> = Vec::new();

      for op in ops {
          match op {
              Op::Add { chain, hash } => {
                  let job = job(chain, hash);
                  let duplicate = model.values().any(|entry| *entry == (chain, hash));
                  let uuid = job.uuid.clone();
                  prop_assert_eq!(tracker.add(job).is_ok(), !duplicate);
                  if !duplicate {
                      model.insert(uuid.clone(), (chain, hash));
                      known.push(uuid);
                  }
              }
              Op::Remove(i) => {
                  if let Some(uuid) = known.get(i % known.len().max(1)).cloned() {
                      prop_assert_eq!(tracker.remove(&uuid).is_ok(), model.remove(&uuid).is_some());
                  }
              }
              Op::DeleteChain(chain) => {
                  let expected = model.values().filter(|(c, _)| *c == chain).count();
                  prop_assert_eq!(tracker.delete_per_chain(CHAINS[chain]), expected);
                  model.retain(|_, (c, _)| *c != chain);
              }
          }
      }

      prop_assert_eq!(tracker.len(), model.len());
      for (index, chain) in CHAINS.iter().enumerate() {
          let expected = model.values().filter(|(c, _)| *c == index).count();
          prop_assert_eq!(tracker.list_per_chain(chain).len(), expected);
      }
      for (uuid, (chain, hash)) in &model {
          let by_hash = tracker
              .get_by_tx_hash(CHAINS[*chain], &format!("0x{:064x}", hash))
              .map(|job| job.uuid);
          prop_assert_eq!(by_hash.as_deref(), Ok(uuid.as_str()));
      }
  }

  /// A job or a transaction never has two retry sessions at once.
  #[test]
  fn prop_retry_sessions_unique_per_job_and_hash(
      entries in prop::collection::vec((0..CHAINS.len(), 0u8..8), 1..30)
  ) {
      let tracker = RetrySessionTracker::new();
      let mut opened: Vec<(usize, u8)> = Vec::new();

      for (i, (chain, hash)) in entries.into_iter().enumerate() {
          let job = job(chain, hash);
          let accepted = tracker.add(&format!("session-{}", i), job.clone()).is_ok();
          prop_assert_eq!(accepted, !opened.contains(&(chain, hash)));
          if accepted {
              opened.push((chain, hash));
              let again_id = format!("again-{}", i);
              prop_assert!(tracker.add(&again_id, job).is_err());
              let hash_hex = format!("0x{:064X}", hash);
              prop_assert!(tracker.has_job(&tracker
                  .search_by_tx_hash(CHAINS[chain], &hash_hex)
                  .unwrap()
                  .job
                  .uuid));
          }
      }

      prop_assert_eq!(tracker.len(), opened.len());
      let total: usize = CHAINS.iter().map(|c| tracker.delete_per_chain(c)).sum();
      prop_assert_eq!(total, opened.len());
      prop_assert!(tracker.is_empty());
  }
}
