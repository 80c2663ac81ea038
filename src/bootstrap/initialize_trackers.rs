//! Rebuilds the in-memory trackers from the repositories at start-up.
use crate::{
    jobs::JobProducerTrait,
    models::{AppState, ChainFilter, JobFilter, JobStatus},
    repositories::{ChainRepository, JobRepository},
};
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};

/// Loads every registered chain and every pending job carrying a hash.
///
/// Returns the number of pending jobs now tracked.
pub async fn initialize_trackers<J: JobProducerTrait + 'static>(
    app_state: &AppState<J>,
) -> Result<usize> {
    let chains = app_state
        .chain_repository
        .search_chains(ChainFilter::default())
        .await
        .wrap_err("Failed to load chains")?;
    for chain in chains {
        app_state
            .trackers
            .chains
            .add(chain)
            .wrap_err("Failed to track chain")?;
    }

    let pending = app_state
        .store
        .search_jobs(JobFilter {
            statuses: Some(vec![JobStatus::Pending]),
            ..Default::default()
        })
        .await
        .wrap_err("Failed to load pending jobs")?;

    let mut tracked = 0;
    for job in pending.into_iter().filter(|job| job.tx_hash().is_some()) {
        let job_uuid = job.uuid.clone();
        match app_state.trackers.pending_jobs.add(job) {
            Ok(()) => tracked += 1,
            Err(e) => warn!("Pending job {} not tracked: {}", job_uuid, e),
        }
    }

    info!(
        "Trackers initialized: {} chains, {} pending jobs",
        app_state.trackers.chains.list().len(),
        tracked
    );
    Ok(tracked)
}
