//! Application state initialization
//!
//! This module contains functions for initializing the application state,
//! including setting up repositories, job queues, and the services built on them.
use crate::{
    config::ServerConfig,
    domain::{JobManager, TxRequestOrchestrator},
    jobs::{JobProducer, JobProducerTrait, Queue},
    models::AppState,
    repositories::{InMemoryChainRepository, InMemoryFaucetRepository, InMemoryStore},
    services::{FaucetCandidateService, JobNotifier, TrackerState},
};
use color_eyre::{eyre::WrapErr, Result};
use log::info;
use std::{sync::Arc, time::Duration};

/// Wires repositories and services around an existing job producer.
pub fn build_app_state<J: JobProducerTrait + 'static>(
    job_producer: Arc<J>,
    config: &ServerConfig,
) -> AppState<J> {
    let store = Arc::new(InMemoryStore::new());
    let chain_repository = Arc::new(InMemoryChainRepository::new());
    let faucet_repository = Arc::new(InMemoryFaucetRepository::new());

    let notifier = Arc::new(JobNotifier::new(
        job_producer.clone(),
        config.notification_id.clone(),
    ));
    let faucet = Arc::new(FaucetCandidateService::new(
        faucet_repository.clone(),
        Duration::from_secs(config.faucet_cooldown_seconds),
    ));
    let job_manager = Arc::new(JobManager::new(
        store.clone(),
        job_producer.clone(),
        notifier,
    ));
    let orchestrator = Arc::new(TxRequestOrchestrator::new(
        store.clone(),
        job_manager.clone(),
        chain_repository.clone(),
        faucet,
    ));

    AppState {
        store,
        chain_repository,
        faucet_repository,
        job_producer,
        job_manager,
        orchestrator,
        trackers: Arc::new(TrackerState::new()),
    }
}

/// Initializes application state
///
/// # Returns
///
/// * `Result<AppState>` - Initialized application state
///
/// # Errors
///
/// Returns an error if the job queues cannot reach Redis.
pub async fn initialize_app_state(config: &ServerConfig) -> Result<AppState> {
    let queue = Queue::setup(config)
        .await
        .wrap_err("Failed to set up job queues")?;
    info!("Job queues connected to {}", config.redis_url);

    Ok(build_app_state(Arc::new(JobProducer::new(queue)), config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::MockJobProducerTrait;

    fn server_config() -> ServerConfig {
        ServerConfig {
            redis_url: "redis://localhost:6379".to_string(),
            redis_connection_timeout_ms: 100,
            config_file_path: "./config/config.json".to_string(),
            queue_namespace_prefix: None,
            notification_id: "job-updates".to_string(),
            faucet_cooldown_seconds: 0,
        }
    }

    #[test]
    fn test_build_app_state_shares_store() {
        let app_state = build_app_state(Arc::new(MockJobProducerTrait::new()), &server_config());

        assert!(Arc::ptr_eq(&app_state.store(), &app_state.store));
        assert_eq!(Arc::strong_count(&app_state.store), 3);
        assert!(app_state.trackers().chains.list().is_empty());
    }
}
