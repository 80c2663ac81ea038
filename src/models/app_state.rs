use std::sync::Arc;

use crate::{
    domain::{JobManager, TxRequestOrchestrator},
    jobs::{JobProducer, JobProducerTrait},
    repositories::{InMemoryChainRepository, InMemoryFaucetRepository, InMemoryStore},
    services::{FaucetCandidateService, JobNotifier, TrackerState},
};

pub type DefaultJobManager<J = JobProducer> = JobManager<InMemoryStore, J, JobNotifier<J>>;

pub type DefaultOrchestrator<J = JobProducer> = TxRequestOrchestrator<
    InMemoryStore,
    DefaultJobManager<J>,
    InMemoryChainRepository,
    FaucetCandidateService<InMemoryFaucetRepository>,
>;

/// Components shared by everything serving transaction requests.
pub struct AppState<J: JobProducerTrait + 'static = JobProducer> {
    pub store: Arc<InMemoryStore>,
    pub chain_repository: Arc<InMemoryChainRepository>,
    pub faucet_repository: Arc<InMemoryFaucetRepository>,
    pub job_producer: Arc<J>,
    pub job_manager: Arc<DefaultJobManager<J>>,
    pub orchestrator: Arc<DefaultOrchestrator<J>>,
    pub trackers: Arc<TrackerState>,
}

impl<J: JobProducerTrait + 'static> AppState<J> {
    pub fn store(&self) -> Arc<InMemoryStore> {
        self.store.clone()
    }

    pub fn chain_repository(&self) -> Arc<InMemoryChainRepository> {
        self.chain_repository.clone()
    }

    pub fn faucet_repository(&self) -> Arc<InMemoryFaucetRepository> {
        self.faucet_repository.clone()
    }

    pub fn job_manager(&self) -> Arc<DefaultJobManager<J>> {
        self.job_manager.clone()
    }

    pub fn orchestrator(&self) -> Arc<DefaultOrchestrator<J>> {
        self.orchestrator.clone()
    }

    pub fn trackers(&self) -> Arc<TrackerState> {
        self.trackers.clone()
    }
}
