//! Faucet candidate selection.
//!
//! Picks the faucet able to pre-fund an account before its first transaction
//! is sent. Finding no candidate is a normal outcome reported as
//! `FaucetError::NotFound`.
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, info};
use thiserror::Error;

use crate::{
    constants::WILDCARD_TENANT,
    models::{Faucet, FaucetFilter, FaucetRequest, OrchestratorError, RepositoryError},
    repositories::FaucetRepository,
};

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FaucetError {
    #[error("No faucet candidate: {0}")]
    NotFound(String),

    #[error("Faucet lookup failed: {0}")]
    RepositoryError(String),
}

impl From<RepositoryError> for FaucetError {
    fn from(error: RepositoryError) -> Self {
        FaucetError::RepositoryError(error.to_string())
    }
}

impl From<FaucetError> for OrchestratorError {
    fn from(error: FaucetError) -> Self {
        match error {
            FaucetError::NotFound(msg) => OrchestratorError::NotFound(msg),
            FaucetError::RepositoryError(msg) => OrchestratorError::DependencyFailure(msg),
        }
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait FaucetCandidateTrait: Send + Sync {
    async fn get_faucet_candidate(&self, request: FaucetRequest) -> Result<Faucet, FaucetError>;
}

pub struct FaucetCandidateService<R: FaucetRepository> {
    faucet_repository: Arc<R>,
    min_cooldown: Duration,
    /// (faucet UUID, lowercase beneficiary) -> last funding time
    last_funded: DashMap<(String, String), Instant>,
}

impl<R: FaucetRepository> FaucetCandidateService<R> {
    pub fn new(faucet_repository: Arc<R>, min_cooldown: Duration) -> Self {
        Self {
            faucet_repository,
            min_cooldown,
            last_funded: DashMap::new(),
        }
    }

    fn cooldown_elapsed(&self, faucet: &Faucet, beneficiary: &str, now: Instant) -> bool {
        let cooldown = Duration::from_secs(faucet.cooldown_seconds).max(self.min_cooldown);
        self.last_funded
            .get(&(faucet.uuid.clone(), beneficiary.to_string()))
            .is_none_or(|last| now.duration_since(*last) >= cooldown)
    }
}

#[async_trait]
impl<R: FaucetRepository> FaucetCandidateTrait for FaucetCandidateService<R> {
    async fn get_faucet_candidate(&self, request: FaucetRequest) -> Result<Faucet, FaucetError> {
        let beneficiary = request.beneficiary.to_lowercase();
        let faucets = self
            .faucet_repository
            .search_faucets(FaucetFilter {
                chain_rule: Some(request.chain_uuid.clone()),
                tenant_ids: Some(request.tenant_ids.clone())
                    .filter(|tenants| !tenants.iter().any(|t| t == WILDCARD_TENANT)),
            })
            .await?;
        debug!(
            "Evaluating {} faucets for {} on chain {}",
            faucets.len(),
            request.beneficiary,
            request.chain_name
        );

        let now = Instant::now();
        let candidate = faucets
            .into_iter()
            .filter(|faucet| faucet.creditor_account.to_lowercase() != beneficiary)
            .find(|faucet| self.cooldown_elapsed(faucet, &beneficiary, now))
            .ok_or_else(|| {
                FaucetError::NotFound(format!(
                    "no faucet available for {} on chain {}",
                    request.beneficiary, request.chain_name
                ))
            })?;

        self.last_funded
            .insert((candidate.uuid.clone(), beneficiary), now);
        info!(
            "Faucet {} selected to fund {} on chain {}",
            candidate.name, request.beneficiary, request.chain_name
        );
        Ok(candidate)
    }
}
