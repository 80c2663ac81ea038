//! Transaction request orchestrator.
//!
//! Turns a client send request into a persisted schedule of jobs and starts
//! the first one. Requests carrying an idempotency key are accepted once per
//! tenant: replaying the same request returns the stored one, replaying the
//! key with different parameters is rejected.
use std::sync::Arc;

use log::{debug, info};

use crate::{
    domain::{job::JobManagerTrait, tx_request::TransactionPipeline},
    models::{
        request_hash, Chain, ChainFilter, EthTransaction, FaucetRequest, InternalData, Job,
        JobFilter, JobStatus, JobType, OrchestratorError, Schedule, SendTransactionRequest,
        TxRequest, UserInfo,
    },
    repositories::{ChainRepository, DbTransaction, Store},
    services::{FaucetCandidateTrait, FaucetError},
    utils::generate_uuid,
};

const COMPONENT: &str = "tx_request_orchestrator";

pub struct TxRequestOrchestrator<S, M, C, F>
where
    S: Store,
    M: JobManagerTrait,
    C: ChainRepository,
    F: FaucetCandidateTrait,
{
    store: Arc<S>,
    job_manager: Arc<M>,
    chain_repository: Arc<C>,
    faucet: Arc<F>,
}

impl<S, M, C, F> TxRequestOrchestrator<S, M, C, F>
where
    S: Store,
    M: JobManagerTrait,
    C: ChainRepository,
    F: FaucetCandidateTrait,
{
    pub fn new(store: Arc<S>, job_manager: Arc<M>, chain_repository: Arc<C>, faucet: Arc<F>) -> Self {
        Self {
            store,
            job_manager,
            chain_repository,
            faucet,
        }
    }

    /// Accepts a send request and starts its first job.
    pub async fn send(
        &self,
        request: SendTransactionRequest,
        user: &UserInfo,
    ) -> Result<TxRequest, OrchestratorError> {
        request.validate()?;
        let chain = self.resolve_chain(&request.chain_name, user).await?;
        let request_hash = request_hash(&chain.uuid, &request.params)?;

        let Some(key) = request.idempotency_key.clone() else {
            let tx_request = self
                .create(generate_uuid(), &request, request_hash, &chain, user)
                .await?;
            return self.execute(tx_request, &chain, user).await;
        };

        if let Some(existing) = self.find_replay(&key, &request_hash, user).await? {
            return self.resume(existing, &chain, user).await;
        }

        match self
            .create(key.clone(), &request, request_hash.clone(), &chain, user)
            .await
        {
            Ok(tx_request) => self.execute(tx_request, &chain, user).await,
            // A concurrent request with the same key committed first.
            Err(error) if error.is_already_exists() => {
                let existing = self
                    .find_replay(&key, &request_hash, user)
                    .await?
                    .ok_or(error)?;
                self.resume(existing, &chain, user).await
            }
            Err(error) => Err(error),
        }
    }

    async fn resolve_chain(&self, name: &str, user: &UserInfo) -> Result<Chain, OrchestratorError> {
        let chains = self
            .chain_repository
            .search_chains(ChainFilter {
                names: Some(vec![name.to_string()]),
                tenant_ids: user.tenant_filter(),
            })
            .await
            .map_err(|e| OrchestratorError::from(e).extend(COMPONENT))?;

        match chains.as_slice() {
            [chain] => Ok(chain.clone()),
            [] => Err(OrchestratorError::InvalidParameter(format!(
                "chain {} not found",
                name
            ))),
            _ => Err(OrchestratorError::InvalidParameter(format!(
                "chain name {} is ambiguous",
                name
            ))),
        }
    }

    /// Stored request replayed under `key`, rejecting a replay with other parameters.
    async fn find_replay(
        &self,
        key: &str,
        request_hash: &str,
        user: &UserInfo,
    ) -> Result<Option<TxRequest>, OrchestratorError> {
        let existing = match self
            .store
            .find_tx_request_by_idempotency_key(key, &user.tenant_id)
            .await
        {
            Ok(existing) => existing,
            Err(e) => {
                let error = OrchestratorError::from(e);
                return if error.is_not_found() {
                    Ok(None)
                } else {
                    Err(error.extend(COMPONENT))
                };
            }
        };

        if existing.request_hash != request_hash {
            return Err(OrchestratorError::AlreadyExists(format!(
                "a different transaction request was already sent with idempotency key {}",
                key
            )));
        }
        Ok(Some(existing))
    }

    async fn resume(
        &self,
        existing: TxRequest,
        chain: &Chain,
        user: &UserInfo,
    ) -> Result<TxRequest, OrchestratorError> {
        let first_created = existing
            .schedule
            .first_job()
            .is_some_and(|job| job.status == JobStatus::Created);
        if !first_created {
            debug!(
                "Transaction request {} replayed with key {}",
                existing.uuid, existing.idempotency_key
            );
            return Ok(existing);
        }

        info!("Resuming transaction request {}", existing.uuid);
        self.execute(existing, chain, user).await
    }

    /// Persists the request, its schedule and every job in one storage transaction.
    async fn create(
        &self,
        idempotency_key: String,
        request: &SendTransactionRequest,
        request_hash: String,
        chain: &Chain,
        user: &UserInfo,
    ) -> Result<TxRequest, OrchestratorError> {
        let pipeline = TransactionPipeline::for_params(&request.params);
        let jobs = pipeline.build_jobs(request, chain, user)?;

        let mut schedule = Schedule::new(&user.tenant_id, user.username.clone());
        schedule.link_jobs(jobs);

        let mut db_tx = DbTransaction::new();
        db_tx.insert_schedule(schedule.without_jobs());
        schedule.jobs = std::mem::take(&mut schedule.jobs)
            .into_iter()
            .map(|job| self.job_manager.stage_create(&mut db_tx, job))
            .collect();

        let tx_request = TxRequest::new(idempotency_key, request, request_hash, schedule);
        db_tx.insert_tx_request(tx_request.clone());
        self.store
            .commit(db_tx)
            .await
            .map_err(|e| OrchestratorError::from(e).extend(COMPONENT))?;

        info!(
            "Transaction request {} accepted on chain {} ({:?}, {} jobs)",
            tx_request.uuid,
            chain.name,
            pipeline,
            tx_request.schedule.jobs.len()
        );
        Ok(tx_request)
    }

    async fn execute(
        &self,
        tx_request: TxRequest,
        chain: &Chain,
        user: &UserInfo,
    ) -> Result<TxRequest, OrchestratorError> {
        let first = tx_request.schedule.first_job().cloned().ok_or_else(|| {
            OrchestratorError::DataCorrupted(format!(
                "transaction request {} has no job",
                tx_request.uuid
            ))
        })?;

        if let Some(from) = first.transaction.from.as_deref() {
            self.fund_account(chain, &first, from, user).await?;
        }
        self.job_manager.start(&first.uuid, user).await?;

        self.store
            .find_tx_request_by_uuid(&tx_request.uuid, user.tenant_filter())
            .await
            .map_err(|e| OrchestratorError::from(e).extend(COMPONENT))
    }

    /// Creates and starts a funding job when a faucet can credit `account`.
    async fn fund_account(
        &self,
        chain: &Chain,
        first: &Job,
        account: &str,
        user: &UserInfo,
    ) -> Result<(), OrchestratorError> {
        let admin = UserInfo::internal_admin();
        let existing = self
            .store
            .search_jobs(JobFilter {
                parent_job_uuid: Some(first.uuid.clone()),
                ..Default::default()
            })
            .await
            .map_err(|e| OrchestratorError::from(e).extend(COMPONENT))?
            .into_iter()
            .find(|job| job.transaction.to.as_deref() == Some(account));
        if let Some(funding) = existing {
            if funding.status == JobStatus::Created {
                info!("Restarting funding job {} of job {}", funding.uuid, first.uuid);
                self.job_manager.start(&funding.uuid, &admin).await?;
            } else {
                debug!("Account {} already funded by job {}", account, funding.uuid);
            }
            return Ok(());
        }

        let candidate = self
            .faucet
            .get_faucet_candidate(FaucetRequest {
                chain_uuid: chain.uuid.clone(),
                chain_name: chain.name.clone(),
                beneficiary: account.to_string(),
                tenant_ids: user.allowed_tenants.clone(),
            })
            .await;
        let faucet = match candidate {
            Ok(faucet) => faucet,
            Err(FaucetError::NotFound(reason)) => {
                debug!("Account {} not funded: {}", account, reason);
                return Ok(());
            }
            Err(e) => return Err(OrchestratorError::from(e).extend(COMPONENT)),
        };

        let mut schedule = Schedule::new(&admin.tenant_id, admin.username.clone());
        let funding = Job::new("", &chain.uuid, JobType::EthereumTransaction, &admin.tenant_id)
            .with_owner(admin.username.clone())
            .with_transaction(EthTransaction {
                from: Some(faucet.creditor_account.clone()),
                to: Some(account.to_string()),
                value: Some(faucet.amount),
                ..Default::default()
            })
            .with_internal_data(InternalData {
                chain_id: chain.chain_id,
                parent_job_uuid: Some(first.uuid.clone()),
                ..Default::default()
            });
        schedule.link_jobs(vec![funding]);

        let mut db_tx = DbTransaction::new();
        db_tx.insert_schedule(schedule.without_jobs());
        let funding = schedule
            .jobs
            .into_iter()
            .map(|job| self.job_manager.stage_create(&mut db_tx, job))
            .collect::<Vec<_>>();
        self.store
            .commit(db_tx)
            .await
            .map_err(|e| OrchestratorError::from(e).extend(COMPONENT))?;

        for job in &funding {
            self.job_manager.start(&job.uuid, &admin).await?;
            info!(
                "Funding job {} started: faucet {} credits {} before job {}",
                job.uuid, faucet.name, account, first.uuid
            );
        }
        Ok(())
    }
}
