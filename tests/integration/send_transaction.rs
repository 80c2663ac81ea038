//! End-to-end flow of a transaction request through the wired application
//! state: configuration, idempotent send, job updates, tracker bootstrap and
//! gas-bumped retries.
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc, sync::Mutex};
use tx_orchestrator::{
    bootstrap::{build_app_state, initialize_trackers, process_config_file},
    config::{ChainFileConfig, Config, ServerConfig},
    domain::JobManagerTrait,
    jobs::{JobProducerError, JobProducerTrait, NotificationSend, ResendTransaction, StartJob},
    models::{
        AppState, EthTransaction, JobStatus, JobUpdate, OrchestratorError, RetryJobRequest,
        SendTransactionRequest, TransactionParams, UserInfo, WebhookPayload,
    },
};

const FROM: &str = "0x7E654d251Da770A068413677967F6d3Ea2FeA9E4";
const TO: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const TX_HASH: &str = "0x9f0b1e8c2a4b5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6";

/// Keeps every message in memory instead of pushing it to Redis.
#[derive(Default)]
struct RecordingProducer {
    started: Mutex<Vec<StartJob>>,
    resent: Mutex<Vec<ResendTransaction>>,
    notifications: Mutex<Vec<NotificationSend>>,
}

#[async_trait]
impl JobProducerTrait for RecordingProducer {
    async fn produce_start_job(
        &self,
        start_job: StartJob,
        _scheduled_on: Option<i64>,
    ) -> Result<(), JobProducerError> {
        self.started.lock().unwrap().push(start_job);
        Ok(())
    }

    async fn produce_resend_tx_job(
        &self,
        resend_job: ResendTransaction,
        _scheduled_on: Option<i64>,
    ) -> Result<(), JobProducerError> {
        self.resent.lock().unwrap().push(resend_job);
        Ok(())
    }

    async fn produce_send_notification_job(
        &self,
        notification_send_job: NotificationSend,
        _scheduled_on: Option<i64>,
    ) -> Result<(), JobProducerError> {
        self.notifications.lock().unwrap().push(notification_send_job);
        Ok(())
    }
}

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

async fn app_state() -> AppState<RecordingProducer> {
    let app_state = build_app_state(Arc::new(RecordingProducer::default()), &server_config());
    let config = Config {
        chains: vec![ChainFileConfig {
            uuid: "chain-besu1".to_string(),
            name: "besu1".to_string(),
            tenant_id: "tenant-1".to_string(),
            chain_id: 888,
            urls: vec!["http://besu1:8545".to_string()],
            private_tx_manager: None,
        }],
        faucets: vec![],
    };
    config.validate().unwrap();
    process_config_file(config, &app_state).await.unwrap();
    app_state
}

fn user() -> UserInfo {
    UserInfo::new("tenant-1", Some("alice".to_string()))
}

fn request(key: &str) -> SendTransactionRequest {
    SendTransactionRequest {
        idempotency_key: Some(key.to_string()),
        chain_name: "besu1".to_string(),
        labels: HashMap::from([("source".to_string(), "integration".to_string())]),
        params: TransactionParams {
            from: Some(FROM.to_string()),
            to: Some(TO.to_string()),
            data: Some("0xa9059cbb".to_string()),
            ..Default::default()
        },
    }
}

/// Sends a request and reports its job as broadcast with a 10 gwei gas price.
async fn send_and_broadcast(app_state: &AppState<RecordingProducer>, key: &str) -> String {
    let tx_request = app_state
        .orchestrator
        .send(request(key), &user())
        .await
        .unwrap();
    let job_uuid = tx_request.schedule.jobs[0].uuid.clone();

    let signed = EthTransaction {
        gas_price: Some(10_000_000_000),
        nonce: Some(3),
        raw: Some("0xf86b03".to_string()),
        tx_hash: Some(TX_HASH.to_string()),
        ..Default::default()
    };
    app_state
        .job_manager
        .update(
            &job_uuid,
            JobUpdate::status(JobStatus::Pending, "broadcast").with_transaction(signed),
            &user(),
        )
        .await
        .unwrap();
    job_uuid
}

#[tokio::test]
async fn test_request_lifecycle_until_mined() {
    let app_state = app_state().await;

    let job_uuid = send_and_broadcast(&app_state, "order-42").await;
    assert_eq!(app_state.job_producer.started.lock().unwrap().len(), 1);

    let replay = app_state
        .orchestrator
        .send(request("order-42"), &user())
        .await
        .unwrap();
    assert_eq!(replay.schedule.jobs[0].uuid, job_uuid);
    assert_eq!(app_state.job_producer.started.lock().unwrap().len(), 1);

    assert_eq!(initialize_trackers(&app_state).await.unwrap(), 1);
    let pending = app_state
        .trackers
        .pending_jobs
        .get_by_tx_hash("chain-besu1", TX_HASH)
        .unwrap();
    assert_eq!(pending.uuid, job_uuid);

    let mined = app_state
        .job_manager
        .update(&job_uuid, JobUpdate::status(JobStatus::Mined, "receipt found"), &user())
        .await
        .unwrap();
    assert_eq!(mined.status, JobStatus::Mined);
    assert_eq!(mined.labels.get("source").map(String::as_str), Some("integration"));

    let notifications = app_state.job_producer.notifications.lock().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].notification_id, "job-updates");
    let WebhookPayload::Job(job) = &notifications[0].notification.payload;
    assert_eq!(job.uuid, job_uuid);
    assert_eq!(job.status, JobStatus::Mined);
}

#[tokio::test]
async fn test_reused_key_with_other_params_is_rejected() {
    let app_state = app_state().await;
    app_state
        .orchestrator
        .send(request("order-7"), &user())
        .await
        .unwrap();

    let mut changed = request("order-7");
    changed.params.data = Some("0x095ea7b3".to_string());
    let result = app_state.orchestrator.send(changed, &user()).await;

    assert!(matches!(result, Err(OrchestratorError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_pending_job_resend_and_retry() {
    let app_state = app_state().await;
    let job_uuid = send_and_broadcast(&app_state, "order-43").await;

    let resending = app_state.job_manager.resend_tx(&job_uuid, &user()).await.unwrap();
    assert_eq!(resending.status, JobStatus::Resending);
    {
        let resent = app_state.job_producer.resent.lock().unwrap();
        assert_eq!(resent.len(), 1);
        assert_eq!(resent[0].job_uuid, job_uuid);
        assert_eq!(resent[0].raw, "0xf86b03");
    }
    app_state
        .job_manager
        .update(&job_uuid, JobUpdate::status(JobStatus::Pending, "rebroadcast"), &user())
        .await
        .unwrap();

    let retry = app_state
        .job_manager
        .retry_tx(
            &job_uuid,
            RetryJobRequest {
                gas_increment: 0.2,
                data: None,
            },
            &user(),
        )
        .await
        .unwrap();

    assert_ne!(retry.uuid, job_uuid);
    assert_eq!(retry.status, JobStatus::Started);
    assert_eq!(retry.transaction.gas_price, Some(12_000_000_000));
    assert_eq!(retry.transaction.nonce, Some(3));
    assert_eq!(retry.transaction.tx_hash, None);
    assert_eq!(
        retry.internal_data.parent_job_uuid.as_deref(),
        Some(job_uuid.as_str())
    );

    let started = app_state.job_producer.started.lock().unwrap();
    assert_eq!(started.len(), 2);
    assert_eq!(started[1].job.uuid, retry.uuid);
}
