//! Queue management module for job processing.
//!
//! This module provides Redis-backed queue implementation for the messages
//! produced by the job lifecycle manager:
//! - Job starts
//! - Transaction re-dispatch
//! - Notifications
use apalis_redis::{Config, RedisStorage};
use color_eyre::{eyre, Result};
use log::error;
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};

use crate::{
    config::ServerConfig,
    constants::{NOTIFICATION_QUEUE, QUEUE_MAX_RETRIES, RESEND_TX_QUEUE, START_JOB_QUEUE},
};

use super::{JobMessage, NotificationSend, ResendTransaction, StartJob};

#[derive(Clone, Debug)]
pub struct Queue {
    pub start_job_queue: RedisStorage<JobMessage<StartJob>>,
    pub resend_tx_queue: RedisStorage<JobMessage<ResendTransaction>>,
    pub notification_queue: RedisStorage<JobMessage<NotificationSend>>,
}

/// Namespace of a queue, prefixed when several deployments share one Redis.
pub fn queue_namespace(prefix: Option<&str>, queue: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, queue),
        _ => queue.to_string(),
    }
}

impl Queue {
    async fn storage<T: Serialize + for<'de> Deserialize<'de>>(
        config: &ServerConfig,
        queue: &str,
    ) -> Result<RedisStorage<T>> {
        let redis_url = config.redis_url.clone();
        let redis_connection_timeout_ms = config.redis_connection_timeout_ms;
        let conn = match timeout(Duration::from_millis(redis_connection_timeout_ms), apalis_redis::connect(redis_url.clone())).await {
            Ok(result) => result.map_err(|e| {
                error!("Failed to connect to Redis at {}: {}", redis_url, e);
                eyre::eyre!("Failed to connect to Redis. Please ensure Redis is running and accessible at {}. Error: {}", redis_url, e)
            })?,
            Err(_) => {
                error!("Timeout connecting to Redis at {}", redis_url);
                return Err(eyre::eyre!("Timed out after {} milliseconds while connecting to Redis at {}", redis_connection_timeout_ms, redis_url));
            }
        };
        let namespace = queue_namespace(config.queue_namespace_prefix.as_deref(), queue);
        let config = Config::default()
            .set_namespace(&namespace)
            .set_max_retries(QUEUE_MAX_RETRIES);

        Ok(RedisStorage::new_with_config(conn, config))
    }

    pub async fn setup(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            start_job_queue: Self::storage(config, START_JOB_QUEUE).await?,
            resend_tx_queue: Self::storage(config, RESEND_TX_QUEUE).await?,
            notification_queue: Self::storage(config, NOTIFICATION_QUEUE).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_storage_configuration() {
        let namespace = queue_namespace(Some("orchestrator"), START_JOB_QUEUE);
        let config = Config::default()
            .set_namespace(&namespace)
            .set_max_retries(QUEUE_MAX_RETRIES);

        assert_eq!(config.get_namespace(), "orchestrator:start_job_queue");
        assert_eq!(config.get_max_retries(), 5);
    }

    #[test]
    fn test_queue_namespace_without_prefix() {
        assert_eq!(queue_namespace(None, RESEND_TX_QUEUE), "resend_tx_queue");
        assert_eq!(queue_namespace(Some(""), NOTIFICATION_QUEUE), "notification_queue");
    }
}
