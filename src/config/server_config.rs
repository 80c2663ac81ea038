/// Configuration for the orchestrator process, read from the environment.
use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The URL for the Redis instance backing the queues.
    pub redis_url: String,
    /// How long to wait for a Redis connection before giving up.
    pub redis_connection_timeout_ms: u64,
    /// The file path to the chains and faucets configuration file.
    pub config_file_path: String,
    /// Prefix of every queue namespace, for deployments sharing one Redis.
    pub queue_namespace_prefix: Option<String>,
    /// Identifier attached to job update notifications.
    pub notification_id: String,
    /// Lower bound of every faucet cooldown.
    pub faucet_cooldown_seconds: u64,
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    /// Creates a new `ServerConfig` instance from environment variables.
    ///
    /// # Panics
    ///
    /// This function will panic if the `REDIS_URL` environment variable is not
    /// set, as the queues cannot work without it.
    ///
    /// # Defaults
    ///
    /// - `REDIS_CONNECTION_TIMEOUT_MS` defaults to `10000`.
    /// - `CONFIG_DIR` defaults to `"./config"`, `CONFIG_FILE_NAME` to `"config.json"`.
    /// - `NOTIFICATION_ID` defaults to `"job-updates"`.
    /// - `FAUCET_COOLDOWN_SECONDS` defaults to `0`.
    pub fn from_env() -> Self {
        let conf_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "./config".to_string());
        let conf_dir = format!("{}/", conf_dir.trim_end_matches('/'));
        let config_file_name =
            env::var("CONFIG_FILE_NAME").unwrap_or_else(|_| "config.json".to_string());

        Self {
            redis_url: env::var("REDIS_URL").expect("REDIS_URL must be set"),
            redis_connection_timeout_ms: parse_or("REDIS_CONNECTION_TIMEOUT_MS", 10_000),
            config_file_path: format!("{}{}", conf_dir, config_file_name),
            queue_namespace_prefix: env::var("QUEUE_NAMESPACE_PREFIX")
                .ok()
                .filter(|prefix| !prefix.is_empty()),
            notification_id: env::var("NOTIFICATION_ID")
                .unwrap_or_else(|_| "job-updates".to_string()),
            faucet_cooldown_seconds: parse_or("FAUCET_COOLDOWN_SECONDS", 0),
        }
    }
}
