//! # Transaction Orchestrator
//!
//! A service turning transaction requests into jobs dispatched to EVM chains.
//!
//! ## Features
//!
//! - Idempotent transaction requests
//! - Public and private (EEA, GoQuorum) transactions
//! - Job retries with gas price bumps
//! - Faucet funding of sender accounts
//!
//! ## Usage
//!
//! ```bash
//! cargo run
//! ```

use color_eyre::{eyre::WrapErr, Result};
use dotenvy::dotenv;
use log::info;
use tx_orchestrator::{
    bootstrap::{initialize_app_state, initialize_trackers, process_config_file},
    config::{self, Config, ServerConfig},
    logging::setup_logging,
};

fn load_config_file(config_file_path: &str) -> Result<Config> {
    config::load_config(config_file_path).wrap_err("Failed to load config file")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error reporting with eyre
    color_eyre::install().wrap_err("Failed to initialize error reporting")?;

    dotenv().ok();
    setup_logging();

    let config = ServerConfig::from_env();
    let config_file = load_config_file(&config.config_file_path)?;

    let app_state = initialize_app_state(&config).await?;

    info!("Processing config file");
    process_config_file(config_file, &app_state).await?;

    initialize_trackers(&app_state).await?;

    info!("Orchestrator ready, waiting for shutdown signal");
    tokio::signal::ctrl_c()
        .await
        .wrap_err("Failed to listen for shutdown signal")?;

    info!("Shutting down");
    Ok(())
}
