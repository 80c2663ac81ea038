//! This module provides functionality for processing configuration files and populating
//! repositories.
use crate::{
    config::Config,
    jobs::JobProducerTrait,
    models::{AppState, Chain},
    repositories::{ChainRepository, FaucetRepository},
};
use color_eyre::{eyre::WrapErr, Result};
use log::info;

/// Process all chains from the config file and store them in the repository.
async fn process_chains<J: JobProducerTrait + 'static>(
    config_file: &Config,
    app_state: &AppState<J>,
) -> Result<()> {
    for chain in &config_file.chains {
        app_state
            .chain_repository
            .insert_chain(Chain::from(chain.clone()))
            .await
            .wrap_err_with(|| format!("Failed to register chain {}", chain.name))?;
    }
    Ok(())
}

/// Process all faucets from the config file and store them in the repository.
async fn process_faucets<J: JobProducerTrait + 'static>(
    config_file: &Config,
    app_state: &AppState<J>,
) -> Result<()> {
    for faucet in &config_file.faucets {
        let faucet = faucet
            .to_faucet()
            .wrap_err("Failed to convert faucet config")?;
        app_state
            .faucet_repository
            .insert_faucet(faucet)
            .await
            .wrap_err("Failed to create faucet repository entry")?;
    }
    Ok(())
}

/// Process a complete configuration file by initializing all repositories.
///
/// Chains are registered before faucets since faucets reference them.
pub async fn process_config_file<J: JobProducerTrait + 'static>(
    config_file: Config,
    app_state: &AppState<J>,
) -> Result<()> {
    process_chains(&config_file, app_state).await?;
    process_faucets(&config_file, app_state).await?;

    info!(
        "Registered {} chains and {} faucets",
        config_file.chains.len(),
        config_file.faucets.len()
    );
    Ok(())
}
