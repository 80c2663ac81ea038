//! Chains currently followed by the chain watcher.
use log::info;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::models::{Chain, TrackerError};

#[derive(Debug, Default)]
pub struct ChainTracker {
    chains: RwLock<HashMap<String, Chain>>,
}

impl ChainTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, chain: Chain) -> Result<(), TrackerError> {
        let mut chains = self.chains.write();
        if chains.contains_key(&chain.uuid) {
            return Err(TrackerError::AlreadyExists(format!(
                "chain {} is already tracked",
                chain.uuid
            )));
        }
        info!("Tracking chain {} ({})", chain.name, chain.uuid);
        chains.insert(chain.uuid.clone(), chain);
        Ok(())
    }

    pub fn remove(&self, chain_uuid: &str) -> Result<Chain, TrackerError> {
        self.chains
            .write()
            .remove(chain_uuid)
            .ok_or_else(|| TrackerError::NotFound(format!("chain {} is not tracked", chain_uuid)))
    }

    pub fn get(&self, chain_uuid: &str) -> Result<Chain, TrackerError> {
        self.chains
            .read()
            .get(chain_uuid)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("chain {} is not tracked", chain_uuid)))
    }

    pub fn list(&self) -> Vec<Chain> {
        self.chains.read().values().cloned().collect()
    }
}
