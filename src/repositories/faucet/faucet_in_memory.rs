use crate::{
    models::{Faucet, FaucetFilter, RepositoryError},
    repositories::FaucetRepository,
};
use async_trait::async_trait;
use itertools::Itertools;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryFaucetRepository {
    store: Mutex<HashMap<String, Faucet>>,
}

impl InMemoryFaucetRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl FaucetRepository for InMemoryFaucetRepository {
    async fn insert_faucet(&self, faucet: Faucet) -> Result<Faucet, RepositoryError> {
        let mut store = self.store.lock().await;
        if store.contains_key(&faucet.uuid) {
            return Err(RepositoryError::AlreadyExists(format!(
                "Faucet with UUID {} already exists",
                faucet.uuid
            )));
        }
        store.insert(faucet.uuid.clone(), faucet.clone());
        Ok(faucet)
    }

    async fn search_faucets(&self, filter: FaucetFilter) -> Result<Vec<Faucet>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .values()
            .filter(|faucet| filter.matches(faucet))
            .cloned()
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect())
    }
}
