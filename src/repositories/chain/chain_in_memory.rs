use crate::{
    models::{Chain, ChainFilter, RepositoryError},
    repositories::ChainRepository,
};
use async_trait::async_trait;
use itertools::Itertools;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryChainRepository {
    store: Mutex<HashMap<String, Chain>>,
}

impl InMemoryChainRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ChainRepository for InMemoryChainRepository {
    async fn insert_chain(&self, chain: Chain) -> Result<Chain, RepositoryError> {
        let mut store = self.store.lock().await;
        if store.contains_key(&chain.uuid) {
            return Err(RepositoryError::AlreadyExists(format!(
                "Chain with UUID {} already exists",
                chain.uuid
            )));
        }
        if store
            .values()
            .any(|c| c.name == chain.name && c.tenant_id == chain.tenant_id)
        {
            return Err(RepositoryError::AlreadyExists(format!(
                "Chain with name {} already exists for tenant {}",
                chain.name, chain.tenant_id
            )));
        }
        store.insert(chain.uuid.clone(), chain.clone());
        Ok(chain)
    }

    async fn search_chains(&self, filter: ChainFilter) -> Result<Vec<Chain>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .values()
            .filter(|chain| filter.matches(chain))
            .cloned()
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect())
    }

    async fn find_chain_by_uuid(&self, uuid: &str) -> Result<Chain, RepositoryError> {
        let store = self.store.lock().await;
        store
            .get(uuid)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Chain with UUID {} not found", uuid)))
    }

    async fn delete_chain(&self, uuid: &str) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        store
            .remove(uuid)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("Chain with UUID {} not found", uuid)))
    }
}
