//! Chain registry.
//!
//! Chains are loaded from the configuration file at start-up and resolved by
//! name when a transaction request comes in.
mod chain_in_memory;
pub use chain_in_memory::*;

use crate::models::{Chain, ChainFilter, RepositoryError};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

#[async_trait]
#[cfg_attr(test, automock)]
pub trait ChainRepository: Send + Sync {
    async fn insert_chain(&self, chain: Chain) -> Result<Chain, RepositoryError>;

    async fn search_chains(&self, filter: ChainFilter) -> Result<Vec<Chain>, RepositoryError>;

    async fn find_chain_by_uuid(&self, uuid: &str) -> Result<Chain, RepositoryError>;

    async fn delete_chain(&self, uuid: &str) -> Result<(), RepositoryError>;
}
