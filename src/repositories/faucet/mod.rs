mod faucet_in_memory;
pub use faucet_in_memory::*;

use crate::models::{Faucet, FaucetFilter, RepositoryError};
use async_trait::async_trait;

#[async_trait]
pub trait FaucetRepository: Send + Sync {
    async fn insert_faucet(&self, faucet: Faucet) -> Result<Faucet, RepositoryError>;

    async fn search_faucets(&self, filter: FaucetFilter) -> Result<Vec<Faucet>, RepositoryError>;
}
