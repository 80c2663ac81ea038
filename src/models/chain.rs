use serde::{Deserialize, Serialize};

/// Private transaction manager fronting a chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrivateTxManagerType {
    Tessera,
    Orion,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrivateTxManager {
    pub url: String,
    pub r#type: PrivateTxManagerType,
}

/// Chain repository model: a registered network reachable by name within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chain {
    pub uuid: String,
    pub name: String,
    pub tenant_id: String,
    pub chain_id: u64,
    pub urls: Vec<String>,
    pub private_tx_manager: Option<PrivateTxManager>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainFilter {
    pub names: Option<Vec<String>>,
    pub tenant_ids: Option<Vec<String>>,
}

impl ChainFilter {
    pub fn by_name(name: impl Into<String>, tenant_ids: Vec<String>) -> Self {
        Self {
            names: Some(vec![name.into()]),
            tenant_ids: Some(tenant_ids),
        }
    }

    pub fn matches(&self, chain: &Chain) -> bool {
        let name_matches = self
            .names
            .as_ref()
            .is_none_or(|names| names.contains(&chain.name));
        let tenant_matches = self
            .tenant_ids
            .as_ref()
            .is_none_or(|tenants| tenants.contains(&chain.tenant_id));
        name_matches && tenant_matches
    }
}
