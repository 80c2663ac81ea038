//! Chain section of the configuration file.
//!
//! Each entry registers a network reachable by name within a tenant. Names
//! are unique per tenant, UUIDs are unique across the file.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ConfigFileError;
use crate::{
    constants::{DEFAULT_TENANT, NAME_REGEX},
    models::{Chain, PrivateTxManager},
};

fn default_tenant() -> String {
    DEFAULT_TENANT.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChainFileConfig {
    pub uuid: String,
    pub name: String,
    #[serde(default = "default_tenant")]
    pub tenant_id: String,
    pub chain_id: u64,
    pub urls: Vec<String>,
    pub private_tx_manager: Option<PrivateTxManager>,
}

fn is_node_url(url: &str) -> bool {
    ["http://", "https://", "ws://", "wss://"]
        .iter()
        .any(|scheme| url.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

impl ChainFileConfig {
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        if self.uuid.is_empty() {
            return Err(ConfigFileError::MissingField("chain uuid".into()));
        }
        if self.name.is_empty() {
            return Err(ConfigFileError::MissingField("chain name".into()));
        }
        if !NAME_REGEX.is_match(&self.name) {
            return Err(ConfigFileError::InvalidName(format!(
                "Chain name '{}' must contain only letters, numbers, dashes and underscores",
                self.name
            )));
        }
        if self.urls.is_empty() {
            return Err(ConfigFileError::MissingField(format!(
                "urls of chain '{}'",
                self.name
            )));
        }
        if let Some(url) = self.urls.iter().find(|url| !is_node_url(url)) {
            return Err(ConfigFileError::InvalidUrl(format!(
                "Chain '{}' has an invalid node URL '{}'",
                self.name, url
            )));
        }
        if let Some(manager) = &self.private_tx_manager {
            if !is_node_url(&manager.url) {
                return Err(ConfigFileError::InvalidUrl(format!(
                    "Chain '{}' has an invalid private transaction manager URL",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

impl From<ChainFileConfig> for Chain {
    fn from(config: ChainFileConfig) -> Self {
        Chain {
            uuid: config.uuid,
            name: config.name,
            tenant_id: config.tenant_id,
            chain_id: config.chain_id,
            urls: config.urls,
            private_tx_manager: config.private_tx_manager,
        }
    }
}

/// Validates every chain and the uniqueness rules across them.
pub fn validate_chains(chains: &[ChainFileConfig]) -> Result<(), ConfigFileError> {
    let mut uuids = HashSet::new();
    let mut names = HashSet::new();

    for chain in chains {
        chain.validate()?;
        if !uuids.insert(chain.uuid.as_str()) {
            return Err(ConfigFileError::DuplicateId(format!(
                "chain uuid '{}'",
                chain.uuid
            )));
        }
        if !names.insert((chain.tenant_id.as_str(), chain.name.as_str())) {
            return Err(ConfigFileError::DuplicateId(format!(
                "chain name '{}' in tenant '{}'",
                chain.name, chain.tenant_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrivateTxManagerType;

    fn chain(uuid: &str, name: &str) -> ChainFileConfig {
        ChainFileConfig {
            uuid: uuid.to_string(),
            name: name.to_string(),
            tenant_id: DEFAULT_TENANT.to_string(),
            chain_id: 888,
            urls: vec!["http://besu1:8545".to_string()],
            private_tx_manager: None,
        }
    }

    #[test]
    fn test_valid_chain() {
        let mut config = chain("1", "besu1");
        config.private_tx_manager = Some(PrivateTxManager {
            url: "http://tessera1:9080".to_string(),
            r#type: PrivateTxManagerType::Tessera,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_chain_fields() {
        assert!(matches!(
            chain("", "besu1").validate(),
            Err(ConfigFileError::MissingField(_))
        ));
        assert!(matches!(
            chain("1", "besu 1").validate(),
            Err(ConfigFileError::InvalidName(_))
        ));

        let mut no_urls = chain("1", "besu1");
        no_urls.urls.clear();
        assert!(matches!(no_urls.validate(), Err(ConfigFileError::MissingField(_))));

        let mut bad_url = chain("1", "besu1");
        bad_url.urls = vec!["besu1:8545".to_string()];
        assert!(matches!(bad_url.validate(), Err(ConfigFileError::InvalidUrl(_))));
    }

    #[test]
    fn test_duplicate_chains() {
        assert!(matches!(
            validate_chains(&[chain("1", "besu1"), chain("1", "besu2")]),
            Err(ConfigFileError::DuplicateId(_))
        ));
        assert!(matches!(
            validate_chains(&[chain("1", "besu1"), chain("2", "besu1")]),
            Err(ConfigFileError::DuplicateId(_))
        ));

        let mut other_tenant = chain("2", "besu1");
        other_tenant.tenant_id = "tenant-1".to_string();
        assert!(validate_chains(&[chain("1", "besu1"), other_tenant]).is_ok());
    }

    #[test]
    fn test_tenant_defaults_when_omitted() {
        let config: ChainFileConfig = serde_json::from_str(
            r#"{"uuid": "1", "name": "besu1", "chain_id": 888, "urls": ["http://besu1:8545"]}"#,
        )
        .unwrap();
        assert_eq!(config.tenant_id, DEFAULT_TENANT);
        assert_eq!(Chain::from(config).chain_id, 888);
    }
}
