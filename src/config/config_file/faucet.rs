//! Faucet section of the configuration file.
//!
//! Amounts are decimal or `0x` prefixed hexadecimal strings in wei.
use std::{collections::HashSet, str::FromStr};

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::ConfigFileError;
use crate::{constants::DEFAULT_TENANT, models::Faucet};

fn default_tenant() -> String {
    DEFAULT_TENANT.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FaucetFileConfig {
    pub uuid: String,
    pub name: String,
    #[serde(default = "default_tenant")]
    pub tenant_id: String,
    /// UUID of the chain the faucet credits on.
    pub chain_rule: String,
    pub creditor_account: String,
    pub amount: String,
    pub max_balance: String,
    #[serde(default)]
    pub cooldown_seconds: u64,
}

fn parse_wei(field: &str, faucet: &str, value: &str) -> Result<U256, ConfigFileError> {
    U256::from_str(value).map_err(|_| {
        ConfigFileError::InvalidAmount(format!(
            "Faucet '{}' has an invalid {} '{}'",
            faucet, field, value
        ))
    })
}

impl FaucetFileConfig {
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        if self.uuid.is_empty() {
            return Err(ConfigFileError::MissingField("faucet uuid".into()));
        }
        if self.name.is_empty() {
            return Err(ConfigFileError::MissingField("faucet name".into()));
        }
        if self.chain_rule.is_empty() {
            return Err(ConfigFileError::MissingField(format!(
                "chain_rule of faucet '{}'",
                self.name
            )));
        }
        Address::from_str(&self.creditor_account).map_err(|_| {
            ConfigFileError::InvalidAddress(format!(
                "Faucet '{}' has an invalid creditor account",
                self.name
            ))
        })?;

        let amount = parse_wei("amount", &self.name, &self.amount)?;
        parse_wei("max_balance", &self.name, &self.max_balance)?;
        if amount.is_zero() {
            return Err(ConfigFileError::InvalidAmount(format!(
                "Faucet '{}' amount must be greater than zero",
                self.name
            )));
        }
        Ok(())
    }

    pub fn to_faucet(&self) -> Result<Faucet, ConfigFileError> {
        Ok(Faucet {
            uuid: self.uuid.clone(),
            name: self.name.clone(),
            tenant_id: self.tenant_id.clone(),
            chain_rule: self.chain_rule.clone(),
            creditor_account: self.creditor_account.clone(),
            amount: parse_wei("amount", &self.name, &self.amount)?,
            max_balance: parse_wei("max_balance", &self.name, &self.max_balance)?,
            cooldown_seconds: self.cooldown_seconds,
        })
    }
}

/// Validates every faucet, the uniqueness of their UUIDs and their chain references.
pub fn validate_faucets(
    faucets: &[FaucetFileConfig],
    chain_uuids: &HashSet<&str>,
) -> Result<(), ConfigFileError> {
    let mut uuids = HashSet::new();

    for faucet in faucets {
        faucet.validate()?;
        if !uuids.insert(faucet.uuid.as_str()) {
            return Err(ConfigFileError::DuplicateId(format!(
                "faucet uuid '{}'",
                faucet.uuid
            )));
        }
        if !chain_uuids.contains(faucet.chain_rule.as_str()) {
            return Err(ConfigFileError::InvalidReference(format!(
                "Faucet '{}' references non-existent chain '{}'",
                faucet.name, faucet.chain_rule
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faucet(uuid: &str) -> FaucetFileConfig {
        FaucetFileConfig {
            uuid: uuid.to_string(),
            name: format!("faucet-{}", uuid),
            tenant_id: DEFAULT_TENANT.to_string(),
            chain_rule: "chain-1".to_string(),
            creditor_account: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            amount: "60000000000000000".to_string(),
            max_balance: "0x16345785d8a0000".to_string(),
            cooldown_seconds: 10,
        }
    }

    #[test]
    fn test_faucet_amounts_parse_decimal_and_hex() {
        let faucet = faucet("1").to_faucet().unwrap();
        assert_eq!(faucet.amount, U256::from(60_000_000_000_000_000u64));
        assert_eq!(faucet.max_balance, U256::from(100_000_000_000_000_000u64));
    }

    #[test]
    fn test_invalid_faucet_fields() {
        let mut bad_account = faucet("1");
        bad_account.creditor_account = "0x1234".to_string();
        assert!(matches!(bad_account.validate(), Err(ConfigFileError::InvalidAddress(_))));

        let mut zero = faucet("1");
        zero.amount = "0".to_string();
        assert!(matches!(zero.validate(), Err(ConfigFileError::InvalidAmount(_))));

        let mut garbage = faucet("1");
        garbage.max_balance = "lots".to_string();
        assert!(matches!(garbage.validate(), Err(ConfigFileError::InvalidAmount(_))));
    }

    #[test]
    fn test_faucet_references() {
        let chains: HashSet<&str> = ["chain-1"].into();

        assert!(validate_faucets(&[faucet("1"), faucet("2")], &chains).is_ok());
        assert!(matches!(
            validate_faucets(&[faucet("1"), faucet("1")], &chains),
            Err(ConfigFileError::DuplicateId(_))
        ));

        let mut orphan = faucet("3");
        orphan.chain_rule = "chain-9".to_string();
        assert!(matches!(
            validate_faucets(&[orphan], &chains),
            Err(ConfigFileError::InvalidReference(_))
        ));
    }
}
