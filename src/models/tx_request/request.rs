//! Client-facing send request and its validation rules.
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, str::FromStr};

use crate::models::{OrchestratorError, PrivacyFlag, TransactionType};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PrivacyProtocol {
    #[serde(rename = "EEA")]
    Eea,
    #[serde(rename = "GoQuorum")]
    GoQuorum,
}

/// Gas escalation policy attached to the jobs of a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    pub interval_ms: u64,
    pub increment: f64,
    pub limit: f64,
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        if self.interval_ms == 0 {
            return Err(OrchestratorError::InvalidParameter(
                "retry interval must be greater than zero".to_string(),
            ));
        }
        if self.increment <= 0.0 {
            return Err(OrchestratorError::InvalidParameter(
                "gas price increment must be greater than zero".to_string(),
            ));
        }
        if self.limit < self.increment {
            return Err(OrchestratorError::InvalidParameter(
                "gas price limit must be greater than or equal to the increment".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TransactionParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub value: Option<U256>,
    pub gas: Option<u64>,
    pub gas_price: Option<u128>,
    pub gas_fee_cap: Option<u128>,
    pub gas_tip_cap: Option<u128>,
    pub transaction_type: Option<TransactionType>,
    pub nonce: Option<u64>,
    pub data: Option<String>,
    /// Signed RLP payload, hex encoded.
    pub raw: Option<String>,
    pub protocol: Option<PrivacyProtocol>,
    pub private_from: Option<String>,
    pub private_for: Option<Vec<String>>,
    pub mandatory_for: Option<Vec<String>>,
    pub privacy_group_id: Option<String>,
    pub privacy_flag: Option<PrivacyFlag>,
    #[serde(default)]
    pub one_time_key: bool,
    pub retry_policy: Option<RetryPolicy>,
}

impl TransactionParams {
    pub fn is_raw(&self) -> bool {
        self.raw.is_some()
    }

    pub fn validate(&self) -> Result<(), OrchestratorError> {
        for (name, address) in [("from", &self.from), ("to", &self.to)] {
            if let Some(address) = address {
                Address::from_str(address).map_err(|_| {
                    OrchestratorError::InvalidParameter(format!(
                        "{} is not a valid address: {}",
                        name, address
                    ))
                })?;
            }
        }

        if let Some(data) = &self.data {
            if !is_hex_string(data) {
                return Err(OrchestratorError::InvalidParameter(
                    "data must be a hex string".to_string(),
                ));
            }
        }

        if let Some(policy) = &self.retry_policy {
            policy.validate()?;
        }

        self.validate_fees()?;

        if let Some(raw) = &self.raw {
            return self.validate_raw(raw);
        }

        match self.protocol {
            None => self.validate_public(),
            Some(PrivacyProtocol::Eea) => self.validate_eea(),
            Some(PrivacyProtocol::GoQuorum) => self.validate_go_quorum(),
        }
    }

    fn validate_fees(&self) -> Result<(), OrchestratorError> {
        match self.transaction_type {
            Some(TransactionType::Legacy)
                if self.gas_fee_cap.is_some() || self.gas_tip_cap.is_some() =>
            {
                Err(OrchestratorError::InvalidParameter(
                    "fee cap and tip cap are not supported by legacy transactions".to_string(),
                ))
            }
            Some(TransactionType::DynamicFee) if self.gas_price.is_some() => {
                Err(OrchestratorError::InvalidParameter(
                    "gas price is not supported by dynamic fee transactions".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    fn validate_raw(&self, raw: &str) -> Result<(), OrchestratorError> {
        if !is_hex_string(raw) || raw.len() <= 2 {
            return Err(OrchestratorError::InvalidParameter(
                "raw must be a non-empty hex string".to_string(),
            ));
        }

        let mut conflicting = Vec::new();
        if self.from.is_some() {
            conflicting.push("from");
        }
        if self.to.is_some() {
            conflicting.push("to");
        }
        if self.data.is_some() {
            conflicting.push("data");
        }
        if self.protocol.is_some() {
            conflicting.push("protocol");
        }
        if self.one_time_key {
            conflicting.push("one_time_key");
        }

        if !conflicting.is_empty() {
            return Err(OrchestratorError::InvalidParameter(format!(
                "raw transactions cannot set {}",
                conflicting.join(", ")
            )));
        }
        Ok(())
    }

    fn validate_public(&self) -> Result<(), OrchestratorError> {
        match (self.from.is_some(), self.one_time_key) {
            (true, true) => Err(OrchestratorError::InvalidParameter(
                "from and one_time_key are mutually exclusive".to_string(),
            )),
            (false, false) => Err(OrchestratorError::InvalidParameter(
                "either from or one_time_key is required".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn validate_eea(&self) -> Result<(), OrchestratorError> {
        if self.private_from.is_none() {
            return Err(OrchestratorError::InvalidParameter(
                "private_from is required for EEA transactions".to_string(),
            ));
        }
        let has_private_for = self.private_for.as_ref().is_some_and(|p| !p.is_empty());
        if has_private_for == self.privacy_group_id.is_some() {
            return Err(OrchestratorError::InvalidParameter(
                "exactly one of private_for and privacy_group_id is required".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_go_quorum(&self) -> Result<(), OrchestratorError> {
        if self.one_time_key {
            return Err(OrchestratorError::InvalidParameter(
                "one_time_key is not supported by GoQuorum transactions".to_string(),
            ));
        }
        if self.from.is_none() {
            return Err(OrchestratorError::InvalidParameter(
                "from is required for GoQuorum transactions".to_string(),
            ));
        }
        if self.private_from.is_none() {
            return Err(OrchestratorError::InvalidParameter(
                "private_from is required for GoQuorum transactions".to_string(),
            ));
        }
        if self.private_for.as_ref().is_none_or(|p| p.is_empty()) {
            return Err(OrchestratorError::InvalidParameter(
                "private_for is required for GoQuorum transactions".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_hex_string(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendTransactionRequest {
    pub idempotency_key: Option<String>,
    pub chain_name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub params: TransactionParams,
}

impl SendTransactionRequest {
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        if self.chain_name.trim().is_empty() {
            return Err(OrchestratorError::InvalidParameter(
                "chain name is required".to_string(),
            ));
        }
        if self.idempotency_key.as_deref().is_some_and(str::is_empty) {
            return Err(OrchestratorError::InvalidParameter(
                "idempotency key cannot be empty".to_string(),
            ));
        }
        self.params.validate()
    }
}
