use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::models::OrchestratorError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
    Legacy,
    DynamicFee,
}

/// GoQuorum privacy enhancement flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyFlag {
    StandardPrivate,
    PartyProtection,
    MandatoryRecipients,
    PrivateStateValidation,
}

impl PrivacyFlag {
    pub fn as_u8(&self) -> u8 {
        match self {
            PrivacyFlag::StandardPrivate => 0,
            PrivacyFlag::PartyProtection => 1,
            PrivacyFlag::MandatoryRecipients => 2,
            PrivacyFlag::PrivateStateValidation => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EthTransaction {
    pub from: Option<String>,
    pub to: Option<String>,
    pub nonce: Option<u64>,
    pub value: Option<U256>,
    pub gas: Option<u64>,
    pub gas_price: Option<u128>,
    pub gas_fee_cap: Option<u128>,
    pub gas_tip_cap: Option<u128>,
    pub transaction_type: Option<TransactionType>,
    pub data: Option<String>,
    pub raw: Option<String>,
    pub tx_hash: Option<String>,
    pub private_from: Option<String>,
    pub private_for: Option<Vec<String>>,
    pub mandatory_for: Option<Vec<String>>,
    pub privacy_group_id: Option<String>,
    pub privacy_flag: Option<PrivacyFlag>,
    pub enclave_key: Option<String>,
}

impl EthTransaction {
    pub fn is_dynamic_fee(&self) -> bool {
        matches!(self.transaction_type, Some(TransactionType::DynamicFee))
            || (self.gas_price.is_none() && self.gas_fee_cap.is_some())
    }

    /// Applies `update` on top of the current payload.
    ///
    /// Once the transaction has reached the network only the hash and the
    /// enclave key may change; every other differing field is rejected.
    pub fn merge(&mut self, update: EthTransaction, submitted: bool) -> Result<(), OrchestratorError> {
        if submitted {
            let mut restricted = update.clone();
            restricted.tx_hash = self.tx_hash.clone();
            restricted.enclave_key = self.enclave_key.clone();
            let changed = self.changed_fields(&restricted);
            if !changed.is_empty() {
                return Err(OrchestratorError::InvalidParameter(format!(
                    "transaction already submitted, cannot update {}",
                    changed.join(", ")
                )));
            }
        }

        macro_rules! merge_fields {
            ($($field:ident),*) => {
                $(
                    if update.$field.is_some() {
                        self.$field = update.$field;
                    }
                )*
            };
        }

        merge_fields!(
            from,
            to,
            nonce,
            value,
            gas,
            gas_price,
            gas_fee_cap,
            gas_tip_cap,
            transaction_type,
            data,
            raw,
            tx_hash,
            private_from,
            private_for,
            mandatory_for,
            privacy_group_id,
            privacy_flag,
            enclave_key
        );

        Ok(())
    }

    /// Names of the fields set in `update` that differ from `self`.
    fn changed_fields(&self, update: &EthTransaction) -> Vec<&'static str> {
        let mut changed = Vec::new();

        macro_rules! diff_fields {
            ($($field:ident),*) => {
                $(
                    if update.$field.is_some() && update.$field != self.$field {
                        changed.push(stringify!($field));
                    }
                )*
            };
        }

        diff_fields!(
            from,
            to,
            nonce,
            value,
            gas,
            gas_price,
            gas_fee_cap,
            gas_tip_cap,
            transaction_type,
            data,
            raw,
            private_from,
            private_for,
            mandatory_for,
            privacy_group_id,
            privacy_flag
        );

        changed
    }
}
