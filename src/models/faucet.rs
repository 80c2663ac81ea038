use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Funding source able to top up accounts on one chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Faucet {
    pub uuid: String,
    pub name: String,
    pub tenant_id: String,
    /// UUID of the chain this faucet credits on.
    pub chain_rule: String,
    pub creditor_account: String,
    pub amount: U256,
    pub max_balance: U256,
    pub cooldown_seconds: u64,
}

/// Funding request evaluated by the faucet candidate service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaucetRequest {
    pub chain_uuid: String,
    pub chain_name: String,
    pub beneficiary: String,
    pub tenant_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaucetFilter {
    pub chain_rule: Option<String>,
    pub tenant_ids: Option<Vec<String>>,
}

impl FaucetFilter {
    pub fn matches(&self, faucet: &Faucet) -> bool {
        self.chain_rule
            .as_ref()
            .is_none_or(|rule| rule == &faucet.chain_rule)
            && self
                .tenant_ids
                .as_ref()
                .is_none_or(|tenants| tenants.contains(&faucet.tenant_id))
    }
}
