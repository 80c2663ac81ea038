//! Transaction request model.
//!
//! A `TxRequest` is the client-visible record of one logical send. It is
//! immutable once accepted; only the state of its schedule evolves.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::{
    models::{OrchestratorError, Schedule},
    utils::generate_uuid,
};

mod request;
pub use request::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TxRequest {
    pub uuid: String,
    pub idempotency_key: String,
    pub chain_name: String,
    pub tenant_id: String,
    pub owner_id: Option<String>,
    pub labels: HashMap<String, String>,
    pub params: TransactionParams,
    pub request_hash: String,
    pub schedule: Schedule,
    pub created_at: String,
}

impl TxRequest {
    pub fn new(
        idempotency_key: impl Into<String>,
        request: &SendTransactionRequest,
        request_hash: impl Into<String>,
        schedule: Schedule,
    ) -> Self {
        Self {
            uuid: generate_uuid(),
            idempotency_key: idempotency_key.into(),
            chain_name: request.chain_name.clone(),
            tenant_id: schedule.tenant_id.clone(),
            owner_id: schedule.owner_id.clone(),
            labels: request.labels.clone(),
            params: request.params.clone(),
            request_hash: request_hash.into(),
            schedule,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Fingerprint of a request on a given chain, used to detect idempotency key reuse.
///
/// The hash is the hex encoded SHA-256 of the JSON document
/// `{"chain_uuid": ..., "params": ...}`. Struct fields serialize in declaration
/// order, which keeps the document stable across calls.
pub fn request_hash(chain_uuid: &str, params: &TransactionParams) -> Result<String, OrchestratorError> {
    let document = json!({
        "chain_uuid": chain_uuid,
        "params": params,
    });
    let bytes = serde_json::to_vec(&document).map_err(|e| {
        OrchestratorError::InvalidParameter(format!("failed to serialize request: {}", e))
    })?;

    Ok(hex::encode(Sha256::digest(&bytes)))
}
