//! Decoding of client-signed raw transactions.
use alloy::{
    consensus::{transaction::SignerRecoverable, Transaction as _, TxEnvelope},
    eips::eip2718::Decodable2718,
};

use crate::models::{EthTransaction, OrchestratorError, TransactionType};

fn invalid_raw(reason: impl std::fmt::Display) -> OrchestratorError {
    OrchestratorError::InvalidParameter(format!("invalid raw transaction: {}", reason))
}

/// Decodes a signed legacy or typed transaction and recovers its sender.
///
/// An EIP-155 or typed signature must commit to `chain_id`; pre-EIP-155
/// legacy signatures carry no chain id and are accepted on any chain.
pub fn decode_raw_transaction(raw: &str, chain_id: u64) -> Result<EthTransaction, OrchestratorError> {
    let bytes = hex::decode(raw.trim_start_matches("0x")).map_err(invalid_raw)?;
    let envelope = TxEnvelope::decode_2718(&mut bytes.as_slice()).map_err(invalid_raw)?;

    if let Some(signed_chain_id) = envelope.chain_id() {
        if signed_chain_id != chain_id {
            return Err(OrchestratorError::InvalidParameter(format!(
                "raw transaction is signed for chain id {} instead of {}",
                signed_chain_id, chain_id
            )));
        }
    }

    let sender = envelope.recover_signer().map_err(invalid_raw)?;
    let dynamic_fee = envelope.is_dynamic_fee();
    let input = envelope.input();

    Ok(EthTransaction {
        from: Some(sender.to_checksum(None)),
        to: envelope.to().map(|to| to.to_checksum(None)),
        nonce: Some(envelope.nonce()),
        value: Some(envelope.value()),
        gas: Some(envelope.gas_limit()),
        gas_price: if dynamic_fee { None } else { envelope.gas_price() },
        gas_fee_cap: dynamic_fee.then(|| envelope.max_fee_per_gas()),
        gas_tip_cap: if dynamic_fee {
            envelope.max_priority_fee_per_gas()
        } else {
            None
        },
        transaction_type: Some(if dynamic_fee {
            TransactionType::DynamicFee
        } else {
            TransactionType::Legacy
        }),
        data: (!input.is_empty()).then(|| format!("0x{}", hex::encode(input))),
        raw: Some(raw.to_string()),
        tx_hash: Some(envelope.tx_hash().to_string()),
        ..Default::default()
    })
}
