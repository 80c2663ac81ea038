//! Gas price escalation for replacement transactions.
use crate::{
    constants::MIN_BUMP_PERCENT,
    models::{EthTransaction, InternalData, OrchestratorError},
};

/// Fee fields of a replacement transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpedFees {
    pub gas_price: Option<u128>,
    pub gas_fee_cap: Option<u128>,
    pub gas_tip_cap: Option<u128>,
    /// Price the limit is computed from, carried over to every retry of a family.
    pub base_gas_price: u128,
}

/// Smallest price a node accepts for replacing a transaction priced `previous_price`.
///
/// `None` when the bumped price does not fit in a `u128`.
pub fn calculate_min_bump(previous_price: u128) -> Option<u128> {
    previous_price
        .checked_mul(100 + MIN_BUMP_PERCENT)
        .map(|price| price / 100)
}

const PPM: u128 = 1_000_000;

/// Ceiling of `price * (1 + fraction)`, the fraction resolved to parts per million.
fn apply_fraction(price: u128, fraction: f64) -> Option<u128> {
    let factor = PPM.saturating_add((fraction.max(0.0) * PPM as f64).round() as u128);
    price.checked_mul(factor).map(|scaled| scaled.div_ceil(PPM))
}

fn overflow(price: u128) -> OrchestratorError {
    OrchestratorError::InvalidParameter(format!("gas price {} cannot be bumped further", price))
}

fn bump(price: u128, increment: f64) -> Result<u128, OrchestratorError> {
    let bumped = apply_fraction(price, increment).ok_or_else(|| overflow(price))?;
    let minimum = calculate_min_bump(price).ok_or_else(|| overflow(price))?;
    Ok(bumped.max(minimum))
}

/// Computes the fees of a retry of `transaction`.
///
/// The price (or fee cap and tip cap) grows by `increment`, by at least the
/// minimum replacement bump. With a gas price limit the price never exceeds
/// `base * (1 + limit)`; a limit leaving no room for a valid replacement is
/// rejected.
pub fn bump_fees(
    transaction: &EthTransaction,
    internal_data: &InternalData,
    increment: f64,
) -> Result<BumpedFees, OrchestratorError> {
    if !increment.is_finite() || increment < 0.0 {
        return Err(OrchestratorError::InvalidParameter(format!(
            "invalid gas increment {}",
            increment
        )));
    }

    let current = if transaction.is_dynamic_fee() {
        transaction.gas_fee_cap
    } else {
        transaction.gas_price
    }
    .ok_or_else(|| {
        OrchestratorError::InvalidParameter("job has no gas price to bump".to_string())
    })?;

    let base_gas_price = internal_data.base_gas_price.unwrap_or(current);
    let cap = internal_data
        .gas_price_limit
        .map(|limit| apply_fraction(base_gas_price, limit).ok_or_else(|| overflow(base_gas_price)))
        .transpose()?;

    let capped = |price: u128, previous: u128| -> Result<u128, OrchestratorError> {
        match cap {
            Some(cap) if calculate_min_bump(previous).is_none_or(|minimum| minimum > cap) => {
                Err(OrchestratorError::InvalidParameter(format!(
                    "gas price limit {} reached",
                    cap
                )))
            }
            Some(cap) => Ok(price.min(cap)),
            None => Ok(price),
        }
    };

    if transaction.is_dynamic_fee() {
        let gas_fee_cap = capped(bump(current, increment)?, current)?;
        let gas_tip_cap = transaction
            .gas_tip_cap
            .map(|tip| bump(tip, increment).map(|tip| tip.min(gas_fee_cap)))
            .transpose()?;

        Ok(BumpedFees {
            gas_price: None,
            gas_fee_cap: Some(gas_fee_cap),
            gas_tip_cap,
            base_gas_price,
        })
    } else {
        Ok(BumpedFees {
            gas_price: Some(capped(bump(current, increment)?, current)?),
            gas_fee_cap: None,
            gas_tip_cap: None,
            base_gas_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    const GWEI: u128 = 1_000_000_000;

    fn legacy(gas_price: u128) -> EthTransaction {
        EthTransaction {
            gas_price: Some(gas_price),
            ..Default::default()
        }
    }

    #[test]
    fn test_calculate_min_bump() {
        assert_eq!(calculate_min_bump(20 * GWEI), Some(22 * GWEI));
        assert_eq!(calculate_min_bump(0), Some(0));
        assert_eq!(calculate_min_bump(u128::MAX / 50), None);
    }

    #[test]
    fn test_bump_uses_increment_above_minimum() {
        let fees = bump_fees(&legacy(20 * GWEI), &InternalData::default(), 0.5).unwrap();
        assert_eq!(fees.gas_price, Some(30 * GWEI));
        assert_eq!(fees.base_gas_price, 20 * GWEI);
    }

    #[test]
    fn test_bump_never_below_minimum() {
        let fees = bump_fees(&legacy(20 * GWEI), &InternalData::default(), 0.01).unwrap();
        assert_eq!(fees.gas_price, Some(22 * GWEI));
    }

    #[test]
    fn test_bump_capped_by_limit_over_base() {
        let internal_data = InternalData {
            gas_price_limit: Some(0.3),
            base_gas_price: Some(20 * GWEI),
            ..Default::default()
        };
        let fees = bump_fees(&legacy(22 * GWEI), &internal_data, 0.5).unwrap();
        assert_eq!(fees.gas_price, Some(26 * GWEI));

        let exhausted = bump_fees(&legacy(26 * GWEI), &internal_data, 0.1);
        assert!(matches!(
            exhausted,
            Err(OrchestratorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_bump_dynamic_fee() {
        let tx = EthTransaction {
            transaction_type: Some(TransactionType::DynamicFee),
            gas_fee_cap: Some(100 * GWEI),
            gas_tip_cap: Some(2 * GWEI),
            ..Default::default()
        };

        let fees = bump_fees(&tx, &InternalData::default(), 0.1).unwrap();

        assert_eq!(fees.gas_price, None);
        assert_eq!(fees.gas_fee_cap, Some(110 * GWEI));
        assert_eq!(fees.gas_tip_cap, Some(2_200_000_000));
    }

    #[test]
    fn test_apply_fraction_is_exact() {
        assert_eq!(apply_fraction(50 * GWEI, 0.1), Some(55 * GWEI));
        assert_eq!(apply_fraction(20 * GWEI, 0.3), Some(26 * GWEI));
        assert_eq!(apply_fraction(3, 0.5), Some(5));
        assert_eq!(apply_fraction(u128::MAX / 50, 0.1), None);
    }

    #[test]
    fn test_bump_rejects_missing_price_and_bad_increment() {
        assert!(bump_fees(&EthTransaction::default(), &InternalData::default(), 0.1).is_err());
        assert!(bump_fees(&legacy(GWEI), &InternalData::default(), -0.1).is_err());
        assert!(bump_fees(&legacy(GWEI), &InternalData::default(), f64::NAN).is_err());
    }

    #[test]
    fn test_bump_huge_price_rejected_without_overflow() {
        let huge = u128::MAX / 50;

        let legacy_result = bump_fees(&legacy(huge), &InternalData::default(), 0.1);
        assert!(matches!(
            legacy_result,
            Err(OrchestratorError::InvalidParameter(_))
        ));

        let dynamic = EthTransaction {
            transaction_type: Some(TransactionType::DynamicFee),
            gas_fee_cap: Some(100 * GWEI),
            gas_tip_cap: Some(huge),
            ..Default::default()
        };
        assert!(bump_fees(&dynamic, &InternalData::default(), 0.1).is_err());

        let capped = InternalData {
            gas_price_limit: Some(0.5),
            base_gas_price: Some(huge),
            ..Default::default()
        };
        assert!(bump_fees(&legacy(GWEI), &capped, 0.1).is_err());
    }
}
