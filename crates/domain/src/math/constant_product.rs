//! Constant-product swap pricing (`x * y = k`) with fee taken on input.
//!
//! Formula for an exact-in trade:
//!
//! 1. `effective_in = amount_in * (10000 - fee_bps) / 10000`
//! 2. `amount_out = reserve_out * effective_in / (reserve_in + effective_in)`
//! 3. The full nominal `amount_in` is added to the input reserve; the fee
//!    stays in the pool, so `k` never decreases and strictly grows whenever
//!    the fee is nonzero.

use crate::error::AmmError;
use crate::fee::{BPS_DENOMINATOR, FeeRate};
use crate::token::{Amount, narrow_amount};
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Computes the output amount for an exact-in swap.
///
/// Rounds down, so the strict bound `amount_out < reserve_out` holds for
/// every finite positive input; a dust input yields `Amount::ZERO` rather
/// than an error, matching the `amount_out -> 0` limit.
///
/// # Errors
/// - [`AmmError::InsufficientLiquidity`] if either reserve is zero.
/// - [`AmmError::Overflow`] if the widened arithmetic cannot be narrowed.
pub fn swap_output(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: FeeRate,
) -> Result<Amount, AmmError> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    if amount_in.is_zero() {
        return Ok(Amount::ZERO);
    }

    // effective_in is kept at bps scale to avoid a lossy early division:
    // amount_out = reserve_out * in * (10000 - fee) / (reserve_in * 10000 + in * (10000 - fee))
    let in_with_fee = amount_in.widen() * U256::from(fee.complement_bps());
    let numerator = reserve_out.widen() * in_with_fee;
    let denominator = reserve_in.widen() * U256::from(BPS_DENOMINATOR) + in_with_fee;

    let out = numerator / denominator;
    narrow_amount(out).ok_or(AmmError::Overflow("swap output narrow"))
}

/// Spot price of the input token denominated in the output token:
/// `reserve_out / reserve_in`.
///
/// # Errors
/// - [`AmmError::InsufficientLiquidity`] if the input reserve is zero.
/// - [`AmmError::Overflow`] if a reserve exceeds decimal range.
pub fn spot_price(reserve_in: Amount, reserve_out: Amount) -> Result<Decimal, AmmError> {
    if reserve_in.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let r_in = Decimal::from_u128(reserve_in.raw())
        .ok_or(AmmError::Overflow("reserve_in to decimal"))?;
    let r_out = Decimal::from_u128(reserve_out.raw())
        .ok_or(AmmError::Overflow("reserve_out to decimal"))?;
    Ok(r_out / r_in)
}

/// Normalized deviation of the trade's effective price from the pre-trade
/// spot price: `1 - (amount_out / amount_in) / spot_before`.
///
/// # Errors
/// - [`AmmError::Validation`] if `amount_in` is zero.
/// - [`AmmError::InsufficientLiquidity`] via [`spot_price`] on empty reserves.
pub fn price_impact(
    amount_in: Amount,
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> Result<Decimal, AmmError> {
    if amount_in.is_zero() {
        return Err(AmmError::Validation("price impact of zero input"));
    }
    let spot = spot_price(reserve_in, reserve_out)?;
    if spot.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let d_in = Decimal::from_u128(amount_in.raw())
        .ok_or(AmmError::Overflow("amount_in to decimal"))?;
    let d_out = Decimal::from_u128(amount_out.raw())
        .ok_or(AmmError::Overflow("amount_out to decimal"))?;
    let effective = d_out / d_in;
    Ok(Decimal::ONE - effective / spot)
}

/// The constant product `k = reserve_low * reserve_high`, widened.
#[must_use]
pub fn k(reserve_low: Amount, reserve_high: Amount) -> U256 {
    reserve_low.widen() * reserve_high.widen()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fee_30() -> FeeRate {
        FeeRate::from_bps(30).unwrap()
    }

    #[test]
    fn scenario_b_output_and_invariant() {
        // Reserves (1_000_000, 1_000_000), 30 bps, input 100_000.
        // effective_in = 99_700
        // out = 1_000_000 * 99_700 / 1_099_700 = 90_661 (floor)
        let r = Amount::new(1_000_000);
        let input = Amount::new(100_000);
        let out = swap_output(input, r, r, fee_30()).unwrap();
        assert_eq!(out, Amount::new(90_661));

        let k_before = k(r, r);
        let k_after = k(
            Amount::new(1_100_000),
            Amount::new(1_000_000 - 90_661),
        );
        assert!(k_after > k_before);
    }

    #[test]
    fn output_strictly_below_reserve() {
        // Even an absurdly large input cannot drain the pool.
        let out = swap_output(
            Amount::new(u128::MAX / 2),
            Amount::new(1_000),
            Amount::new(1_000),
            fee_30(),
        )
        .unwrap();
        assert!(out < Amount::new(1_000));
    }

    #[test]
    fn zero_input_yields_zero_output() {
        let out = swap_output(
            Amount::ZERO,
            Amount::new(1_000),
            Amount::new(1_000),
            fee_30(),
        )
        .unwrap();
        assert_eq!(out, Amount::ZERO);
    }

    #[test]
    fn dust_input_yields_zero_output() {
        let out = swap_output(
            Amount::new(1),
            Amount::new(1_000_000),
            Amount::new(1_000_000),
            fee_30(),
        )
        .unwrap();
        assert_eq!(out, Amount::ZERO);
    }

    #[test]
    fn empty_reserves_rejected() {
        let result = swap_output(
            Amount::new(10),
            Amount::ZERO,
            Amount::new(1_000),
            fee_30(),
        );
        assert_eq!(result, Err(AmmError::InsufficientLiquidity));
    }

    #[test]
    fn zero_fee_matches_plain_formula() {
        // out = 1_000_000 * 100_000 / 1_100_000 = 90_909 (floor)
        let out = swap_output(
            Amount::new(100_000),
            Amount::new(1_000_000),
            Amount::new(1_000_000),
            FeeRate::ZERO,
        )
        .unwrap();
        assert_eq!(out, Amount::new(90_909));
    }

    #[test]
    fn spot_price_ratio() {
        let price = spot_price(Amount::new(100), Amount::new(400)).unwrap();
        assert_eq!(price, dec!(4));
        let inverse = spot_price(Amount::new(400), Amount::new(100)).unwrap();
        assert_eq!(inverse, dec!(0.25));
    }

    #[test]
    fn price_impact_grows_with_trade_size() {
        let r = Amount::new(1_000_000);
        let small_out = swap_output(Amount::new(1_000), r, r, fee_30()).unwrap();
        let large_out = swap_output(Amount::new(500_000), r, r, fee_30()).unwrap();
        let small = price_impact(Amount::new(1_000), small_out, r, r).unwrap();
        let large = price_impact(Amount::new(500_000), large_out, r, r).unwrap();
        assert!(small > Decimal::ZERO);
        assert!(large > small);
        assert!(large < Decimal::ONE);
    }
}
