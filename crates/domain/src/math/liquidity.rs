//! Share minting and redemption arithmetic.
//!
//! First deposit mints `isqrt(amount_low * amount_high)` shares, of which
//! [`MINIMUM_LIQUIDITY`] is permanently locked in the pool and never owned
//! by any depositor. The lock blunts first-depositor price manipulation and
//! makes a full drain structurally impossible: user-held shares can never
//! reach `total_shares`, so the pool stays Active once funded.

use super::{Rounding, isqrt, mul_div};
use crate::error::AmmError;
use crate::token::{Amount, Shares, narrow_shares};

/// Share units permanently locked on the first deposit.
pub const MINIMUM_LIQUIDITY: u128 = 1_000;

/// Outcome of a first deposit into an empty pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialMint {
    /// Shares credited to the depositor.
    pub minted: Shares,
    /// Total shares outstanding, including the locked floor.
    pub total: Shares,
}

/// Computes the initial share mint for an empty pool.
///
/// # Errors
/// - [`AmmError::Validation`] if either amount is zero, or the deposit's
///   geometric mean does not exceed the locked minimum.
/// - [`AmmError::Overflow`] if the widened product cannot be narrowed.
pub fn initial_mint(amount_low: Amount, amount_high: Amount) -> Result<InitialMint, AmmError> {
    if amount_low.is_zero() || amount_high.is_zero() {
        return Err(AmmError::Validation("first deposit requires both tokens"));
    }
    let total = narrow_shares(isqrt(amount_low.widen() * amount_high.widen()))
        .ok_or(AmmError::Overflow("initial share mint"))?;
    if total.raw() <= MINIMUM_LIQUIDITY {
        return Err(AmmError::Validation(
            "first deposit too small to cover the liquidity lock",
        ));
    }
    Ok(InitialMint {
        minted: Shares::new(total.raw() - MINIMUM_LIQUIDITY),
        total,
    })
}

/// Paired amount required to keep the current reserve ratio:
/// `amount_low * reserve_high / reserve_low`, rounded up so the pool is
/// never underpaid.
///
/// # Errors
/// - [`AmmError::InsufficientLiquidity`] if the low reserve is zero.
/// - [`AmmError::Overflow`] on widened-arithmetic overflow.
pub fn required_paired_amount(
    amount_low: Amount,
    reserve_low: Amount,
    reserve_high: Amount,
) -> Result<Amount, AmmError> {
    if reserve_low.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    mul_div(
        amount_low.raw(),
        reserve_high.raw(),
        reserve_low.raw(),
        Rounding::Up,
    )
    .map(Amount::new)
    .ok_or(AmmError::Overflow("paired amount"))
}

/// Proportional share mint for a deposit into an active pool:
/// `total_shares * amount_low / reserve_low`, rounded down.
///
/// # Errors
/// - [`AmmError::InsufficientLiquidity`] if the low reserve is zero.
/// - [`AmmError::Validation`] if the deposit is too small to mint anything.
/// - [`AmmError::Overflow`] on widened-arithmetic overflow.
pub fn proportional_mint(
    amount_low: Amount,
    reserve_low: Amount,
    total_shares: Shares,
) -> Result<Shares, AmmError> {
    if reserve_low.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let minted = mul_div(
        total_shares.raw(),
        amount_low.raw(),
        reserve_low.raw(),
        Rounding::Down,
    )
    .ok_or(AmmError::Overflow("proportional mint"))?;
    if minted == 0 {
        return Err(AmmError::Validation("deposit too small to mint shares"));
    }
    Ok(Shares::new(minted))
}

/// Token amounts redeemed for `shares`: `reserve * shares / total_shares`
/// per side, rounded down.
///
/// # Errors
/// - [`AmmError::InsufficientLiquidity`] if no shares are outstanding.
/// - [`AmmError::Overflow`] on widened-arithmetic overflow.
pub fn redemption_amounts(
    shares: Shares,
    reserve_low: Amount,
    reserve_high: Amount,
    total_shares: Shares,
) -> Result<(Amount, Amount), AmmError> {
    if total_shares.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let low = mul_div(
        reserve_low.raw(),
        shares.raw(),
        total_shares.raw(),
        Rounding::Down,
    )
    .ok_or(AmmError::Overflow("redemption low"))?;
    let high = mul_div(
        reserve_high.raw(),
        shares.raw(),
        total_shares.raw(),
        Rounding::Down,
    )
    .ok_or(AmmError::Overflow("redemption high"))?;
    Ok((Amount::new(low), Amount::new(high)))
}
