use crate::error::AmmError;
use crate::math::{Rounding, mul_div};
use crate::pool::{PoolId, PoolState};
use crate::token::{Amount, Shares, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's claim on a pool, denominated in shares.
///
/// Shares are authoritative; the recorded deposit amounts are informational
/// only and never used for valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPosition {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// The pool this claim is against.
    pub pool_id: PoolId,
    /// Owned shares.
    pub shares: Shares,
    /// Low-token amount contributed over the position's lifetime.
    pub deposited_low: Amount,
    /// High-token amount contributed over the position's lifetime.
    pub deposited_high: Amount,
    /// First deposit timestamp.
    pub created_at: DateTime<Utc>,
    /// Last deposit/withdrawal timestamp.
    pub updated_at: DateTime<Utc>,
}

impl LiquidityPosition {
    /// Opens a position on first deposit.
    #[must_use]
    pub fn open(
        user_id: UserId,
        pool_id: PoolId,
        shares: Shares,
        deposited_low: Amount,
        deposited_high: Amount,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            pool_id,
            shares,
            deposited_low,
            deposited_high,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Live valuation of a position against current reserves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionValuation {
    /// Owned shares.
    pub shares: Shares,
    /// Current low-token value: `shares * reserve_low / total_shares`.
    pub value_low: Amount,
    /// Current high-token value: `shares * reserve_high / total_shares`.
    pub value_high: Amount,
    /// Fraction of the pool owned, in `[0, 1)`.
    pub share_of_pool: Decimal,
}

impl PositionValuation {
    /// Values `shares` against the pool's live reserves.
    ///
    /// # Errors
    /// - [`AmmError::InsufficientLiquidity`] if the pool has no shares.
    /// - [`AmmError::Overflow`] on widened-arithmetic overflow.
    pub fn of(shares: Shares, pool: &PoolState) -> Result<Self, AmmError> {
        if pool.total_shares.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        let value_low = mul_div(
            shares.raw(),
            pool.reserve_low.raw(),
            pool.total_shares.raw(),
            Rounding::Down,
        )
        .map(Amount::new)
        .ok_or(AmmError::Overflow("position low valuation"))?;
        let value_high = mul_div(
            shares.raw(),
            pool.reserve_high.raw(),
            pool.total_shares.raw(),
            Rounding::Down,
        )
        .map(Amount::new)
        .ok_or(AmmError::Overflow("position high valuation"))?;

        let owned = Decimal::from_u128(shares.raw())
            .ok_or(AmmError::Overflow("shares to decimal"))?;
        let total = Decimal::from_u128(pool.total_shares.raw())
            .ok_or(AmmError::Overflow("total shares to decimal"))?;

        Ok(Self {
            shares,
            value_low,
            value_high,
            share_of_pool: owned / total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fee::FeeRate;
    use crate::pair::PairId;
    use rust_decimal_macros::dec;

    fn pool(reserve_low: u128, reserve_high: u128, shares: u128) -> PoolState {
        let mut p = PoolState::empty(PairId::generate(), FeeRate::default());
        p.reserve_low = Amount::new(reserve_low);
        p.reserve_high = Amount::new(reserve_high);
        p.total_shares = Shares::new(shares);
        p
    }

    #[test]
    fn valuation_tracks_reserves_not_deposits() {
        let p = pool(2_000_000, 8_000_000, 4_000_000);
        let v = PositionValuation::of(Shares::new(1_000_000), &p).unwrap();
        assert_eq!(v.value_low, Amount::new(500_000));
        assert_eq!(v.value_high, Amount::new(2_000_000));
        assert_eq!(v.share_of_pool, dec!(0.25));
    }

    #[test]
    fn valuation_moves_with_reserves() {
        // Same shares, reserves shifted by trading; valuation follows.
        let before = pool(1_000_000, 1_000_000, 1_000_000);
        let after = pool(1_100_000, 909_339, 1_000_000);
        let shares = Shares::new(100_000);
        let v1 = PositionValuation::of(shares, &before).unwrap();
        let v2 = PositionValuation::of(shares, &after).unwrap();
        assert!(v2.value_low > v1.value_low);
        assert!(v2.value_high < v1.value_high);
    }

    #[test]
    fn empty_pool_has_no_valuation() {
        let p = PoolState::empty(PairId::generate(), FeeRate::default());
        assert!(PositionValuation::of(Shares::new(1), &p).is_err());
    }
}
