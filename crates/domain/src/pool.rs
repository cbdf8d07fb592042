use crate::error::AmmError;
use crate::fee::FeeRate;
use crate::math::constant_product;
use crate::pair::PairId;
use crate::token::{Amount, Shares};
use chrono::{DateTime, Utc};
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a liquidity pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PoolId(pub Uuid);

impl PoolId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of one liquidity pool. Owns its reserves exclusively; positions
/// are derived claims, never direct holdings.
///
/// Invariant: `total_shares > 0` if and only if both reserves are positive.
/// Spot prices are always derived from reserves, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Unique identifier.
    pub id: PoolId,
    /// The pair this pool serves (1:1).
    pub pair_id: PairId,
    /// Reserve of the low token.
    pub reserve_low: Amount,
    /// Reserve of the high token.
    pub reserve_high: Amount,
    /// Outstanding liquidity shares, including the locked floor.
    pub total_shares: Shares,
    /// Fee rate applied to swap inputs.
    pub fee: FeeRate,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PoolState {
    /// Creates an empty pool for a pair.
    #[must_use]
    pub fn empty(pair_id: PairId, fee: FeeRate) -> Self {
        let now = Utc::now();
        Self {
            id: PoolId::generate(),
            pair_id,
            reserve_low: Amount::ZERO,
            reserve_high: Amount::ZERO,
            total_shares: Shares::ZERO,
            fee,
            created_at: now,
            updated_at: now,
        }
    }

    /// True before the first deposit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_shares.is_zero()
    }

    /// Spot price of the low token denominated in the high token.
    ///
    /// # Errors
    /// [`AmmError::InsufficientLiquidity`] if the pool is empty.
    pub fn spot_price_low(&self) -> Result<Decimal, AmmError> {
        constant_product::spot_price(self.reserve_low, self.reserve_high)
    }

    /// Spot price of the high token denominated in the low token.
    ///
    /// # Errors
    /// [`AmmError::InsufficientLiquidity`] if the pool is empty.
    pub fn spot_price_high(&self) -> Result<Decimal, AmmError> {
        constant_product::spot_price(self.reserve_high, self.reserve_low)
    }

    /// The constant product `k`.
    #[must_use]
    pub fn k(&self) -> U256 {
        constant_product::k(self.reserve_low, self.reserve_high)
    }

    /// Checks the reserves/shares coupling invariant.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        let funded = !self.reserve_low.is_zero() && !self.reserve_high.is_zero();
        funded == !self.total_shares.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pool(reserve_low: u128, reserve_high: u128, shares: u128) -> PoolState {
        let mut p = PoolState::empty(PairId::generate(), FeeRate::default());
        p.reserve_low = Amount::new(reserve_low);
        p.reserve_high = Amount::new(reserve_high);
        p.total_shares = Shares::new(shares);
        p
    }

    #[test]
    fn empty_pool_state() {
        let p = PoolState::empty(PairId::generate(), FeeRate::default());
        assert!(p.is_empty());
        assert!(p.invariant_holds());
        assert!(p.spot_price_low().is_err());
    }

    #[test]
    fn spot_prices_are_reciprocal_ratios() {
        let p = pool(100, 400, 200);
        assert_eq!(p.spot_price_low().unwrap(), dec!(4));
        assert_eq!(p.spot_price_high().unwrap(), dec!(0.25));
    }

    #[test]
    fn invariant_detects_decoupled_state() {
        let mut p = pool(100, 400, 200);
        assert!(p.invariant_holds());
        p.total_shares = Shares::ZERO;
        assert!(!p.invariant_holds());
    }
}
