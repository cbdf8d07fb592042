//! Position ledger: live valuations derived from current reserves.

use crate::engine::AmmEngine;
use cpmm_domain::{AmmError, LiquidityPosition, PoolId, PositionValuation, UserId};
use serde::{Deserialize, Serialize};

/// A position together with its live valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionView {
    /// The stored position. Deposit amounts are informational only.
    pub position: LiquidityPosition,
    /// Live value: `shares * reserve / total_shares` per side, recomputed
    /// from current reserves on every call.
    pub valuation: PositionValuation,
}

impl AmmEngine {
    /// Returns a user's position in a pool with its live valuation.
    ///
    /// # Errors
    /// [`AmmError::NotFound`] if the pool or the position does not exist.
    pub async fn position(
        &self,
        user_id: UserId,
        pool_id: PoolId,
    ) -> Result<PositionView, AmmError> {
        let pool = self
            .store
            .pool_by_id(pool_id)
            .await?
            .ok_or(AmmError::NotFound("pool"))?;
        let position = self
            .store
            .position(user_id, pool_id)
            .await?
            .ok_or(AmmError::NotFound("position"))?;
        let valuation = PositionValuation::of(position.shares, &pool)?;
        Ok(PositionView {
            position,
            valuation,
        })
    }
}
