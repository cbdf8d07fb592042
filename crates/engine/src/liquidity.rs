//! Liquidity provisioning and redemption.
//!
//! Both operations run inside the pool's writer lock and re-read the pool
//! after acquiring it, so the ratio math always sees live reserves. The
//! whole effect (pool row + position row) commits through one atomic store
//! call.

use crate::engine::AmmEngine;
use crate::store::{DepositEffect, WithdrawalEffect};
use chrono::Utc;
use cpmm_domain::math::liquidity::{
    initial_mint, proportional_mint, redemption_amounts, required_paired_amount,
};
use cpmm_domain::{
    Amount, AmmError, LiquidityPosition, PairId, PoolState, Shares, UserId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Result of a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositOutcome {
    /// Shares credited to the depositor.
    pub minted: Shares,
    /// Low-token amount taken.
    pub amount_low: Amount,
    /// High-token amount taken.
    pub amount_high: Amount,
    /// Pool state after the deposit.
    pub pool: PoolState,
    /// The depositor's position after the deposit.
    pub position: LiquidityPosition,
}

/// Result of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalOutcome {
    /// Shares burned.
    pub burned: Shares,
    /// Low-token amount returned.
    pub amount_low: Amount,
    /// High-token amount returned.
    pub amount_high: Amount,
    /// Shares the caller still owns.
    pub remaining_shares: Shares,
    /// Pool state after the withdrawal.
    pub pool: PoolState,
}

impl AmmEngine {
    /// Deposits liquidity into the pool serving `pair_id`.
    ///
    /// On the first deposit the supplied amounts set the pool's price ratio
    /// and `max_amount_high` is taken in full. On an active pool the high
    /// amount is derived from the current reserve ratio; if it exceeds
    /// `max_amount_high` the deposit fails with a retryable slippage error.
    ///
    /// # Errors
    /// - [`AmmError::Validation`] for non-positive amounts or a first
    ///   deposit too small to cover the liquidity lock.
    /// - [`AmmError::SlippageExceeded`] if the required high amount is over
    ///   the caller's maximum.
    /// - [`AmmError::NotFound`] for an unknown pair.
    /// - [`AmmError::ConcurrencyConflict`] if the pool lock is contended.
    pub async fn add_liquidity(
        &self,
        user_id: UserId,
        pair_id: PairId,
        amount_low: Amount,
        max_amount_high: Amount,
    ) -> Result<DepositOutcome, AmmError> {
        if amount_low.is_zero() || max_amount_high.is_zero() {
            return Err(AmmError::Validation("deposit amounts must be positive"));
        }

        let stale = self.pool_for_pair(pair_id).await?;
        let _guard = self.locks.acquire(stale.id).await?;
        let mut pool = self.pool_for_pair(pair_id).await?;

        let (minted, amount_high) = if pool.is_empty() {
            let mint = initial_mint(amount_low, max_amount_high)?;
            pool.total_shares = mint.total;
            (mint.minted, max_amount_high)
        } else {
            let needed = required_paired_amount(amount_low, pool.reserve_low, pool.reserve_high)?;
            if needed > max_amount_high {
                return Err(AmmError::SlippageExceeded {
                    bound: max_amount_high.raw(),
                    actual: needed.raw(),
                });
            }
            let minted = proportional_mint(amount_low, pool.reserve_low, pool.total_shares)?;
            pool.total_shares = pool
                .total_shares
                .checked_add(minted)
                .ok_or(AmmError::Overflow("total shares"))?;
            (minted, needed)
        };

        pool.reserve_low = pool
            .reserve_low
            .checked_add(amount_low)
            .ok_or(AmmError::Overflow("low reserve"))?;
        pool.reserve_high = pool
            .reserve_high
            .checked_add(amount_high)
            .ok_or(AmmError::Overflow("high reserve"))?;
        pool.updated_at = Utc::now();

        let position = match self.store.position(user_id, pool.id).await? {
            Some(mut existing) => {
                existing.shares = existing
                    .shares
                    .checked_add(minted)
                    .ok_or(AmmError::Overflow("position shares"))?;
                existing.deposited_low = existing
                    .deposited_low
                    .checked_add(amount_low)
                    .ok_or(AmmError::Overflow("deposited low"))?;
                existing.deposited_high = existing
                    .deposited_high
                    .checked_add(amount_high)
                    .ok_or(AmmError::Overflow("deposited high"))?;
                existing.updated_at = Utc::now();
                existing
            }
            None => LiquidityPosition::open(user_id, pool.id, minted, amount_low, amount_high),
        };

        let effect = DepositEffect {
            pool: pool.clone(),
            position: position.clone(),
        };
        self.store.apply_deposit(&effect).await?;

        info!(pair = %pair_id, user = %user_id, minted = %minted,
            amount_low = %amount_low, amount_high = %amount_high,
            "liquidity added");

        Ok(DepositOutcome {
            minted,
            amount_low,
            amount_high,
            pool,
            position,
        })
    }

    /// Redeems `shares` from the caller's position in the pool serving
    /// `pair_id`.
    ///
    /// The locked minimum-liquidity floor is never owned by anyone, so a
    /// withdrawal can never drain the pool completely and the pool never
    /// returns to the empty state.
    ///
    /// # Errors
    /// - [`AmmError::Validation`] for zero shares.
    /// - [`AmmError::InsufficientShares`] if `shares` exceeds the position.
    /// - [`AmmError::NotFound`] for an unknown pair.
    /// - [`AmmError::ConcurrencyConflict`] if the pool lock is contended.
    pub async fn remove_liquidity(
        &self,
        user_id: UserId,
        pair_id: PairId,
        shares: Shares,
    ) -> Result<WithdrawalOutcome, AmmError> {
        if shares.is_zero() {
            return Err(AmmError::Validation("withdrawal shares must be positive"));
        }

        let stale = self.pool_for_pair(pair_id).await?;
        let _guard = self.locks.acquire(stale.id).await?;
        let mut pool = self.pool_for_pair(pair_id).await?;

        let mut position = self
            .store
            .position(user_id, pool.id)
            .await?
            .ok_or(AmmError::InsufficientShares {
                requested: shares.raw(),
                owned: 0,
            })?;
        if shares > position.shares {
            return Err(AmmError::InsufficientShares {
                requested: shares.raw(),
                owned: position.shares.raw(),
            });
        }

        let (amount_low, amount_high) =
            redemption_amounts(shares, pool.reserve_low, pool.reserve_high, pool.total_shares)?;

        pool.reserve_low = pool
            .reserve_low
            .checked_sub(amount_low)
            .ok_or(AmmError::Overflow("low reserve underflow"))?;
        pool.reserve_high = pool
            .reserve_high
            .checked_sub(amount_high)
            .ok_or(AmmError::Overflow("high reserve underflow"))?;
        pool.total_shares = pool
            .total_shares
            .checked_sub(shares)
            .ok_or(AmmError::Overflow("total shares underflow"))?;
        pool.updated_at = Utc::now();

        position.shares = position
            .shares
            .checked_sub(shares)
            .ok_or(AmmError::Overflow("position shares underflow"))?;
        position.updated_at = Utc::now();
        let close_position = position.shares.is_zero();

        let effect = WithdrawalEffect {
            pool: pool.clone(),
            position: position.clone(),
            close_position,
        };
        self.store.apply_withdrawal(&effect).await?;

        info!(pair = %pair_id, user = %user_id, burned = %shares,
            amount_low = %amount_low, amount_high = %amount_high,
            closed = close_position, "liquidity removed");

        Ok(WithdrawalOutcome {
            burned: shares,
            amount_low,
            amount_high,
            remaining_shares: position.shares,
            pool,
        })
    }
}
