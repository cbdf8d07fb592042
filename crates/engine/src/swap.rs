//! Quoting and execution.
//!
//! `quote` is read-only and lock-free: it prices a snapshot and is advisory
//! by construction. `execute` acquires the pool's writer lock, re-derives
//! the quote from live reserves, and commits the reserve mutation together
//! with the swap record and price sample as one atomic effect. Once the
//! effect commits there is no rollback path.

use crate::engine::AmmEngine;
use crate::store::SwapEffect;
use chrono::Utc;
use cpmm_domain::math::constant_product::{price_impact, spot_price, swap_output};
use cpmm_domain::math::{Rounding, mul_div};
use cpmm_domain::fee::BPS_DENOMINATOR;
use cpmm_domain::{
    Amount, AmmError, PairKey, PoolState, PricePoint, SwapQuote, SwapReceipt, SwapRecord,
    TokenId, UserId,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Priced trade, oriented to the pool's low/high layout.
struct PricedSwap {
    amount_out: Amount,
    fee: Amount,
    impact: rust_decimal::Decimal,
    spot_before: rust_decimal::Decimal,
    in_is_low: bool,
}

fn price_trade(
    pool: &PoolState,
    key: PairKey,
    token_in: TokenId,
    amount_in: Amount,
) -> Result<PricedSwap, AmmError> {
    if !key.contains(token_in) {
        return Err(AmmError::Validation("token is not part of the pair"));
    }
    if pool.is_empty() {
        return Err(AmmError::InsufficientLiquidity);
    }

    let in_is_low = token_in == key.token_low();
    let (reserve_in, reserve_out) = if in_is_low {
        (pool.reserve_low, pool.reserve_high)
    } else {
        (pool.reserve_high, pool.reserve_low)
    };

    let amount_out = swap_output(amount_in, reserve_in, reserve_out, pool.fee)?;
    // Fee in input-token units, rounded up to favour the pool.
    let fee = mul_div(
        amount_in.raw(),
        u128::from(pool.fee.bps()),
        u128::from(BPS_DENOMINATOR),
        Rounding::Up,
    )
    .map(Amount::new)
    .ok_or(AmmError::Overflow("fee amount"))?;
    let spot_before = spot_price(reserve_in, reserve_out)?;
    let impact = if amount_out.is_zero() {
        rust_decimal::Decimal::ONE
    } else {
        price_impact(amount_in, amount_out, reserve_in, reserve_out)?
    };

    Ok(PricedSwap {
        amount_out,
        fee,
        impact,
        spot_before,
        in_is_low,
    })
}

impl AmmEngine {
    /// Prices a swap against the current snapshot without touching state.
    ///
    /// The result is advisory: reserves can move before execution, which is
    /// why [`AmmEngine::execute_swap`] never trusts a prior quote.
    ///
    /// # Errors
    /// - [`AmmError::Validation`] for a zero input or a token outside the
    ///   pair.
    /// - [`AmmError::InsufficientLiquidity`] for an empty pool.
    /// - [`AmmError::NotFound`] for an unknown pair.
    pub async fn quote(
        &self,
        pair_id: cpmm_domain::PairId,
        token_in: TokenId,
        amount_in: Amount,
    ) -> Result<SwapQuote, AmmError> {
        if amount_in.is_zero() {
            return Err(AmmError::Validation("swap input must be positive"));
        }
        let pair = self.pair(pair_id).await?;
        let pool = self.pool_for_pair(pair_id).await?;
        let priced = price_trade(&pool, pair.key, token_in, amount_in)?;

        debug!(pair = %pair_id, token_in = %token_in, amount_in = %amount_in,
            amount_out = %priced.amount_out, "quoted");

        Ok(SwapQuote {
            pair_id,
            token_in,
            token_out: pair.key.other(token_in).unwrap_or(token_in),
            amount_in,
            amount_out: priced.amount_out,
            fee: priced.fee,
            price_impact: priced.impact,
            spot_price_before: priced.spot_before,
        })
    }

    /// Executes a swap, re-deriving the price from live reserves inside the
    /// pool's critical section.
    ///
    /// The full nominal input is added to the input reserve; the fee stays
    /// in the pool, which is what makes the constant product grow and fund
    /// liquidity providers.
    ///
    /// # Errors
    /// - [`AmmError::Validation`] for a zero input or foreign token.
    /// - [`AmmError::InsufficientLiquidity`] for an empty pool or an input
    ///   too small to buy any output.
    /// - [`AmmError::SlippageExceeded`] if the recomputed output is below
    ///   `min_amount_out`.
    /// - [`AmmError::ConcurrencyConflict`] if the pool lock is contended.
    pub async fn execute_swap(
        &self,
        user_id: UserId,
        pair_id: cpmm_domain::PairId,
        token_in: TokenId,
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> Result<SwapReceipt, AmmError> {
        if amount_in.is_zero() {
            return Err(AmmError::Validation("swap input must be positive"));
        }
        let pair = self.pair(pair_id).await?;

        let stale = self.pool_for_pair(pair_id).await?;
        let _guard = self.locks.acquire(stale.id).await?;
        let mut pool = self.pool_for_pair(pair_id).await?;

        let priced = price_trade(&pool, pair.key, token_in, amount_in)?;
        if priced.amount_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        if priced.amount_out < min_amount_out {
            return Err(AmmError::SlippageExceeded {
                bound: min_amount_out.raw(),
                actual: priced.amount_out.raw(),
            });
        }

        let k_before = pool.k();
        if priced.in_is_low {
            pool.reserve_low = pool
                .reserve_low
                .checked_add(amount_in)
                .ok_or(AmmError::Overflow("low reserve"))?;
            pool.reserve_high = pool
                .reserve_high
                .checked_sub(priced.amount_out)
                .ok_or(AmmError::Overflow("high reserve underflow"))?;
        } else {
            pool.reserve_high = pool
                .reserve_high
                .checked_add(amount_in)
                .ok_or(AmmError::Overflow("high reserve"))?;
            pool.reserve_low = pool
                .reserve_low
                .checked_sub(priced.amount_out)
                .ok_or(AmmError::Overflow("low reserve underflow"))?;
        }
        pool.updated_at = Utc::now();
        // Floor rounding on the output guarantees this; checked here so a
        // regression can never reach the store.
        debug_assert!(pool.k() >= k_before, "constant product decreased");

        let record = SwapRecord {
            id: Uuid::new_v4(),
            user_id,
            pair_id,
            token_in,
            token_out: pair.key.other(token_in).unwrap_or(token_in),
            amount_in,
            amount_out: priced.amount_out,
            fee: priced.fee,
            price_impact: priced.impact,
            executed_at: pool.updated_at,
        };
        let price_point = PricePoint::sample(
            pair_id,
            pool.spot_price_low()?,
            pool.spot_price_high()?,
        );

        let effect = SwapEffect {
            pool: pool.clone(),
            record: record.clone(),
            price_point,
        };
        self.store.apply_swap(&effect).await?;

        info!(pair = %pair_id, user = %user_id, token_in = %token_in,
            amount_in = %amount_in, amount_out = %record.amount_out,
            fee = %record.fee, "swap executed");

        Ok(SwapReceipt {
            record,
            reserve_low_after: pool.reserve_low,
            reserve_high_after: pool.reserve_high,
        })
    }
}
