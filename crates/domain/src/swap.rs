use crate::pair::PairId;
use crate::token::{Amount, TokenId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A read-only swap quote. Advisory only: reserves may move between quote
/// and execution, so `execute` always re-derives from live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    /// The pair quoted against.
    pub pair_id: PairId,
    /// Input token.
    pub token_in: TokenId,
    /// Output token.
    pub token_out: TokenId,
    /// Nominal input amount.
    pub amount_in: Amount,
    /// Output the pool would deliver right now.
    pub amount_out: Amount,
    /// Fee retained by the pool, in input-token units.
    pub fee: Amount,
    /// Normalized deviation from the pre-trade spot price.
    pub price_impact: Decimal,
    /// Spot price of the input token before the trade.
    pub spot_price_before: Decimal,
}

/// Receipt returned by an executed swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    /// The persisted swap record.
    pub record: SwapRecord,
    /// Low-token reserve after the trade.
    pub reserve_low_after: Amount,
    /// High-token reserve after the trade.
    pub reserve_high_after: Amount,
}

/// Append-only record of an executed swap. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// Trading user.
    pub user_id: UserId,
    /// The pair traded.
    pub pair_id: PairId,
    /// Input token.
    pub token_in: TokenId,
    /// Output token.
    pub token_out: TokenId,
    /// Nominal input amount (fee included).
    pub amount_in: Amount,
    /// Output amount delivered.
    pub amount_out: Amount,
    /// Fee retained by the pool, in input-token units.
    pub fee: Amount,
    /// Price impact at execution time.
    pub price_impact: Decimal,
    /// Execution timestamp.
    pub executed_at: DateTime<Utc>,
}

/// Append-only spot-price sample for a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unique identifier.
    pub id: Uuid,
    /// The pair sampled.
    pub pair_id: PairId,
    /// Spot price of the low token in high-token terms.
    pub price_low: Decimal,
    /// Spot price of the high token in low-token terms.
    pub price_high: Decimal,
    /// Sample timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl PricePoint {
    /// Samples the given prices now.
    #[must_use]
    pub fn sample(pair_id: PairId, price_low: Decimal, price_high: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            pair_id,
            price_low,
            price_high,
            recorded_at: Utc::now(),
        }
    }
}
