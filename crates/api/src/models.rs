//! Request and response bodies.
//!
//! Token amounts and shares travel as decimal strings so clients never
//! lose precision to floating-point JSON numbers.

use chrono::{DateTime, Utc};
use cpmm_domain::{
    Amount, LiquidityPosition, PoolState, PositionValuation, PricePoint, Shares, SwapQuote,
    SwapReceipt, SwapRecord, TradingPair,
};
use cpmm_engine::{Cursor, DepositOutcome, Page, PoolOverview, WithdrawalOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Parses a decimal-string token amount.
///
/// # Errors
/// [`ApiError::BadRequest`] if the string is not a non-negative integer in
/// range.
pub fn parse_amount(field: &str, value: &str) -> Result<Amount, ApiError> {
    value
        .parse::<u128>()
        .map(Amount::new)
        .map_err(|_| ApiError::BadRequest(format!("{field} must be a non-negative integer")))
}

/// Parses a decimal-string share count.
///
/// # Errors
/// [`ApiError::BadRequest`] if the string is not a non-negative integer in
/// range.
pub fn parse_shares(field: &str, value: &str) -> Result<Shares, ApiError> {
    value
        .parse::<u128>()
        .map(Shares::new)
        .map_err(|_| ApiError::BadRequest(format!("{field} must be a non-negative integer")))
}

/// Request to register a trading pair.
#[derive(Debug, Deserialize)]
pub struct CreatePairRequest {
    /// One token of the pair, in either order.
    pub token_a: i64,
    /// The other token of the pair.
    pub token_b: i64,
    /// Optional fee override in basis points.
    pub fee_bps: Option<u32>,
}

/// A registered trading pair.
#[derive(Debug, Serialize)]
pub struct PairResponse {
    /// Pair identifier.
    pub id: Uuid,
    /// Lower token of the canonical ordering.
    pub token_low: i64,
    /// Higher token of the canonical ordering.
    pub token_high: i64,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<TradingPair> for PairResponse {
    fn from(pair: TradingPair) -> Self {
        Self {
            id: pair.id.0,
            token_low: pair.key.token_low().0,
            token_high: pair.key.token_high().0,
            created_at: pair.created_at,
        }
    }
}

/// A pool's state plus derived figures.
#[derive(Debug, Serialize)]
pub struct PoolResponse {
    /// Pool identifier.
    pub id: Uuid,
    /// The pair this pool serves.
    pub pair_id: Uuid,
    /// Low-token reserve.
    pub reserve_low: String,
    /// High-token reserve.
    pub reserve_high: String,
    /// Total shares outstanding.
    pub total_shares: String,
    /// Fee in basis points.
    pub fee_bps: u32,
    /// Low-token spot price in high-token terms; absent while empty.
    pub spot_price_low: Option<Decimal>,
    /// High-token spot price in low-token terms; absent while empty.
    pub spot_price_high: Option<Decimal>,
    /// Rolling 24h volume in low-token units.
    pub volume_24h: String,
    /// Last state change.
    pub updated_at: DateTime<Utc>,
}

impl From<PoolOverview> for PoolResponse {
    fn from(overview: PoolOverview) -> Self {
        let pool = overview.pool;
        Self {
            id: pool.id.0,
            pair_id: pool.pair_id.0,
            reserve_low: pool.reserve_low.raw().to_string(),
            reserve_high: pool.reserve_high.raw().to_string(),
            total_shares: pool.total_shares.raw().to_string(),
            fee_bps: pool.fee.bps(),
            spot_price_low: overview.spot_price_low,
            spot_price_high: overview.spot_price_high,
            volume_24h: overview.volume_24h.raw().to_string(),
            updated_at: pool.updated_at,
        }
    }
}

/// Pool state without derived figures, embedded in mutation responses.
#[derive(Debug, Serialize)]
pub struct PoolStateBody {
    /// Pool identifier.
    pub id: Uuid,
    /// Low-token reserve.
    pub reserve_low: String,
    /// High-token reserve.
    pub reserve_high: String,
    /// Total shares outstanding.
    pub total_shares: String,
}

impl From<&PoolState> for PoolStateBody {
    fn from(pool: &PoolState) -> Self {
        Self {
            id: pool.id.0,
            reserve_low: pool.reserve_low.raw().to_string(),
            reserve_high: pool.reserve_high.raw().to_string(),
            total_shares: pool.total_shares.raw().to_string(),
        }
    }
}

/// Request to deposit liquidity.
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Depositing user.
    pub user_id: i64,
    /// Exact low-token amount to deposit.
    pub amount_low: String,
    /// Cap on the high-token amount taken alongside.
    pub max_amount_high: String,
}

/// Outcome of a deposit.
#[derive(Debug, Serialize)]
pub struct DepositResponse {
    /// Shares credited.
    pub minted: String,
    /// Low-token amount taken.
    pub amount_low: String,
    /// High-token amount taken.
    pub amount_high: String,
    /// Pool state after the deposit.
    pub pool: PoolStateBody,
}

impl From<DepositOutcome> for DepositResponse {
    fn from(outcome: DepositOutcome) -> Self {
        Self {
            minted: outcome.minted.raw().to_string(),
            amount_low: outcome.amount_low.raw().to_string(),
            amount_high: outcome.amount_high.raw().to_string(),
            pool: PoolStateBody::from(&outcome.pool),
        }
    }
}

/// Request to withdraw liquidity.
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    /// Withdrawing user.
    pub user_id: i64,
    /// Shares to burn.
    pub shares: String,
}

/// Outcome of a withdrawal.
#[derive(Debug, Serialize)]
pub struct WithdrawResponse {
    /// Shares burned.
    pub burned: String,
    /// Low-token amount returned.
    pub amount_low: String,
    /// High-token amount returned.
    pub amount_high: String,
    /// Shares the user still owns.
    pub remaining_shares: String,
    /// Pool state after the withdrawal.
    pub pool: PoolStateBody,
}

impl From<WithdrawalOutcome> for WithdrawResponse {
    fn from(outcome: WithdrawalOutcome) -> Self {
        Self {
            burned: outcome.burned.raw().to_string(),
            amount_low: outcome.amount_low.raw().to_string(),
            amount_high: outcome.amount_high.raw().to_string(),
            remaining_shares: outcome.remaining_shares.raw().to_string(),
            pool: PoolStateBody::from(&outcome.pool),
        }
    }
}

/// Request to price a swap without executing it.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// Input token.
    pub token_in: i64,
    /// Input amount.
    pub amount_in: String,
}

/// A non-binding swap quote.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    /// Input token.
    pub token_in: i64,
    /// Output token.
    pub token_out: i64,
    /// Input amount.
    pub amount_in: String,
    /// Output the pool would deliver right now.
    pub amount_out: String,
    /// Fee retained, in input-token units.
    pub fee: String,
    /// Normalized deviation from the pre-trade spot price.
    pub price_impact: Decimal,
    /// Spot price of the input token before the trade.
    pub spot_price_before: Decimal,
}

impl From<SwapQuote> for QuoteResponse {
    fn from(quote: SwapQuote) -> Self {
        Self {
            token_in: quote.token_in.0,
            token_out: quote.token_out.0,
            amount_in: quote.amount_in.raw().to_string(),
            amount_out: quote.amount_out.raw().to_string(),
            fee: quote.fee.raw().to_string(),
            price_impact: quote.price_impact,
            spot_price_before: quote.spot_price_before,
        }
    }
}

/// Request to execute a swap.
#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    /// Trading user.
    pub user_id: i64,
    /// Input token.
    pub token_in: i64,
    /// Input amount.
    pub amount_in: String,
    /// Minimum acceptable output; the swap fails rather than fill below it.
    pub min_amount_out: String,
}

/// Receipt for an executed swap.
#[derive(Debug, Serialize)]
pub struct SwapResponse {
    /// The logged swap.
    pub record: SwapRecordBody,
    /// Low-token reserve after the swap.
    pub reserve_low_after: String,
    /// High-token reserve after the swap.
    pub reserve_high_after: String,
}

impl From<SwapReceipt> for SwapResponse {
    fn from(receipt: SwapReceipt) -> Self {
        Self {
            record: receipt.record.into(),
            reserve_low_after: receipt.reserve_low_after.raw().to_string(),
            reserve_high_after: receipt.reserve_high_after.raw().to_string(),
        }
    }
}

/// One entry of the swap log.
#[derive(Debug, Serialize)]
pub struct SwapRecordBody {
    /// Record identifier.
    pub id: Uuid,
    /// Trading user.
    pub user_id: i64,
    /// Input token.
    pub token_in: i64,
    /// Output token.
    pub token_out: i64,
    /// Input amount.
    pub amount_in: String,
    /// Output amount.
    pub amount_out: String,
    /// Fee retained, in input-token units.
    pub fee: String,
    /// Price impact at execution time.
    pub price_impact: Decimal,
    /// Execution timestamp.
    pub executed_at: DateTime<Utc>,
}

impl From<SwapRecord> for SwapRecordBody {
    fn from(record: SwapRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id.0,
            token_in: record.token_in.0,
            token_out: record.token_out.0,
            amount_in: record.amount_in.raw().to_string(),
            amount_out: record.amount_out.raw().to_string(),
            fee: record.fee.raw().to_string(),
            price_impact: record.price_impact,
            executed_at: record.executed_at,
        }
    }
}

/// One spot-price sample.
#[derive(Debug, Serialize)]
pub struct PricePointBody {
    /// Sample identifier.
    pub id: Uuid,
    /// Spot price of the low token in high-token terms.
    pub price_low: Decimal,
    /// Spot price of the high token in low-token terms.
    pub price_high: Decimal,
    /// Sample timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl From<PricePoint> for PricePointBody {
    fn from(point: PricePoint) -> Self {
        Self {
            id: point.id,
            price_low: point.price_low,
            price_high: point.price_high,
            recorded_at: point.recorded_at,
        }
    }
}

/// Query parameters for history endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    /// Inclusive lower time bound.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper time bound.
    pub end: Option<DateTime<Utc>>,
    /// Cursor timestamp from a previous page.
    pub after_at: Option<DateTime<Utc>>,
    /// Cursor id from a previous page.
    pub after_id: Option<Uuid>,
    /// Page size cap.
    pub limit: Option<usize>,
}

impl HistoryParams {
    /// Converts the parameters into an engine range query.
    ///
    /// # Errors
    /// [`ApiError::BadRequest`] if only half of the cursor is present.
    pub fn into_query(self) -> Result<cpmm_engine::RangeQuery, ApiError> {
        let after = match (self.after_at, self.after_id) {
            (Some(at), Some(id)) => Some(Cursor { at, id }),
            (None, None) => None,
            _ => {
                return Err(ApiError::BadRequest(
                    "after_at and after_id must be supplied together".into(),
                ));
            }
        };
        Ok(cpmm_engine::RangeQuery {
            start: self.start,
            end: self.end,
            after,
            limit: self.limit,
        })
    }
}

/// One page of an append-only log.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    /// Items in `(timestamp, id)` order.
    pub items: Vec<T>,
    /// Cursor timestamp to resume from, when more pages may exist.
    pub next_at: Option<DateTime<Utc>>,
    /// Cursor id to resume from.
    pub next_id: Option<Uuid>,
}

impl<T, U: From<T>> From<Page<T>> for PageResponse<U> {
    fn from(page: Page<T>) -> Self {
        Self {
            next_at: page.next.map(|c| c.at),
            next_id: page.next.map(|c| c.id),
            items: page.items.into_iter().map(U::from).collect(),
        }
    }
}

/// A user's position in a pool, valued at current reserves.
#[derive(Debug, Serialize)]
pub struct PositionResponse {
    /// Position identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: i64,
    /// Pool identifier.
    pub pool_id: Uuid,
    /// Shares owned.
    pub shares: String,
    /// Cumulative low-token amount deposited.
    pub deposited_low: String,
    /// Cumulative high-token amount deposited.
    pub deposited_high: String,
    /// Current low-token value of the shares.
    pub value_low: String,
    /// Current high-token value of the shares.
    pub value_high: String,
    /// Fraction of the pool owned.
    pub share_of_pool: Decimal,
}

impl PositionResponse {
    /// Builds the response from a position and its live valuation.
    #[must_use]
    pub fn new(position: LiquidityPosition, valuation: PositionValuation) -> Self {
        Self {
            id: position.id,
            user_id: position.user_id.0,
            pool_id: position.pool_id.0,
            shares: position.shares.raw().to_string(),
            deposited_low: position.deposited_low.raw().to_string(),
            deposited_high: position.deposited_high.raw().to_string(),
            value_low: valuation.value_low.raw().to_string(),
            value_high: valuation.value_high.raw().to_string(),
            share_of_pool: valuation.share_of_pool,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is up.
    pub status: &'static str,
}
