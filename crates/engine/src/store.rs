//! Storage boundary for the engine.
//!
//! Mutating methods take whole-effect structs so that one call commits one
//! atomic unit: the in-memory store applies an effect under a single write
//! guard, the Postgres store wraps it in one transaction. Partial
//! application is never observable either way.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cpmm_domain::{
    AmmError, LiquidityPosition, PairId, PairKey, PoolId, PoolState, PricePoint, SwapRecord,
    TradingPair, UserId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Atomic effect of a liquidity deposit: the updated pool row plus the
/// created-or-incremented position.
#[derive(Debug, Clone)]
pub struct DepositEffect {
    /// Pool state after the deposit.
    pub pool: PoolState,
    /// Position after the deposit (upserted).
    pub position: LiquidityPosition,
}

/// Atomic effect of a liquidity withdrawal.
#[derive(Debug, Clone)]
pub struct WithdrawalEffect {
    /// Pool state after the withdrawal.
    pub pool: PoolState,
    /// Position after the withdrawal.
    pub position: LiquidityPosition,
    /// Whether the position reached zero shares and must be removed.
    pub close_position: bool,
}

/// Atomic effect of an executed swap: reserve mutation plus both
/// append-only records.
#[derive(Debug, Clone)]
pub struct SwapEffect {
    /// Pool state after the swap.
    pub pool: PoolState,
    /// The swap log entry.
    pub record: SwapRecord,
    /// The spot-price sample taken after the reserve update.
    pub price_point: PricePoint,
}

/// Keyset-pagination cursor: the last-seen `(timestamp, id)` position.
/// A consumer can restart any range scan from its last cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Timestamp of the last item seen.
    pub at: DateTime<Utc>,
    /// Id of the last item seen, breaking timestamp ties.
    pub id: Uuid,
}

/// A bounded, restartable range query over an append-only log.
#[derive(Debug, Clone, Default)]
pub struct RangeQuery {
    /// Inclusive lower time bound.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper time bound.
    pub end: Option<DateTime<Utc>>,
    /// Resume strictly after this cursor.
    pub after: Option<Cursor>,
    /// Maximum items returned; `None` uses the engine default.
    pub limit: Option<usize>,
}

/// Persistence boundary for the five logical tables.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a new pair together with its empty pool.
    ///
    /// # Errors
    /// [`AmmError::DuplicatePair`] if the unordered token set exists.
    async fn insert_pair(&self, pair: &TradingPair, pool: &PoolState) -> Result<(), AmmError>;

    /// Looks up a pair by its canonical key.
    async fn pair_by_key(&self, key: PairKey) -> Result<Option<TradingPair>, AmmError>;

    /// Looks up a pair by id.
    async fn pair_by_id(&self, id: PairId) -> Result<Option<TradingPair>, AmmError>;

    /// Returns the pool serving a pair.
    async fn pool_by_pair(&self, pair_id: PairId) -> Result<Option<PoolState>, AmmError>;

    /// Returns a pool by id.
    async fn pool_by_id(&self, pool_id: PoolId) -> Result<Option<PoolState>, AmmError>;

    /// Lists all pools.
    async fn list_pools(&self) -> Result<Vec<PoolState>, AmmError>;

    /// Returns a user's position in a pool, if any.
    async fn position(
        &self,
        user_id: UserId,
        pool_id: PoolId,
    ) -> Result<Option<LiquidityPosition>, AmmError>;

    /// Commits a deposit effect atomically.
    async fn apply_deposit(&self, effect: &DepositEffect) -> Result<(), AmmError>;

    /// Commits a withdrawal effect atomically.
    async fn apply_withdrawal(&self, effect: &WithdrawalEffect) -> Result<(), AmmError>;

    /// Commits a swap effect atomically.
    async fn apply_swap(&self, effect: &SwapEffect) -> Result<(), AmmError>;

    /// Price samples for a pair, ascending by `(recorded_at, id)`.
    async fn price_points(
        &self,
        pair_id: PairId,
        query: &RangeQuery,
        default_limit: usize,
    ) -> Result<Vec<PricePoint>, AmmError>;

    /// Swap records for a pair, ascending by `(executed_at, id)`.
    async fn swap_records(
        &self,
        pair_id: PairId,
        query: &RangeQuery,
        default_limit: usize,
    ) -> Result<Vec<SwapRecord>, AmmError>;

    /// All swap records for a pair at or after `since`, for the rolling
    /// volume aggregate.
    async fn swap_records_since(
        &self,
        pair_id: PairId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SwapRecord>, AmmError>;
}
