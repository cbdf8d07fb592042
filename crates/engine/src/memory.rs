//! In-memory store, the default backend for tests and the demo command.

use crate::store::{Cursor, DepositEffect, RangeQuery, Store, SwapEffect, WithdrawalEffect};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cpmm_domain::{
    AmmError, LiquidityPosition, PairId, PairKey, PoolId, PoolState, PricePoint, SwapRecord,
    TradingPair, UserId,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    pairs: HashMap<PairId, TradingPair>,
    pair_by_key: HashMap<PairKey, PairId>,
    pools: HashMap<PoolId, PoolState>,
    pool_by_pair: HashMap<PairId, PoolId>,
    positions: HashMap<(UserId, PoolId), LiquidityPosition>,
    swaps: HashMap<PairId, Vec<SwapRecord>>,
    prices: HashMap<PairId, Vec<PricePoint>>,
}

/// All five tables behind one `RwLock`, so each effect application is a
/// single write-guarded update and therefore atomic by construction.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn after_cursor(at: DateTime<Utc>, id: Uuid, cursor: &Cursor) -> bool {
    at > cursor.at || (at == cursor.at && id > cursor.id)
}

fn in_range(at: DateTime<Utc>, query: &RangeQuery) -> bool {
    if let Some(start) = query.start
        && at < start
    {
        return false;
    }
    if let Some(end) = query.end
        && at > end
    {
        return false;
    }
    true
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_pair(&self, pair: &TradingPair, pool: &PoolState) -> Result<(), AmmError> {
        let mut inner = self.inner.write().await;
        if inner.pair_by_key.contains_key(&pair.key) {
            return Err(AmmError::DuplicatePair);
        }
        inner.pair_by_key.insert(pair.key, pair.id);
        inner.pairs.insert(pair.id, pair.clone());
        inner.pool_by_pair.insert(pair.id, pool.id);
        inner.pools.insert(pool.id, pool.clone());
        inner.swaps.insert(pair.id, Vec::new());
        inner.prices.insert(pair.id, Vec::new());
        Ok(())
    }

    async fn pair_by_key(&self, key: PairKey) -> Result<Option<TradingPair>, AmmError> {
        let inner = self.inner.read().await;
        Ok(inner
            .pair_by_key
            .get(&key)
            .and_then(|id| inner.pairs.get(id))
            .cloned())
    }

    async fn pair_by_id(&self, id: PairId) -> Result<Option<TradingPair>, AmmError> {
        Ok(self.inner.read().await.pairs.get(&id).cloned())
    }

    async fn pool_by_pair(&self, pair_id: PairId) -> Result<Option<PoolState>, AmmError> {
        let inner = self.inner.read().await;
        Ok(inner
            .pool_by_pair
            .get(&pair_id)
            .and_then(|id| inner.pools.get(id))
            .cloned())
    }

    async fn pool_by_id(&self, pool_id: PoolId) -> Result<Option<PoolState>, AmmError> {
        Ok(self.inner.read().await.pools.get(&pool_id).cloned())
    }

    async fn list_pools(&self) -> Result<Vec<PoolState>, AmmError> {
        let inner = self.inner.read().await;
        let mut pools: Vec<_> = inner.pools.values().cloned().collect();
        pools.sort_by_key(|p| p.created_at);
        Ok(pools)
    }

    async fn position(
        &self,
        user_id: UserId,
        pool_id: PoolId,
    ) -> Result<Option<LiquidityPosition>, AmmError> {
        Ok(self
            .inner
            .read()
            .await
            .positions
            .get(&(user_id, pool_id))
            .cloned())
    }

    async fn apply_deposit(&self, effect: &DepositEffect) -> Result<(), AmmError> {
        let mut inner = self.inner.write().await;
        inner.pools.insert(effect.pool.id, effect.pool.clone());
        inner.positions.insert(
            (effect.position.user_id, effect.position.pool_id),
            effect.position.clone(),
        );
        Ok(())
    }

    async fn apply_withdrawal(&self, effect: &WithdrawalEffect) -> Result<(), AmmError> {
        let mut inner = self.inner.write().await;
        inner.pools.insert(effect.pool.id, effect.pool.clone());
        let key = (effect.position.user_id, effect.position.pool_id);
        if effect.close_position {
            inner.positions.remove(&key);
        } else {
            inner.positions.insert(key, effect.position.clone());
        }
        Ok(())
    }

    async fn apply_swap(&self, effect: &SwapEffect) -> Result<(), AmmError> {
        let mut inner = self.inner.write().await;
        inner.pools.insert(effect.pool.id, effect.pool.clone());
        inner
            .swaps
            .entry(effect.record.pair_id)
            .or_default()
            .push(effect.record.clone());
        inner
            .prices
            .entry(effect.price_point.pair_id)
            .or_default()
            .push(effect.price_point.clone());
        Ok(())
    }

    async fn price_points(
        &self,
        pair_id: PairId,
        query: &RangeQuery,
        default_limit: usize,
    ) -> Result<Vec<PricePoint>, AmmError> {
        let inner = self.inner.read().await;
        let limit = query.limit.unwrap_or(default_limit);
        let mut items: Vec<_> = inner
            .prices
            .get(&pair_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|p| in_range(p.recorded_at, query))
            .filter(|p| {
                query
                    .after
                    .is_none_or(|c| after_cursor(p.recorded_at, p.id, &c))
            })
            .cloned()
            .collect();
        items.sort_by_key(|p| (p.recorded_at, p.id));
        items.truncate(limit);
        Ok(items)
    }

    async fn swap_records(
        &self,
        pair_id: PairId,
        query: &RangeQuery,
        default_limit: usize,
    ) -> Result<Vec<SwapRecord>, AmmError> {
        let inner = self.inner.read().await;
        let limit = query.limit.unwrap_or(default_limit);
        let mut items: Vec<_> = inner
            .swaps
            .get(&pair_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|s| in_range(s.executed_at, query))
            .filter(|s| {
                query
                    .after
                    .is_none_or(|c| after_cursor(s.executed_at, s.id, &c))
            })
            .cloned()
            .collect();
        items.sort_by_key(|s| (s.executed_at, s.id));
        items.truncate(limit);
        Ok(items)
    }

    async fn swap_records_since(
        &self,
        pair_id: PairId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SwapRecord>, AmmError> {
        let inner = self.inner.read().await;
        Ok(inner
            .swaps
            .get(&pair_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|s| s.executed_at >= since)
            .cloned()
            .collect())
    }
}
