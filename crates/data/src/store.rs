//! PostgreSQL-backed implementation of the engine storage boundary.
//!
//! Each `apply_*` effect commits inside a single transaction, so a crash
//! can never leave a pool update without its log rows or vice versa.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cpmm_domain::{
    AmmError, LiquidityPosition, PairId, PairKey, PoolId, PoolState, PricePoint, SwapRecord,
    TradingPair, UserId,
};
use cpmm_engine::{DepositEffect, RangeQuery, Store, SwapEffect, WithdrawalEffect};

use crate::repositories::{
    Database, PairRepository, PoolRepository, PositionRepository, PriceRepository, SwapRepository,
};

/// Maps a driver error onto the engine's retryable storage error.
fn storage(e: sqlx::Error) -> AmmError {
    AmmError::Storage(e.to_string())
}

/// Whether the error is a unique-constraint violation.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

/// Store backed by the repositories in this crate.
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    /// Creates a store over an existing database handle.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_pair(&self, pair: &TradingPair, pool: &PoolState) -> Result<(), AmmError> {
        let mut tx = self.db.pool().begin().await.map_err(storage)?;
        PairRepository::insert(&mut tx, pair).await.map_err(|e| {
            if is_unique_violation(&e) {
                AmmError::DuplicatePair
            } else {
                storage(e)
            }
        })?;
        PoolRepository::insert(&mut tx, pool).await.map_err(storage)?;
        tx.commit().await.map_err(storage)
    }

    async fn pair_by_key(&self, key: PairKey) -> Result<Option<TradingPair>, AmmError> {
        self.db.pairs().find_by_key(key).await.map_err(storage)
    }

    async fn pair_by_id(&self, id: PairId) -> Result<Option<TradingPair>, AmmError> {
        self.db.pairs().find_by_id(id).await.map_err(storage)
    }

    async fn pool_by_pair(&self, pair_id: PairId) -> Result<Option<PoolState>, AmmError> {
        self.db.pools().find_by_pair(pair_id).await.map_err(storage)
    }

    async fn pool_by_id(&self, pool_id: PoolId) -> Result<Option<PoolState>, AmmError> {
        self.db.pools().find_by_id(pool_id).await.map_err(storage)
    }

    async fn list_pools(&self) -> Result<Vec<PoolState>, AmmError> {
        self.db.pools().find_all().await.map_err(storage)
    }

    async fn position(
        &self,
        user_id: UserId,
        pool_id: PoolId,
    ) -> Result<Option<LiquidityPosition>, AmmError> {
        self.db
            .positions()
            .find(user_id, pool_id)
            .await
            .map_err(storage)
    }

    async fn apply_deposit(&self, effect: &DepositEffect) -> Result<(), AmmError> {
        let mut tx = self.db.pool().begin().await.map_err(storage)?;
        PoolRepository::update(&mut tx, &effect.pool)
            .await
            .map_err(storage)?;
        PositionRepository::upsert(&mut tx, &effect.position)
            .await
            .map_err(storage)?;
        tx.commit().await.map_err(storage)
    }

    async fn apply_withdrawal(&self, effect: &WithdrawalEffect) -> Result<(), AmmError> {
        let mut tx = self.db.pool().begin().await.map_err(storage)?;
        PoolRepository::update(&mut tx, &effect.pool)
            .await
            .map_err(storage)?;
        if effect.close_position {
            PositionRepository::delete(&mut tx, effect.position.id)
                .await
                .map_err(storage)?;
        } else {
            PositionRepository::upsert(&mut tx, &effect.position)
                .await
                .map_err(storage)?;
        }
        tx.commit().await.map_err(storage)
    }

    async fn apply_swap(&self, effect: &SwapEffect) -> Result<(), AmmError> {
        let mut tx = self.db.pool().begin().await.map_err(storage)?;
        PoolRepository::update(&mut tx, &effect.pool)
            .await
            .map_err(storage)?;
        SwapRepository::insert(&mut tx, &effect.record)
            .await
            .map_err(storage)?;
        PriceRepository::insert(&mut tx, &effect.price_point)
            .await
            .map_err(storage)?;
        tx.commit().await.map_err(storage)
    }

    async fn price_points(
        &self,
        pair_id: PairId,
        query: &RangeQuery,
        default_limit: usize,
    ) -> Result<Vec<PricePoint>, AmmError> {
        self.db
            .prices()
            .find_range(pair_id, query, default_limit)
            .await
            .map_err(storage)
    }

    async fn swap_records(
        &self,
        pair_id: PairId,
        query: &RangeQuery,
        default_limit: usize,
    ) -> Result<Vec<SwapRecord>, AmmError> {
        self.db
            .swaps()
            .find_range(pair_id, query, default_limit)
            .await
            .map_err(storage)
    }

    async fn swap_records_since(
        &self,
        pair_id: PairId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SwapRecord>, AmmError> {
        self.db
            .swaps()
            .find_since(pair_id, since)
            .await
            .map_err(storage)
    }
}
