use crate::config::EngineConfig;
use crate::locks::PoolLocks;
use crate::store::Store;
use cpmm_domain::{Amount, AmmError, PairId, PoolState, TradingPair};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The engine facade. Cheap to clone via the shared store.
///
/// Operation methods live in the sibling modules: pair management in
/// [`crate::registry`], deposits/withdrawals in [`crate::liquidity`],
/// quoting and execution in [`crate::swap`], valuations in
/// [`crate::ledger`], history in [`crate::history`].
pub struct AmmEngine {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) locks: PoolLocks,
    pub(crate) config: EngineConfig,
}

/// Pool state augmented with the derived views the read API exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOverview {
    /// Raw pool state.
    pub pool: PoolState,
    /// Spot price of the low token, absent while the pool is empty.
    pub spot_price_low: Option<Decimal>,
    /// Spot price of the high token, absent while the pool is empty.
    pub spot_price_high: Option<Decimal>,
    /// Rolling volume over the configured window, low-token denominated.
    pub volume_24h: Amount,
}

impl AmmEngine {
    /// Creates an engine over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: EngineConfig) -> Self {
        let locks = PoolLocks::new(config.lock_timeout);
        Self {
            store,
            locks,
            config,
        }
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) async fn pair(&self, pair_id: PairId) -> Result<TradingPair, AmmError> {
        self.store
            .pair_by_id(pair_id)
            .await?
            .ok_or(AmmError::NotFound("pair"))
    }

    pub(crate) async fn pool_for_pair(&self, pair_id: PairId) -> Result<PoolState, AmmError> {
        self.store
            .pool_by_pair(pair_id)
            .await?
            .ok_or(AmmError::NotFound("pool"))
    }

    /// Current state of the pool serving `pair_id`, with derived views.
    ///
    /// # Errors
    /// [`AmmError::NotFound`] if the pair is unknown.
    pub async fn pool_overview(&self, pair_id: PairId) -> Result<PoolOverview, AmmError> {
        let pool = self.pool_for_pair(pair_id).await?;
        let volume_24h = self.volume_24h(&pool).await?;
        Ok(PoolOverview {
            spot_price_low: pool.spot_price_low().ok(),
            spot_price_high: pool.spot_price_high().ok(),
            volume_24h,
            pool,
        })
    }

    /// All pools, oldest first.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn list_pools(&self) -> Result<Vec<PoolState>, AmmError> {
        self.store.list_pools().await
    }
}
