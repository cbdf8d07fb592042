//! Pair registry: canonical creation and order-independent lookup.

use crate::engine::AmmEngine;
use cpmm_domain::{AmmError, FeeRate, PairKey, PoolState, TokenId, TradingPair};
use tracing::info;

impl AmmEngine {
    /// Registers the pair for an unordered token set and initializes its
    /// empty pool.
    ///
    /// Token ids are canonicalized to `(min, max)` before anything else, so
    /// `(a, b)` and `(b, a)` name the same pair.
    ///
    /// # Errors
    /// - [`AmmError::Validation`] if both tokens are identical.
    /// - [`AmmError::DuplicatePair`] if the set is already registered.
    pub async fn create_pair(
        &self,
        token_a: TokenId,
        token_b: TokenId,
        fee: Option<FeeRate>,
    ) -> Result<TradingPair, AmmError> {
        let key = PairKey::new(token_a, token_b)?;
        if self.store.pair_by_key(key).await?.is_some() {
            return Err(AmmError::DuplicatePair);
        }

        let pair = TradingPair::new(key);
        let pool = PoolState::empty(pair.id, fee.unwrap_or(self.config.default_fee));
        // The store re-checks uniqueness under its own guard; the lookup
        // above just gives the common case a cheap failure.
        self.store.insert_pair(&pair, &pool).await?;

        info!(pair = %pair.id, token_low = %key.token_low(),
            token_high = %key.token_high(), fee_bps = pool.fee.bps(),
            "pair registered");
        Ok(pair)
    }

    /// Order-independent pair lookup.
    ///
    /// # Errors
    /// - [`AmmError::Validation`] if both tokens are identical.
    /// - [`AmmError::NotFound`] if the set is not registered.
    pub async fn get_pair(
        &self,
        token_a: TokenId,
        token_b: TokenId,
    ) -> Result<TradingPair, AmmError> {
        let key = PairKey::new(token_a, token_b)?;
        self.store
            .pair_by_key(key)
            .await?
            .ok_or(AmmError::NotFound("pair"))
    }
}
