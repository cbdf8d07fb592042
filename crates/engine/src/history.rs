//! Range queries over the append-only logs.
//!
//! Both logs expose keyset-paginated scans ordered by `(timestamp, id)`.
//! A page carries the cursor of its last item; resuming with that cursor
//! restarts the scan exactly where it stopped, so a consumer can walk an
//! arbitrarily long range in bounded pages.

use crate::engine::AmmEngine;
use crate::store::{Cursor, RangeQuery};
use cpmm_domain::{AmmError, PairId, PricePoint, SwapRecord};
use serde::{Deserialize, Serialize};

/// One page of an ordered range scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in ascending timestamp order.
    pub items: Vec<T>,
    /// Cursor to resume after the last item, absent when the scan is
    /// exhausted.
    pub next: Option<Cursor>,
}

impl AmmEngine {
    /// Spot-price samples for a pair within a time range.
    ///
    /// # Errors
    /// [`AmmError::NotFound`] if the pair is unknown.
    pub async fn price_history(
        &self,
        pair_id: PairId,
        query: RangeQuery,
    ) -> Result<Page<PricePoint>, AmmError> {
        self.pair(pair_id).await?;
        let limit = query.limit.unwrap_or(self.config.history_page_size);
        let items = self
            .store
            .price_points(pair_id, &query, self.config.history_page_size)
            .await?;
        let next = (items.len() == limit && limit > 0).then(|| {
            let last = &items[items.len() - 1];
            Cursor {
                at: last.recorded_at,
                id: last.id,
            }
        });
        Ok(Page { items, next })
    }

    /// Executed swaps for a pair within a time range.
    ///
    /// # Errors
    /// [`AmmError::NotFound`] if the pair is unknown.
    pub async fn swap_history(
        &self,
        pair_id: PairId,
        query: RangeQuery,
    ) -> Result<Page<SwapRecord>, AmmError> {
        self.pair(pair_id).await?;
        let limit = query.limit.unwrap_or(self.config.history_page_size);
        let items = self
            .store
            .swap_records(pair_id, &query, self.config.history_page_size)
            .await?;
        let next = (items.len() == limit && limit > 0).then(|| {
            let last = &items[items.len() - 1];
            Cursor {
                at: last.executed_at,
                id: last.id,
            }
        });
        Ok(Page { items, next })
    }
}
