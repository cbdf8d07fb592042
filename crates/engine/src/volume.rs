//! Rolling volume, derived from the swap log.
//!
//! The aggregate is recomputed from a time-filtered scan of the
//! append-only log on every read. A freely incremented counter would never
//! decay; scanning the log makes old trades age out of the window for
//! free and keeps the figure exact.

use crate::engine::AmmEngine;
use chrono::{Duration as ChronoDuration, Utc};
use cpmm_domain::{Amount, AmmError, PoolState};

impl AmmEngine {
    /// Trading volume of a pool over the configured window, denominated in
    /// the low token (each swap contributes its low-token side).
    ///
    /// # Errors
    /// - [`AmmError::NotFound`] if the pool's pair is unknown.
    /// - [`AmmError::Overflow`] if the sum exceeds the amount range.
    pub async fn volume_24h(&self, pool: &PoolState) -> Result<Amount, AmmError> {
        let pair = self.pair(pool.pair_id).await?;
        let window = ChronoDuration::from_std(self.config.volume_window)
            .map_err(|_| AmmError::Validation("volume window out of range"))?;
        let since = Utc::now() - window;

        let records = self.store.swap_records_since(pool.pair_id, since).await?;
        let mut total = Amount::ZERO;
        for record in &records {
            let low_side = if record.token_in == pair.key.token_low() {
                record.amount_in
            } else {
                record.amount_out
            };
            total = total
                .checked_add(low_side)
                .ok_or(AmmError::Overflow("volume sum"))?;
        }
        Ok(total)
    }
}
