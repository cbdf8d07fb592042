use cpmm_domain::FeeRate;
use std::time::Duration;

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fee applied to pools created without an explicit rate.
    pub default_fee: FeeRate,
    /// How long a mutating call waits for a pool's writer lock before
    /// failing with a retryable conflict.
    pub lock_timeout: Duration,
    /// Window for the rolling volume aggregate.
    pub volume_window: Duration,
    /// Default page size for history range queries.
    pub history_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_fee: FeeRate::default(), // 30 bps
            lock_timeout: Duration::from_millis(250),
            volume_window: Duration::from_secs(24 * 60 * 60),
            history_page_size: 100,
        }
    }
}
