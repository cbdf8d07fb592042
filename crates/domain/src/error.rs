use thiserror::Error;

/// Errors surfaced by the AMM engine.
///
/// Every pool-mutating failure aborts the whole operation; no partial
/// reserve update is ever persisted. [`AmmError::is_retryable`] tells a
/// caller whether retrying with fresh state can succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    /// Malformed input: non-positive amounts, identical tokens, unknown
    /// fields. Never touches pool state.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// The pool is empty or cannot satisfy the requested output.
    #[error("insufficient liquidity in pool")]
    InsufficientLiquidity,

    /// Computed output fell below the caller's minimum, or the required
    /// paired deposit exceeded the caller's maximum.
    #[error("slippage exceeded: bound {bound}, actual {actual}")]
    SlippageExceeded {
        /// The caller's stated bound (minimum output or maximum deposit).
        bound: u128,
        /// What the pool would actually deliver or require.
        actual: u128,
    },

    /// Withdrawal asked for more shares than the position owns.
    #[error("insufficient shares: requested {requested}, owned {owned}")]
    InsufficientShares {
        /// Shares requested for redemption.
        requested: u128,
        /// Shares the position actually holds.
        owned: u128,
    },

    /// The pool's writer lock could not be acquired in time.
    #[error("pool is contended, retry with backoff")]
    ConcurrencyConflict,

    /// A pair for this unordered token set already exists.
    #[error("trading pair already exists")]
    DuplicatePair,

    /// Pair, pool or position not found.
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// Checked fixed-point arithmetic overflowed.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// The persistence layer failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl AmmError {
    /// Whether the caller may retry the same intent against fresh state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrencyConflict | Self::SlippageExceeded { .. } | Self::Storage(_)
        )
    }
}
