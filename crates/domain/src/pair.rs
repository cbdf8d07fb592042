use crate::error::AmmError;
use crate::token::TokenId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a trading pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PairId(pub Uuid);

impl PairId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order-independent identity of an unordered token set.
///
/// Construction canonicalizes to `(min, max)`, which guarantees at most one
/// pair can ever exist for two tokens regardless of argument order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PairKey {
    token_low: TokenId,
    token_high: TokenId,
}

impl PairKey {
    /// Canonicalizes two token ids into a pair key.
    ///
    /// # Errors
    /// Returns [`AmmError::Validation`] if both ids are identical.
    pub fn new(a: TokenId, b: TokenId) -> Result<Self, AmmError> {
        if a == b {
            return Err(AmmError::Validation("pair requires two distinct tokens"));
        }
        let (token_low, token_high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self {
            token_low,
            token_high,
        })
    }

    /// The numerically smaller token id.
    #[must_use]
    pub const fn token_low(self) -> TokenId {
        self.token_low
    }

    /// The numerically larger token id.
    #[must_use]
    pub const fn token_high(self) -> TokenId {
        self.token_high
    }

    /// Whether the given token is one side of this pair.
    #[must_use]
    pub fn contains(self, token: TokenId) -> bool {
        token == self.token_low || token == self.token_high
    }

    /// Returns the opposite side of the pair, if `token` belongs to it.
    #[must_use]
    pub fn other(self, token: TokenId) -> Option<TokenId> {
        if token == self.token_low {
            Some(self.token_high)
        } else if token == self.token_high {
            Some(self.token_low)
        } else {
            None
        }
    }
}

/// A registered trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingPair {
    /// Unique identifier.
    pub id: PairId,
    /// Canonical token ordering.
    pub key: PairKey,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl TradingPair {
    /// Creates a new pair with a fresh id.
    #[must_use]
    pub fn new(key: PairKey) -> Self {
        Self {
            id: PairId::generate(),
            key,
            created_at: Utc::now(),
        }
    }
}
