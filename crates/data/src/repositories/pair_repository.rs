//! Trading-pair repository.

use cpmm_domain::{PairId, PairKey, TokenId, TradingPair};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use std::sync::Arc;

/// Builds a TradingPair from a database row.
fn from_row(row: &PgRow) -> Result<TradingPair, sqlx::Error> {
    let token_low: i64 = row.try_get("token_low")?;
    let token_high: i64 = row.try_get("token_high")?;
    let key = PairKey::new(TokenId(token_low), TokenId(token_high))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(TradingPair {
        id: PairId(row.try_get("id")?),
        key,
        created_at: row.try_get("created_at")?,
    })
}

/// Repository for trading-pair lookups.
#[derive(Clone)]
pub struct PairRepository {
    pool: Arc<PgPool>,
}

impl PairRepository {
    /// Creates a new PairRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds a pair by its ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: PairId) -> Result<Option<TradingPair>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM trading_pairs WHERE id = $1")
            .bind(id.0)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(from_row).transpose()
    }

    /// Finds a pair by its canonical token key.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_key(&self, key: PairKey) -> Result<Option<TradingPair>, sqlx::Error> {
        let row =
            sqlx::query("SELECT * FROM trading_pairs WHERE token_low = $1 AND token_high = $2")
                .bind(key.token_low().0)
                .bind(key.token_high().0)
                .fetch_optional(self.pool.as_ref())
                .await?;
        row.as_ref().map(from_row).transpose()
    }

    /// Inserts a pair. Fails with a unique violation if the token set
    /// already exists.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn insert(conn: &mut PgConnection, pair: &TradingPair) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO trading_pairs (id, token_low, token_high, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(pair.id.0)
        .bind(pair.key.token_low().0)
        .bind(pair.key.token_high().0)
        .bind(pair.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }
}
