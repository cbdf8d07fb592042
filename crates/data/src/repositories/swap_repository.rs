//! Swap-log repository. The table is append-only.

use super::{decode_numeric, encode_numeric};
use chrono::{DateTime, Utc};
use cpmm_domain::{Amount, PairId, SwapRecord, TokenId, UserId};
use cpmm_engine::RangeQuery;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use std::sync::Arc;

/// Builds a SwapRecord from a database row.
fn from_row(row: &PgRow) -> Result<SwapRecord, sqlx::Error> {
    Ok(SwapRecord {
        id: row.try_get("id")?,
        user_id: UserId(row.try_get("user_id")?),
        pair_id: PairId(row.try_get("pair_id")?),
        token_in: TokenId(row.try_get("token_in")?),
        token_out: TokenId(row.try_get("token_out")?),
        amount_in: Amount::new(decode_numeric(row.try_get("amount_in")?)?),
        amount_out: Amount::new(decode_numeric(row.try_get("amount_out")?)?),
        fee: Amount::new(decode_numeric(row.try_get("fee")?)?),
        price_impact: row.try_get("price_impact")?,
        executed_at: row.try_get("executed_at")?,
    })
}

/// Repository for the append-only swap log.
#[derive(Clone)]
pub struct SwapRepository {
    pool: Arc<PgPool>,
}

impl SwapRepository {
    /// Creates a new SwapRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Swap records for a pair ascending by `(executed_at, id)`, resuming
    /// strictly after the query cursor when one is set.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_range(
        &self,
        pair_id: PairId,
        query: &RangeQuery,
        default_limit: usize,
    ) -> Result<Vec<SwapRecord>, sqlx::Error> {
        let limit = i64::try_from(query.limit.unwrap_or(default_limit))
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let rows = sqlx::query(
            "SELECT * FROM swaps \
             WHERE pair_id = $1 \
               AND ($2::timestamptz IS NULL OR executed_at >= $2) \
               AND ($3::timestamptz IS NULL OR executed_at <= $3) \
               AND ($4::timestamptz IS NULL OR (executed_at, id) > ($4, $5)) \
             ORDER BY executed_at, id \
             LIMIT $6",
        )
        .bind(pair_id.0)
        .bind(query.start)
        .bind(query.end)
        .bind(query.after.map(|c| c.at))
        .bind(query.after.map(|c| c.id))
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter().map(from_row).collect()
    }

    /// All swap records for a pair at or after `since`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_since(
        &self,
        pair_id: PairId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SwapRecord>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM swaps WHERE pair_id = $1 AND executed_at >= $2 \
             ORDER BY executed_at, id",
        )
        .bind(pair_id.0)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter().map(from_row).collect()
    }

    /// Appends a swap record.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn insert(conn: &mut PgConnection, record: &SwapRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO swaps (id, user_id, pair_id, token_in, token_out, amount_in, \
                                amount_out, fee, price_impact, executed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(record.id)
        .bind(record.user_id.0)
        .bind(record.pair_id.0)
        .bind(record.token_in.0)
        .bind(record.token_out.0)
        .bind(encode_numeric(record.amount_in.raw())?)
        .bind(encode_numeric(record.amount_out.raw())?)
        .bind(encode_numeric(record.fee.raw())?)
        .bind(record.price_impact)
        .bind(record.executed_at)
        .execute(conn)
        .await?;
        Ok(())
    }
}
