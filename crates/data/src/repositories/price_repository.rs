//! Price-history repository. The table is append-only.

use cpmm_domain::{PairId, PricePoint};
use cpmm_engine::RangeQuery;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use std::sync::Arc;

/// Builds a PricePoint from a database row.
fn from_row(row: &PgRow) -> Result<PricePoint, sqlx::Error> {
    Ok(PricePoint {
        id: row.try_get("id")?,
        pair_id: PairId(row.try_get("pair_id")?),
        price_low: row.try_get("price_low")?,
        price_high: row.try_get("price_high")?,
        recorded_at: row.try_get("recorded_at")?,
    })
}

/// Repository for append-only spot-price samples.
#[derive(Clone)]
pub struct PriceRepository {
    pool: Arc<PgPool>,
}

impl PriceRepository {
    /// Creates a new PriceRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Price samples for a pair ascending by `(recorded_at, id)`, resuming
    /// strictly after the query cursor when one is set.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_range(
        &self,
        pair_id: PairId,
        query: &RangeQuery,
        default_limit: usize,
    ) -> Result<Vec<PricePoint>, sqlx::Error> {
        let limit = i64::try_from(query.limit.unwrap_or(default_limit))
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let rows = sqlx::query(
            "SELECT * FROM price_points \
             WHERE pair_id = $1 \
               AND ($2::timestamptz IS NULL OR recorded_at >= $2) \
               AND ($3::timestamptz IS NULL OR recorded_at <= $3) \
               AND ($4::timestamptz IS NULL OR (recorded_at, id) > ($4, $5)) \
             ORDER BY recorded_at, id \
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

    /// Appends a price sample.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn insert(conn: &mut PgConnection, point: &PricePoint) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO price_points (id, pair_id, price_low, price_high, recorded_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(point.id)
        .bind(point.pair_id.0)
        .bind(point.price_low)
        .bind(point.price_high)
        .bind(point.recorded_at)
        .execute(conn)
        .await?;
        Ok(())
    }
}
