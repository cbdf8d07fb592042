//! Pool repository for reserve and share persistence.

use super::{decode_numeric, encode_numeric};
use cpmm_domain::{Amount, FeeRate, PairId, PoolId, PoolState, Shares};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use std::sync::Arc;

/// Builds a PoolState from a database row.
fn from_row(row: &PgRow) -> Result<PoolState, sqlx::Error> {
    let fee_bps: i32 = row.try_get("fee_bps")?;
    let fee_bps = u32::try_from(fee_bps)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(PoolState {
        id: PoolId(row.try_get("id")?),
        pair_id: PairId(row.try_get("pair_id")?),
        reserve_low: Amount::new(decode_numeric(row.try_get("reserve_low")?)?),
        reserve_high: Amount::new(decode_numeric(row.try_get("reserve_high")?)?),
        total_shares: Shares::new(decode_numeric(row.try_get("total_shares")?)?),
        fee: FeeRate::from_bps(fee_bps).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Repository for pool reads and writes.
#[derive(Clone)]
pub struct PoolRepository {
    pool: Arc<PgPool>,
}

impl PoolRepository {
    /// Creates a new PoolRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds a pool by its ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: PoolId) -> Result<Option<PoolState>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM pools WHERE id = $1")
            .bind(id.0)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(from_row).transpose()
    }

    /// Finds the pool serving a pair.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_pair(&self, pair_id: PairId) -> Result<Option<PoolState>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM pools WHERE pair_id = $1")
            .bind(pair_id.0)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(from_row).transpose()
    }

    /// Finds all pools.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_all(&self) -> Result<Vec<PoolState>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM pools ORDER BY created_at")
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter().map(from_row).collect()
    }

    /// Inserts a pool row.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn insert(conn: &mut PgConnection, pool: &PoolState) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO pools (id, pair_id, reserve_low, reserve_high, total_shares, \
                                fee_bps, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(pool.id.0)
        .bind(pool.pair_id.0)
        .bind(encode_numeric(pool.reserve_low.raw())?)
        .bind(encode_numeric(pool.reserve_high.raw())?)
        .bind(encode_numeric(pool.total_shares.raw())?)
        .bind(i32::try_from(pool.fee.bps()).map_err(|e| sqlx::Error::Encode(Box::new(e)))?)
        .bind(pool.created_at)
        .bind(pool.updated_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Overwrites the mutable pool columns with a new state.
    ///
    /// # Errors
    /// Returns an error if the query fails or the pool row is missing.
    pub async fn update(conn: &mut PgConnection, pool: &PoolState) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pools SET reserve_low = $2, reserve_high = $3, total_shares = $4, \
                              updated_at = $5 \
             WHERE id = $1",
        )
        .bind(pool.id.0)
        .bind(encode_numeric(pool.reserve_low.raw())?)
        .bind(encode_numeric(pool.reserve_high.raw())?)
        .bind(encode_numeric(pool.total_shares.raw())?)
        .bind(pool.updated_at)
        .execute(conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }
}
