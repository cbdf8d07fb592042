//! Liquidity-position repository.

use super::{decode_numeric, encode_numeric};
use cpmm_domain::{Amount, LiquidityPosition, PoolId, Shares, UserId};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Builds a LiquidityPosition from a database row.
fn from_row(row: &PgRow) -> Result<LiquidityPosition, sqlx::Error> {
    Ok(LiquidityPosition {
        id: row.try_get("id")?,
        user_id: UserId(row.try_get("user_id")?),
        pool_id: PoolId(row.try_get("pool_id")?),
        shares: Shares::new(decode_numeric(row.try_get("shares")?)?),
        deposited_low: Amount::new(decode_numeric(row.try_get("deposited_low")?)?),
        deposited_high: Amount::new(decode_numeric(row.try_get("deposited_high")?)?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Repository for per-user pool positions.
#[derive(Clone)]
pub struct PositionRepository {
    pool: Arc<PgPool>,
}

impl PositionRepository {
    /// Creates a new PositionRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds a user's position in a pool.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find(
        &self,
        user_id: UserId,
        pool_id: PoolId,
    ) -> Result<Option<LiquidityPosition>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM positions WHERE user_id = $1 AND pool_id = $2")
            .bind(user_id.0)
            .bind(pool_id.0)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(from_row).transpose()
    }

    /// Creates or replaces a user's position in a pool.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn upsert(
        conn: &mut PgConnection,
        position: &LiquidityPosition,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO positions (id, user_id, pool_id, shares, deposited_low, \
                                    deposited_high, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (user_id, pool_id) DO UPDATE SET \
                 shares = EXCLUDED.shares, \
                 deposited_low = EXCLUDED.deposited_low, \
                 deposited_high = EXCLUDED.deposited_high, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(position.id)
        .bind(position.user_id.0)
        .bind(position.pool_id.0)
        .bind(encode_numeric(position.shares.raw())?)
        .bind(encode_numeric(position.deposited_low.raw())?)
        .bind(encode_numeric(position.deposited_high.raw())?)
        .bind(position.created_at)
        .bind(position.updated_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Deletes a position by ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM positions WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
