//! Repository implementations for PostgreSQL persistence.
//!
//! Read paths run against the shared connection pool; write paths take a
//! `&mut PgConnection` so the store can compose them inside one
//! transaction.

mod pair_repository;
mod pool_repository;
mod position_repository;
mod price_repository;
mod swap_repository;

pub use pair_repository::PairRepository;
pub use pool_repository::PoolRepository;
pub use position_repository::PositionRepository;
pub use price_repository::PriceRepository;
pub use swap_repository::SwapRepository;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sqlx::PgPool;
use std::sync::Arc;

/// Database connection wrapper for repositories.
#[derive(Clone)]
pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    /// Creates a new Database wrapper from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Creates a new database connection from a connection string.
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Runs any pending schema migrations.
    ///
    /// # Errors
    /// Returns an error if a migration fails to apply.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a PairRepository instance.
    #[must_use]
    pub fn pairs(&self) -> PairRepository {
        PairRepository::new(self.pool.clone())
    }

    /// Creates a PoolRepository instance.
    #[must_use]
    pub fn pools(&self) -> PoolRepository {
        PoolRepository::new(self.pool.clone())
    }

    /// Creates a PositionRepository instance.
    #[must_use]
    pub fn positions(&self) -> PositionRepository {
        PositionRepository::new(self.pool.clone())
    }

    /// Creates a SwapRepository instance.
    #[must_use]
    pub fn swaps(&self) -> SwapRepository {
        SwapRepository::new(self.pool.clone())
    }

    /// Creates a PriceRepository instance.
    #[must_use]
    pub fn prices(&self) -> PriceRepository {
        PriceRepository::new(self.pool.clone())
    }
}

/// Encodes a minor-unit integer for a NUMERIC(39, 0) column.
pub(crate) fn encode_numeric(value: u128) -> Result<Decimal, sqlx::Error> {
    Decimal::from_u128(value)
        .ok_or_else(|| sqlx::Error::Encode(format!("amount out of range: {value}").into()))
}

/// Decodes a NUMERIC(39, 0) column back into a minor-unit integer.
pub(crate) fn decode_numeric(value: Decimal) -> Result<u128, sqlx::Error> {
    value
        .to_u128()
        .ok_or_else(|| sqlx::Error::Decode(format!("amount out of range: {value}").into()))
}
