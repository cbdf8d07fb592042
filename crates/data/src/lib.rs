//! PostgreSQL persistence for the CPMM engine.
//!
//! [`Database`] wraps the connection pool and hands out repositories;
//! [`PgStore`] adapts them to the engine's storage trait.

pub mod repositories;
pub mod store;

pub use repositories::Database;
pub use store::PgStore;
