//! REST API server and endpoints.
//!
//! This crate exposes the CPMM engine over HTTP:
//! - Pair creation and pool listing
//! - Liquidity deposits and withdrawals
//! - Swap quoting and execution
//! - Position lookups and paginated history queries

/// Error types.
pub mod error;
/// Request handlers.
pub mod handlers;
/// API request/response models.
pub mod models;
/// Route definitions.
pub mod routes;
/// Server configuration and startup.
pub mod server;
/// Application state.
pub mod state;

pub use error::ApiError;
pub use server::{ApiServer, ServerConfig};
pub use state::AppState;
