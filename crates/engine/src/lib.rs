//! The AMM engine: pair registry, liquidity management, swap execution,
//! position ledger and append-only history.
//!
//! [`AmmEngine`] is the single entry point. It owns a [`store::Store`]
//! behind an `Arc` and enforces the single-writer-per-pool discipline: every
//! mutating call serializes on the pool's lock, computes the whole effect
//! from live state, and commits it through one atomic store call. Quotes
//! take no lock and read a snapshot.

/// Engine configuration.
pub mod config;
/// The engine facade.
pub mod engine;
/// Range queries over price history and the swap log.
pub mod history;
/// Position ledger with live valuations.
pub mod ledger;
/// Deposit and withdrawal operations.
pub mod liquidity;
/// Per-pool writer locks.
pub mod locks;
/// In-memory store.
pub mod memory;
/// Pair registry operations.
pub mod registry;
/// Store trait and atomic effects.
pub mod store;
/// Quote and execute.
pub mod swap;
/// Rolling 24h volume.
pub mod volume;

pub use config::EngineConfig;
pub use engine::{AmmEngine, PoolOverview};
pub use history::Page;
pub use ledger::PositionView;
pub use liquidity::{DepositOutcome, WithdrawalOutcome};
pub use memory::InMemoryStore;
pub use store::{Cursor, DepositEffect, RangeQuery, Store, SwapEffect, WithdrawalEffect};
