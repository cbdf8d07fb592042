//! Domain model for the constant-product AMM engine.
//!
//! This crate holds the pure core: entities (pairs, pools, positions, swap
//! records, price points), value objects with checked fixed-point
//! arithmetic, and the pricing math itself. Nothing here does I/O; the
//! engine and persistence crates build on top of it.

/// Error taxonomy shared by all crates.
pub mod error;
/// Fee rates in basis points.
pub mod fee;
/// Fixed-point pricing and liquidity math.
pub mod math;
/// Trading pairs and canonical token ordering.
pub mod pair;
/// Pool state and derived spot prices.
pub mod pool;
/// Liquidity positions and live valuations.
pub mod position;
/// Swap quotes, receipts, records and price points.
pub mod swap;
/// Token, user and amount value objects.
pub mod token;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::AmmError;
    pub use crate::fee::FeeRate;
    pub use crate::pair::{PairId, PairKey, TradingPair};
    pub use crate::pool::{PoolId, PoolState};
    pub use crate::position::{LiquidityPosition, PositionValuation};
    pub use crate::swap::{PricePoint, SwapQuote, SwapReceipt, SwapRecord};
    pub use crate::token::{Amount, Shares, TokenId, UserId};
}

pub use error::AmmError;
pub use fee::FeeRate;
pub use pair::{PairId, PairKey, TradingPair};
pub use pool::{PoolId, PoolState};
pub use position::{LiquidityPosition, PositionValuation};
pub use swap::{PricePoint, SwapQuote, SwapReceipt, SwapRecord};
pub use token::{Amount, Shares, TokenId, UserId};
