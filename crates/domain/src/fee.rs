use crate::error::AmmError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Basis-point denominator (10 000 = 100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// A pool fee rate in basis points, constrained to `[0, 10000)`.
///
/// Fees are taken on the input side of a swap and retained in the pool,
/// which is what makes the constant product strictly increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(u32);

impl FeeRate {
    /// The zero fee rate.
    pub const ZERO: Self = Self(0);

    /// Creates a fee rate, rejecting 100% or more.
    ///
    /// # Errors
    /// Returns [`AmmError::Validation`] if `bps >= 10000`.
    pub fn from_bps(bps: u32) -> Result<Self, AmmError> {
        if bps >= BPS_DENOMINATOR {
            return Err(AmmError::Validation("fee rate must be below 100%"));
        }
        Ok(Self(bps))
    }

    /// Returns the rate in basis points.
    #[must_use]
    pub const fn bps(self) -> u32 {
        self.0
    }

    /// Returns the complement `10000 - bps`, always positive.
    #[must_use]
    pub const fn complement_bps(self) -> u32 {
        BPS_DENOMINATOR - self.0
    }

    /// Returns the rate as a decimal fraction (30 bps -> 0.003).
    #[must_use]
    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(BPS_DENOMINATOR)
    }
}

impl Default for FeeRate {
    /// The conventional 0.3% pool fee.
    fn default() -> Self {
        Self(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_full_fee() {
        assert!(FeeRate::from_bps(10_000).is_err());
        assert!(FeeRate::from_bps(20_000).is_err());
        assert!(FeeRate::from_bps(9_999).is_ok());
    }

    #[test]
    fn decimal_conversion() {
        let fee = FeeRate::from_bps(30).unwrap();
        assert_eq!(fee.as_decimal(), dec!(0.003));
        assert_eq!(fee.complement_bps(), 9_970);
    }

    #[test]
    fn default_is_thirty_bps() {
        assert_eq!(FeeRate::default().bps(), 30);
    }
}
