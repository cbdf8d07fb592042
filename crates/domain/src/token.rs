use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token identifier supplied by the external token registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenId(pub i64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque user identifier supplied by the caller.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A token quantity in scaled minor units.
///
/// All reserve math runs on these integers; conversion to display decimals
/// happens only at the boundary. Products widen to `U256` so that
/// `reserve * reserve` never overflows mid-formula.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates a new amount from raw minor units.
    #[must_use]
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw minor-unit value.
    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// True if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Widens to `U256` for overflow-free intermediate products.
    #[must_use]
    pub fn widen(self) -> U256 {
        U256::from(self.0)
    }

    /// Converts minor units to a display decimal with the given scale.
    #[must_use]
    pub fn to_decimal(self, scale: u32) -> Option<Decimal> {
        let d = Decimal::from_u128(self.0)?;
        let divisor = Decimal::from(10u64.checked_pow(scale)?);
        Some(d / divisor)
    }

    /// Converts the raw minor units to an unscaled decimal.
    #[must_use]
    pub fn as_decimal(self) -> Option<Decimal> {
        Decimal::from_u128(self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(u128::from(v))
    }
}

/// A quantity of liquidity shares: a fungible claim on a proportional
/// slice of a pool's reserves. Kept distinct from [`Amount`] so share and
/// token arithmetic cannot be mixed up.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Shares(pub u128);

impl Shares {
    /// The zero share quantity.
    pub const ZERO: Self = Self(0);

    /// Creates a new share quantity.
    #[must_use]
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw share count.
    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// True if zero shares.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Widens to `U256`.
    #[must_use]
    pub fn widen(self) -> U256 {
        U256::from(self.0)
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Narrows a `U256` back to an [`Amount`], failing on truncation.
#[must_use]
pub fn narrow_amount(value: U256) -> Option<Amount> {
    if value > U256::from(u128::MAX) {
        None
    } else {
        Some(Amount(value.as_u128()))
    }
}

/// Narrows a `U256` back to [`Shares`], failing on truncation.
#[must_use]
pub fn narrow_shares(value: U256) -> Option<Shares> {
    if value > U256::from(u128::MAX) {
        None
    } else {
        Some(Shares(value.as_u128()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_arithmetic() {
        let a = Amount::new(10);
        let b = Amount::new(3);
        assert_eq!(a.checked_add(b), Some(Amount::new(13)));
        assert_eq!(a.checked_sub(b), Some(Amount::new(7)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(Amount::new(u128::MAX).checked_add(Amount::new(1)), None);
    }

    #[test]
    fn widen_and_narrow_round_trip() {
        let a = Amount::new(u128::MAX);
        assert_eq!(narrow_amount(a.widen()), Some(a));
        let too_big = U256::from(u128::MAX) + U256::from(1u8);
        assert_eq!(narrow_amount(too_big), None);
    }

    #[test]
    fn to_decimal_scales_minor_units() {
        let a = Amount::new(1_234_500);
        let d = a.to_decimal(6).unwrap();
        assert_eq!(d.to_string(), "1.2345");
    }

    #[test]
    fn shares_and_amounts_are_distinct_types() {
        // Compile-time property; just exercise the constructors.
        let s = Shares::new(5);
        assert_eq!(s.raw(), 5);
        assert!(!s.is_zero());
        assert!(Shares::ZERO.is_zero());
    }
}
