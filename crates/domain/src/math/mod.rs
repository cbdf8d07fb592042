//! Fixed-point math shared by pricing and liquidity accounting.
//!
//! All intermediate products widen to `U256` so that `u128` reserve values
//! can be multiplied without overflow. Rounding always favours the pool:
//! outputs and redemptions round down, required deposits round up.

/// Constant-product pricing: output amounts, spot prices, price impact.
pub mod constant_product;
/// Share minting and redemption arithmetic.
pub mod liquidity;

use primitive_types::U256;

/// Rounding direction for integer division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round toward zero.
    Down,
    /// Round away from zero.
    Up,
}

/// Computes `a * b / d` with a widened intermediate product.
///
/// Returns `None` if `d` is zero or the result does not fit in `u128`.
#[must_use]
pub fn mul_div(a: u128, b: u128, d: u128, rounding: Rounding) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let product = U256::from(a) * U256::from(b);
    let divisor = U256::from(d);
    let quotient = product / divisor;
    let result = match rounding {
        Rounding::Down => quotient,
        Rounding::Up => {
            if (product % divisor).is_zero() {
                quotient
            } else {
                quotient + U256::from(1u8)
            }
        }
    };
    if result > U256::from(u128::MAX) {
        None
    } else {
        Some(result.as_u128())
    }
}

/// Integer square root via Newton's method.
#[must_use]
pub fn isqrt(n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let mut x = n;
    let mut y = (x + U256::from(1u8)) / U256::from(2u8);
    while y < x {
        x = y;
        y = (x + n / x) / U256::from(2u8);
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_rounds_in_both_directions() {
        assert_eq!(mul_div(7, 3, 2, Rounding::Down), Some(10));
        assert_eq!(mul_div(7, 3, 2, Rounding::Up), Some(11));
        assert_eq!(mul_div(6, 3, 2, Rounding::Up), Some(9));
    }

    #[test]
    fn mul_div_zero_divisor() {
        assert_eq!(mul_div(1, 1, 0, Rounding::Down), None);
    }

    #[test]
    fn mul_div_widens_past_u128() {
        // u128::MAX * 2 / 2 fits, even though the product does not.
        assert_eq!(
            mul_div(u128::MAX, 2, 2, Rounding::Down),
            Some(u128::MAX)
        );
        // But a result beyond u128 is rejected.
        assert_eq!(mul_div(u128::MAX, 2, 1, Rounding::Down), None);
    }

    #[test]
    fn isqrt_exact_and_floor() {
        assert_eq!(isqrt(U256::zero()), U256::zero());
        assert_eq!(isqrt(U256::from(1u8)), U256::from(1u8));
        assert_eq!(isqrt(U256::from(40_000u32)), U256::from(200u32));
        assert_eq!(isqrt(U256::from(40_001u32)), U256::from(200u32));
        assert_eq!(isqrt(U256::from(39_999u32)), U256::from(199u32));
    }
}
