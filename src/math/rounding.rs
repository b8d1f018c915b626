//! Rounding helpers for integer division.
//!
//! [`div_round`] divides two signed big integers with an explicit
//! [`Rounding`] direction applied to the **magnitude** of the quotient.  It
//! is the low-level building block under every fixed-point multiply and
//! divide in [`Fixed`](super::Fixed).
//!
//! # Convention
//!
//! **Always round in favor of the pool's existing liquidity providers**:
//!
//! | Quantity | Direction | Effect |
//! |----------|-----------|--------|
//! | Amount paid out | [`Rounding::Down`] | trader receives less |
//! | Amount paid in | [`Rounding::Up`] | trader pays more |
//! | Invariant underestimate | [`Rounding::Down`] | pool looks shallower |
//! | Invariant overestimate | [`Rounding::Up`] | bound stays conservative |
//!
//! # Examples
//!
//! ```
//! use clp_math::domain::Rounding;
//! use clp_math::math::div_round;
//! use num_bigint::BigInt;
//!
//! let q = |n: i64, d: i64, r| div_round(&BigInt::from(n), &BigInt::from(d), r);
//! assert_eq!(q(10, 3, Rounding::Down), Some(BigInt::from(3)));
//! assert_eq!(q(10, 3, Rounding::Up), Some(BigInt::from(4)));
//! assert_eq!(q(-10, 3, Rounding::Down), Some(BigInt::from(-3)));
//! assert_eq!(q(-10, 3, Rounding::Up), Some(BigInt::from(-4)));
//! assert_eq!(q(10, 0, Rounding::Down), None);
//! ```

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::domain::Rounding;

/// Signed division with explicit magnitude rounding.
///
/// - [`Rounding::Down`]: toward zero.
/// - [`Rounding::Up`]: away from zero.
///
/// Returns [`None`] if `denominator` is zero.
#[must_use]
pub fn div_round(numerator: &BigInt, denominator: &BigInt, rounding: Rounding) -> Option<BigInt> {
    if denominator.is_zero() {
        return None;
    }
    let (quotient, remainder) = numerator.div_rem(denominator);
    if rounding.is_down() || remainder.is_zero() {
        return Some(quotient);
    }
    if numerator.is_negative() == denominator.is_negative() {
        Some(quotient + 1)
    } else {
        Some(quotient - 1)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64, r: Rounding) -> i64 {
        let Some(v) = div_round(&BigInt::from(n), &BigInt::from(d), r) else {
            panic!("non-zero denominator");
        };
        let Ok(v) = i64::try_from(v) else {
            panic!("fits");
        };
        v
    }

    #[test]
    fn exact_division_agrees() {
        assert_eq!(q(12, 4, Rounding::Down), 3);
        assert_eq!(q(12, 4, Rounding::Up), 3);
        assert_eq!(q(-12, 4, Rounding::Up), -3);
    }

    #[test]
    fn up_moves_away_from_zero() {
        assert_eq!(q(7, 2, Rounding::Up), 4);
        assert_eq!(q(-7, 2, Rounding::Up), -4);
        assert_eq!(q(7, -2, Rounding::Up), -4);
        assert_eq!(q(-7, -2, Rounding::Up), 4);
    }

    #[test]
    fn down_moves_toward_zero() {
        assert_eq!(q(7, 2, Rounding::Down), 3);
        assert_eq!(q(-7, 2, Rounding::Down), -3);
    }

    #[test]
    fn zero_numerator() {
        assert_eq!(q(0, 5, Rounding::Up), 0);
    }

    #[test]
    fn zero_denominator_is_none() {
        assert!(div_round(&BigInt::from(1), &BigInt::zero(), Rounding::Up).is_none());
    }
}
