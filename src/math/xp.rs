//! Conversions between normal (18) and extra (38) precision.
//!
//! The central operations are [`Fixed::<Np>::mul_down_xp_to_np`] and
//! [`Fixed::<Np>::mul_up_xp_to_np`]: an Np value times an Xp factor,
//! returned at Np.  The factor is split at `10^19` so that the low half of
//! the Xp factor still contributes before the final division:
//!
//! ```text
//! b1 = b / 1e19            b2 = b % 1e19
//! prod1 = a · b1           prod2 = a · b2
//! down: (prod1 + prod2 / 1e19) / 1e19        (floor for mixed signs)
//! up:   (prod1 + prod2 / 1e19 - 1) / 1e19 + 1 (ceil for mixed signs)
//! ```
//!
//! Unlike the magnitude-rounded `mul_down`/`mul_up`, these round toward
//! negative and positive infinity respectively.

use std::sync::LazyLock;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use super::fixed::Fixed;
use super::precision::{pow10, Np, Xp};
use crate::domain::Rounding;
use crate::error::ClpError;

static SPLIT: LazyLock<BigInt> = LazyLock::new(|| pow10(19));

impl Fixed<Np> {
    /// Lifts an Np value to Xp (exact).
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the value does not fit.
    pub fn to_xp(&self) -> Result<Fixed<Xp>, ClpError> {
        self.rescale(Rounding::Down)
    }

    /// `self · b` with `b` at Xp, rounded toward negative infinity.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the result leaves the
    /// range.
    pub fn mul_down_xp_to_np(&self, b: &Fixed<Xp>) -> Result<Self, ClpError> {
        let (prod1, prod2) = split_products(self.raw(), b.raw());
        let raw = if !prod1.is_negative() && !prod2.is_negative() {
            (prod1 + prod2 / &*SPLIT) / &*SPLIT
        } else {
            (prod1 + prod2 / &*SPLIT + 1) / &*SPLIT - 1
        };
        Self::try_from_raw(raw, "mul_down_xp_to_np")
    }

    /// `self · b` with `b` at Xp, rounded toward positive infinity.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the result leaves the
    /// range.
    pub fn mul_up_xp_to_np(&self, b: &Fixed<Xp>) -> Result<Self, ClpError> {
        let (prod1, prod2) = split_products(self.raw(), b.raw());
        let raw = if !prod1.is_positive() && !prod2.is_positive() {
            (prod1 + prod2 / &*SPLIT) / &*SPLIT
        } else {
            (prod1 + prod2 / &*SPLIT - 1) / &*SPLIT + 1
        };
        Self::try_from_raw(raw, "mul_up_xp_to_np")
    }

    /// Rounding-parameterized form of the two products above.
    ///
    /// # Errors
    ///
    /// See [`Fixed::mul_down_xp_to_np`].
    pub fn mul_xp_to_np(&self, b: &Fixed<Xp>, rounding: Rounding) -> Result<Self, ClpError> {
        match rounding {
            Rounding::Down => self.mul_down_xp_to_np(b),
            Rounding::Up => self.mul_up_xp_to_np(b),
        }
    }
}

impl Fixed<Xp> {
    /// Drops to Np, rounding the magnitude in the given direction.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the value does not fit.
    pub fn to_np(&self, rounding: Rounding) -> Result<Fixed<Np>, ClpError> {
        self.rescale(rounding)
    }

    /// Xp product, truncated toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the result leaves the
    /// range.
    pub fn mul_xp(&self, other: &Self) -> Result<Self, ClpError> {
        self.mul_down(other)
    }

    /// Xp quotient, truncated toward zero.
    ///
    /// # Errors
    ///
    /// - [`ClpError::DivisionByZero`] if `other` is zero.
    /// - [`ClpError::ArithmeticOverflow`] if the result leaves the range.
    pub fn div_xp(&self, other: &Self) -> Result<Self, ClpError> {
        if self.is_zero() {
            return Ok(Self::zero());
        }
        self.div_down(other)
    }
}

fn split_products(a: &BigInt, b: &BigInt) -> (BigInt, BigInt) {
    let b1 = b / &*SPLIT;
    let b2 = if b1.is_zero() { b.clone() } else { b - &b1 * &*SPLIT };
    (a * b1, a * b2)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn np(s: &str) -> Fixed<Np> {
        let Ok(v) = s.parse() else {
            panic!("valid decimal {s}");
        };
        v
    }

    fn xp(s: &str) -> Fixed<Xp> {
        let Ok(v) = s.parse() else {
            panic!("valid decimal {s}");
        };
        v
    }

    #[test]
    fn exact_products_agree() {
        let a = np("2");
        let b = xp("1.5");
        let (Ok(down), Ok(up)) = (a.mul_down_xp_to_np(&b), a.mul_up_xp_to_np(&b)) else {
            panic!("products");
        };
        assert_eq!(down, np("3"));
        assert_eq!(up, np("3"));
    }

    #[test]
    fn inexact_products_bracket() {
        let a = np("1");
        let b = xp("0.33333333333333333333333333333333333333");
        let (Ok(down), Ok(up)) = (a.mul_down_xp_to_np(&b), a.mul_up_xp_to_np(&b)) else {
            panic!("products");
        };
        assert_eq!(down, np("0.333333333333333333"));
        assert_eq!(up, np("0.333333333333333334"));
    }

    #[test]
    fn negative_down_rounds_toward_negative_infinity() {
        let a = np("-1");
        let b = xp("0.33333333333333333333333333333333333333");
        let (Ok(down), Ok(up)) = (a.mul_down_xp_to_np(&b), a.mul_up_xp_to_np(&b)) else {
            panic!("products");
        };
        assert_eq!(down, np("-0.333333333333333334"));
        assert_eq!(up, np("-0.333333333333333333"));
    }

    #[test]
    fn low_half_of_factor_contributes() {
        // b < 1e19 raw: b1 == 0 and the whole factor goes through prod2
        let a = np("1000000000000000000");
        let b = Fixed::<Xp>::from_raw(BigInt::from(5_000_000_000_000_000_000u64));
        let Ok(down) = a.mul_down_xp_to_np(&b) else {
            panic!("product");
        };
        // 1e18 · 5e-20 = 0.05
        assert_eq!(down, np("0.05"));
    }

    #[test]
    fn np_xp_round_trip() {
        let v = np("1.234567890123456789");
        let Ok(lifted) = v.to_xp() else {
            panic!("to_xp");
        };
        let Ok(back) = lifted.to_np(Rounding::Down) else {
            panic!("to_np");
        };
        assert_eq!(back, v);
    }

    #[test]
    fn div_xp_of_zero_is_zero() {
        let Ok(q) = Fixed::<Xp>::zero().div_xp(&xp("3")) else {
            panic!("div_xp");
        };
        assert!(q.is_zero());
    }
}
