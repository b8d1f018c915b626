//! Checked arithmetic trait for fixed-point values.
//!
//! The [`CheckedArithmetic`] trait gives curve code one vocabulary for
//! fallible arithmetic, returning [`Result<Self, ClpError>`] instead of
//! panicking or silently saturating.  Subtraction is the *non-negative*
//! variant: a negative result is an [`ClpError::ArithmeticUnderflow`],
//! which is what balances, invariants and offsets need.
//!
//! # Examples
//!
//! ```
//! use clp_math::domain::Rounding;
//! use clp_math::math::{CheckedArithmetic, Fixed, Np};
//!
//! let a: Fixed<Np> = "1".parse().expect("decimal");
//! let b: Fixed<Np> = "3".parse().expect("decimal");
//! let third = a.safe_div(&b, Rounding::Up).expect("non-zero divisor");
//! assert_eq!(third.to_string(), "0.333333333333333334");
//! assert!(a.safe_sub(&b).is_err());
//! ```

use super::fixed::Fixed;
use super::precision::Scale;
use crate::domain::Rounding;
use crate::error::ClpError;

/// Fallible arithmetic on non-negative quantities.
///
/// # Contract
///
/// - **No panics**: all error conditions produce `Err`.
/// - **No saturation**: errors propagate instead.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the result leaves the
    /// representable range.
    fn safe_add(&self, other: &Self) -> Result<Self, ClpError>;

    /// Checked subtraction that refuses to go negative.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticUnderflow`] if `other > self`.
    fn safe_sub(&self, other: &Self) -> Result<Self, ClpError>;

    /// Checked multiplication with explicit [`Rounding`].
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the result leaves the
    /// representable range.
    fn safe_mul(&self, other: &Self, rounding: Rounding) -> Result<Self, ClpError>;

    /// Checked division with explicit [`Rounding`].
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::DivisionByZero`] if `other` is zero.
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, ClpError>;
}

impl<S: Scale> CheckedArithmetic for Fixed<S> {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, ClpError> {
        self.checked_add(other)
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, ClpError> {
        if other > self {
            return Err(ClpError::ArithmeticUnderflow("subtraction below zero"));
        }
        self.checked_sub(other)
    }

    #[inline]
    fn safe_mul(&self, other: &Self, rounding: Rounding) -> Result<Self, ClpError> {
        self.mul_by(other, rounding)
    }

    #[inline]
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, ClpError> {
        self.div_by(other, rounding)
    }
}
