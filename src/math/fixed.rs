//! Scaled-integer decimal type with explicit rounding.
//!
//! [`Fixed<S>`] stores a signed big integer `raw` and represents the value
//! `raw / 10^S::DECIMALS`.  Every multiply and divide names its rounding
//! direction; there is no implicit rounding anywhere in the type.
//!
//! For bounded scales ([`Np`](super::Np), [`Xp`](super::Xp)) every result
//! must fit in a signed 256-bit integer, otherwise the operation fails with
//! [`ClpError::ArithmeticOverflow`].  [`Wide`](super::Wide) is unbounded and
//! exists for reference computations.
//!
//! # Mixed-scale products
//!
//! [`Fixed::mul_by`] and [`Fixed::div_by`] take a factor of any scale and
//! keep the scale of `self`:
//!
//! ```text
//! Xp.mul_by(Np)  ->  raw_xp · raw_np / 10^18   (Xp result)
//! Np.div_by(Xp)  ->  raw_np · 10^38 / raw_xp   (Np result)
//! ```
//!
//! The `Xp × Np → Np` product with 10^19-split precision lives in
//! [`xp`](super::xp) as a distinct operation.

use core::fmt;
use core::marker::PhantomData;
use core::ops::Neg;
use core::str::FromStr;

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::precision::{fits_i256, pow10, Scale};
use super::rounding::div_round;
use crate::domain::Rounding;
use crate::error::ClpError;

/// Signed fixed-point decimal at scale `S`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Fixed<S: Scale> {
    raw: BigInt,
    scale: PhantomData<S>,
}

impl<S: Scale> Fixed<S> {
    // -- Construction -------------------------------------------------------

    /// Wraps a raw scaled integer without range checks.
    #[must_use]
    pub fn from_raw(raw: impl Into<BigInt>) -> Self {
        Self {
            raw: raw.into(),
            scale: PhantomData,
        }
    }

    /// Wraps a raw scaled integer, enforcing the scale's range.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] tagged with `op` if the
    /// value does not fit a bounded scale.
    pub fn try_from_raw(raw: BigInt, op: &'static str) -> Result<Self, ClpError> {
        if S::BOUNDED && !fits_i256(&raw) {
            return Err(ClpError::ArithmeticOverflow(op));
        }
        Ok(Self::from_raw(raw))
    }

    /// Builds the value `units` (an integer number of whole units).
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the scaled value does
    /// not fit.
    pub fn from_integer(units: impl Into<BigInt>) -> Result<Self, ClpError> {
        Self::try_from_raw(units.into() * S::one(), "from_integer")
    }

    /// Additive identity.
    #[must_use]
    pub fn zero() -> Self {
        Self::from_raw(BigInt::zero())
    }

    /// Multiplicative identity.
    #[must_use]
    pub fn one() -> Self {
        Self::from_raw(S::one().clone())
    }

    /// Smallest positive value (one raw unit).
    #[must_use]
    pub fn ulp() -> Self {
        Self::from_raw(BigInt::one())
    }

    // -- Accessors ----------------------------------------------------------

    /// The raw scaled integer.
    #[must_use]
    pub const fn raw(&self) -> &BigInt {
        &self.raw
    }

    /// Consumes the value and returns the raw scaled integer.
    #[must_use]
    pub fn into_raw(self) -> BigInt {
        self.raw
    }

    /// Returns `true` if the value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Returns `true` if the value is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.raw.is_positive()
    }

    /// Returns `true` if the value is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.raw.is_negative()
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self::from_raw(self.raw.abs())
    }

    /// Lossy conversion for diagnostics and tests.
    #[must_use]
    pub fn to_f64_lossy(&self) -> f64 {
        let int = &self.raw / S::one();
        let frac = &self.raw - &int * S::one();
        let int_f = int.to_f64().unwrap_or(f64::NAN);
        let frac_f = frac.to_f64().unwrap_or(0.0) / S::one().to_f64().unwrap_or(f64::INFINITY);
        int_f + frac_f
    }

    // -- Additive -----------------------------------------------------------

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the sum leaves the range.
    pub fn checked_add(&self, other: &Self) -> Result<Self, ClpError> {
        Self::try_from_raw(&self.raw + &other.raw, "add")
    }

    /// Checked subtraction (result may be negative).
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the difference leaves
    /// the range.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, ClpError> {
        Self::try_from_raw(&self.raw - &other.raw, "sub")
    }

    /// Adds `other` to the magnitude of `self`: `self + other` when `self`
    /// is positive, `self - other` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the result leaves the
    /// range.
    pub fn add_mag(&self, other: &Self) -> Result<Self, ClpError> {
        if self.is_positive() {
            self.checked_add(other)
        } else {
            self.checked_sub(other)
        }
    }

    // -- Multiplicative -----------------------------------------------------

    /// `self · factor`, keeping the scale of `self`, rounded by magnitude.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the result leaves the
    /// range.
    pub fn mul_by<T: Scale>(
        &self,
        factor: &Fixed<T>,
        rounding: Rounding,
    ) -> Result<Self, ClpError> {
        let product = &self.raw * &factor.raw;
        let raw = div_round(&product, T::one(), rounding)
            .ok_or(ClpError::ArithmeticOverflow("mul"))?;
        Self::try_from_raw(raw, "mul")
    }

    /// `self / divisor`, keeping the scale of `self`, rounded by magnitude.
    ///
    /// # Errors
    ///
    /// - [`ClpError::DivisionByZero`] if `divisor` is zero.
    /// - [`ClpError::ArithmeticOverflow`] if the result leaves the range.
    pub fn div_by<T: Scale>(
        &self,
        divisor: &Fixed<T>,
        rounding: Rounding,
    ) -> Result<Self, ClpError> {
        let inflated = &self.raw * T::one();
        let raw = div_round(&inflated, &divisor.raw, rounding).ok_or(ClpError::DivisionByZero)?;
        Self::try_from_raw(raw, "div")
    }

    /// Product rounded toward zero.
    ///
    /// # Errors
    ///
    /// See [`Fixed::mul_by`].
    pub fn mul_down(&self, other: &Self) -> Result<Self, ClpError> {
        self.mul_by(other, Rounding::Down)
    }

    /// Product rounded away from zero.
    ///
    /// # Errors
    ///
    /// See [`Fixed::mul_by`].
    pub fn mul_up(&self, other: &Self) -> Result<Self, ClpError> {
        self.mul_by(other, Rounding::Up)
    }

    /// Quotient rounded toward zero.
    ///
    /// # Errors
    ///
    /// See [`Fixed::div_by`].
    pub fn div_down(&self, other: &Self) -> Result<Self, ClpError> {
        self.div_by(other, Rounding::Down)
    }

    /// Quotient rounded away from zero.
    ///
    /// # Errors
    ///
    /// See [`Fixed::div_by`].
    pub fn div_up(&self, other: &Self) -> Result<Self, ClpError> {
        self.div_by(other, Rounding::Up)
    }

    /// Multiplies by a plain integer (exact).
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the result leaves the
    /// range.
    pub fn mul_int(&self, k: impl Into<BigInt>) -> Result<Self, ClpError> {
        Self::try_from_raw(&self.raw * k.into(), "mul_int")
    }

    /// Divides the raw value by a plain integer, rounded by magnitude.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::DivisionByZero`] if `k` is zero.
    pub fn div_int(&self, k: impl Into<BigInt>, rounding: Rounding) -> Result<Self, ClpError> {
        let raw = div_round(&self.raw, &k.into(), rounding).ok_or(ClpError::DivisionByZero)?;
        Ok(Self::from_raw(raw))
    }

    /// Square root at this scale.
    ///
    /// Normal precision uses the pool square root (seven Newton steps with
    /// a tolerance check); other scales use the exact floor root.
    ///
    /// # Errors
    ///
    /// - [`ClpError::ArithmeticUnderflow`] for negative input.
    /// - [`ClpError::SqrtFailed`] if the pool root fails its check.
    pub fn sqrt(&self) -> Result<Self, ClpError> {
        S::sqrt_raw(&self.raw).map(Self::from_raw)
    }

    /// Re-expresses the value at scale `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if the value does not fit
    /// at the target scale.
    pub fn rescale<T: Scale>(&self, rounding: Rounding) -> Result<Fixed<T>, ClpError> {
        if T::DECIMALS >= S::DECIMALS {
            let factor = pow10(T::DECIMALS - S::DECIMALS);
            Fixed::<T>::try_from_raw(&self.raw * factor, "rescale")
        } else {
            let factor = pow10(S::DECIMALS - T::DECIMALS);
            let raw = div_round(&self.raw, &factor, rounding)
                .ok_or(ClpError::ArithmeticOverflow("rescale"))?;
            Fixed::<T>::try_from_raw(raw, "rescale")
        }
    }
}

impl<S: Scale> Neg for Fixed<S> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_raw(-self.raw)
    }
}

impl<S: Scale> Neg for &Fixed<S> {
    type Output = Fixed<S>;

    fn neg(self) -> Fixed<S> {
        Fixed::from_raw(-&self.raw)
    }
}

// ---------------------------------------------------------------------------
// Decimal string I/O
// ---------------------------------------------------------------------------

impl<S: Scale> FromStr for Fixed<S> {
    type Err = ClpError;

    /// Parses `[-]digits[.digits][e[-]digits]`; digits past the scale are
    /// truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const MALFORMED: ClpError = ClpError::ParameterValidation("malformed decimal string");
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (mantissa, exponent) = match body.split_once(['e', 'E']) {
            Some((m, e)) => (m, e.parse::<i32>().map_err(|_| MALFORMED)?),
            None => (body, 0),
        };
        if exponent.unsigned_abs() > MAX_EXPONENT {
            return Err(MALFORMED);
        }
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(MALFORMED);
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit() || b == b'_');
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(MALFORMED);
        }
        let (int_part, frac_part) = shift_point(
            int_part.chars().filter(|c| *c != '_').collect(),
            frac_part.chars().filter(|c| *c != '_').collect(),
            exponent,
        );

        let decimals = S::DECIMALS as usize;
        let mut digits = int_part;
        let frac: String = frac_part.chars().take(decimals).collect();
        digits.push_str(&frac);
        digits.extend(core::iter::repeat('0').take(decimals - frac.len()));

        let magnitude = if digits.is_empty() {
            BigInt::zero()
        } else {
            BigInt::parse_bytes(digits.as_bytes(), 10).ok_or(MALFORMED)?
        };
        let raw = if negative { -magnitude } else { magnitude };
        Self::try_from_raw(raw, "parse")
    }
}

/// Largest exponent magnitude accepted by the parser.
const MAX_EXPONENT: u32 = 256;

/// Moves the decimal point of `int.frac` by `exponent` places.
fn shift_point(int: String, frac: String, exponent: i32) -> (String, String) {
    let mut digits = int;
    digits.push_str(&frac);
    let point = (digits.len() - frac.len()) as i64 + i64::from(exponent);
    if point <= 0 {
        let mut shifted: String =
            core::iter::repeat('0').take(point.unsigned_abs() as usize).collect();
        shifted.push_str(&digits);
        (String::new(), shifted)
    } else if point as usize >= digits.len() {
        let pad = point as usize - digits.len();
        digits.extend(core::iter::repeat('0').take(pad));
        (digits, String::new())
    } else {
        let frac = digits.split_off(point as usize);
        (digits, frac)
    }
}

impl<S: Scale> fmt::Display for Fixed<S> {
    /// Plain decimal form with trailing fractional zeros trimmed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.raw.abs();
        let int = &magnitude / S::one();
        let frac = &magnitude - &int * S::one();
        let sign = if self.raw.is_negative() { "-" } else { "" };
        if frac.is_zero() {
            return write!(f, "{sign}{int}");
        }
        let digits = frac.to_string();
        let padding = "0".repeat((S::DECIMALS as usize).saturating_sub(digits.len()));
        write!(f, "{sign}{int}.{padding}{}", digits.trim_end_matches('0'))
    }
}

impl<S: Scale> fmt::Debug for Fixed<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", S::NAME, self)
    }
}

#[cfg(feature = "serde")]
impl<S: Scale> serde::Serialize for Fixed<S> {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de, S: Scale> serde::Deserialize<'de> for Fixed<S> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
