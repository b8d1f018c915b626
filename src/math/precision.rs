//! Decimal scales for the fixed-point backend.
//!
//! The [`Scale`] trait fixes, at compile time, how many decimal places a
//! [`Fixed`](super::Fixed) value carries.  There is no ambient precision
//! state: every value names its scale in its type, and crossing scales is
//! an explicit, named conversion.
//!
//! | Marker | Decimals | Bounded to i256 | Use |
//! |--------|----------|-----------------|-----|
//! | [`Np`] | 18 | yes | public amounts, params, invariants |
//! | [`Xp`] | 38 | yes | derived ellipse params, cross terms |
//! | [`Wide`] | 100 | no | ground-truth reference computations |

use core::fmt::Debug;
use core::hash::Hash;
use std::sync::LazyLock;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::error::ClpError;

static ONE_NP: LazyLock<BigInt> = LazyLock::new(|| pow10(18));
static ONE_XP: LazyLock<BigInt> = LazyLock::new(|| pow10(38));
static ONE_WIDE: LazyLock<BigInt> = LazyLock::new(|| pow10(100));

/// Returns `10^exp` as a [`BigInt`].
#[must_use]
pub fn pow10(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exp as usize)
}

/// Compile-time decimal scale of a fixed-point value.
pub trait Scale: Copy + Debug + Default + PartialEq + Eq + Hash + PartialOrd + Ord + 'static {
    /// Number of decimal places.
    const DECIMALS: u32;

    /// Short display name.
    const NAME: &'static str;

    /// Whether results must fit in a signed 256-bit integer.
    const BOUNDED: bool;

    /// The raw representation of `1.0` (`10^DECIMALS`).
    fn one() -> &'static BigInt;

    /// Square root of a raw value at this scale, rounded down.
    ///
    /// The default is the exact integer square root of `raw · 10^DECIMALS`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticUnderflow`] for negative input.
    fn sqrt_raw(raw: &BigInt) -> Result<BigInt, ClpError> {
        if raw.is_negative() {
            return Err(ClpError::ArithmeticUnderflow("sqrt of negative value"));
        }
        Ok((raw * Self::one()).sqrt())
    }
}

/// Normal precision: 18 decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Np;

/// Extra precision: 38 decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Xp;

/// Reference precision: 100 decimals, unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wide;

impl Scale for Np {
    const DECIMALS: u32 = 18;
    const NAME: &'static str = "Np";
    const BOUNDED: bool = true;

    fn one() -> &'static BigInt {
        &ONE_NP
    }

    /// Uses the pool square root so results match on-chain behavior.
    fn sqrt_raw(raw: &BigInt) -> Result<BigInt, ClpError> {
        super::sqrt::pool_sqrt(raw, super::sqrt::DEFAULT_SQRT_TOLERANCE)
    }
}

impl Scale for Xp {
    const DECIMALS: u32 = 38;
    const NAME: &'static str = "Xp";
    const BOUNDED: bool = true;

    fn one() -> &'static BigInt {
        &ONE_XP
    }
}

impl Scale for Wide {
    const DECIMALS: u32 = 100;
    const NAME: &'static str = "Wide";
    const BOUNDED: bool = false;

    fn one() -> &'static BigInt {
        &ONE_WIDE
    }
}

/// Returns `true` if `raw` fits in a signed 256-bit integer.
pub(crate) fn fits_i256(raw: &BigInt) -> bool {
    static LIMIT: LazyLock<BigInt> = LazyLock::new(|| BigInt::one() << 255u32);
    if raw.is_zero() {
        return true;
    }
    if raw.is_negative() {
        -raw <= *LIMIT
    } else {
        raw < &*LIMIT
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn ones_match_decimals() {
        assert_eq!(*Np::one(), pow10(18));
        assert_eq!(*Xp::one(), pow10(38));
        assert_eq!(*Wide::one(), pow10(100));
    }

    #[test]
    fn i256_limits() {
        let max = (BigInt::one() << 255u32) - 1;
        assert!(fits_i256(&max));
        assert!(!fits_i256(&(&max + 1)));
        assert!(fits_i256(&-(BigInt::one() << 255u32)));
        assert!(!fits_i256(&(-(BigInt::one() << 255u32) - 1)));
    }

    #[test]
    fn wide_sqrt_is_exact_floor() {
        let Ok(root) = Wide::sqrt_raw(&(BigInt::from(2) * Wide::one())) else {
            panic!("sqrt of 2");
        };
        let sq = &root * &root;
        let target = BigInt::from(2) * Wide::one() * Wide::one();
        assert!(sq <= target);
        let next = (&root + 1) * (&root + 1);
        assert!(next > target);
    }

    #[test]
    fn negative_sqrt_rejected() {
        assert!(Xp::sqrt_raw(&BigInt::from(-1)).is_err());
    }
}
