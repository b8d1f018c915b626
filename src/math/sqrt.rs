//! Pool square root at normal precision.
//!
//! Seven Newton steps from a power-of-two (or tabulated, below `1.0`)
//! initial guess, followed by a self-check that the squared result lies
//! within `tolerance · guess` wei of the input.  A root that fails the
//! check is reported as [`ClpError::SqrtFailed`].

use std::sync::LazyLock;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use super::precision::pow10;
use crate::error::ClpError;

/// Default tolerance, in wei, for the pool square root self-check.
pub const DEFAULT_SQRT_TOLERANCE: u32 = 5;

const NEWTON_STEPS: usize = 7;

static ONE: LazyLock<BigInt> = LazyLock::new(|| pow10(18));

// (upper bound of x in wei, initial guess in wei) for x < 1e18
const SMALL_GUESSES: [(u64, u64); 17] = [
    (10, 3_162_277_660),
    (100, 10_000_000_000),
    (1_000, 31_622_776_601),
    (10_000, 100_000_000_000),
    (100_000, 316_227_766_016),
    (1_000_000, 1_000_000_000_000),
    (10_000_000, 3_162_277_660_168),
    (100_000_000, 10_000_000_000_000),
    (1_000_000_000, 31_622_776_601_683),
    (10_000_000_000, 100_000_000_000_000),
    (100_000_000_000, 316_227_766_016_837),
    (1_000_000_000_000, 1_000_000_000_000_000),
    (10_000_000_000_000, 3_162_277_660_168_379),
    (100_000_000_000_000, 10_000_000_000_000_000),
    (1_000_000_000_000_000, 31_622_776_601_683_793),
    (10_000_000_000_000_000, 100_000_000_000_000_000),
    (100_000_000_000_000_000, 316_227_766_016_837_933),
];

/// Square root of an 18-decimal raw value, rounded to whatever the
/// Newton schedule lands on and verified to within `tolerance` wei.
///
/// # Errors
///
/// - [`ClpError::ArithmeticUnderflow`] if `x` is negative.
/// - [`ClpError::SqrtFailed`] if the result fails the tolerance check.
pub fn pool_sqrt(x: &BigInt, tolerance: u32) -> Result<BigInt, ClpError> {
    if x.is_zero() {
        return Ok(BigInt::zero());
    }
    if x.is_negative() {
        return Err(ClpError::ArithmeticUnderflow("sqrt of negative value"));
    }

    let scaled = x * &*ONE;
    let mut guess = initial_guess(x);
    for _ in 0..NEWTON_STEPS {
        guess = (&guess + &scaled / &guess) >> 1u32;
    }

    // guess² rounded down versus guess · tolerance rounded up
    let squared = (&guess * &guess) / &*ONE;
    let slack_raw = &guess * BigInt::from(tolerance);
    let slack = if slack_raw.is_zero() {
        BigInt::zero()
    } else {
        (slack_raw - 1) / &*ONE + 1
    };
    if squared > x + &slack || squared < x - &slack {
        return Err(ClpError::SqrtFailed);
    }
    Ok(guess)
}

fn initial_guess(x: &BigInt) -> BigInt {
    if x >= &*ONE {
        let halved = int_log2_halved(x / &*ONE);
        return (BigInt::one() << halved) * &*ONE;
    }
    SMALL_GUESSES
        .iter()
        .find(|(bound, _)| x <= &BigInt::from(*bound))
        .map_or_else(|| x.clone(), |(_, guess)| BigInt::from(*guess))
}

/// `floor(log2(x)) / 2`, rounded the way the halving ladder rounds.
fn int_log2_halved(mut x: BigInt) -> u32 {
    let mut n = 0u32;
    for (shift, add) in [(128u32, 64u32), (64, 32), (32, 16), (16, 8), (8, 4), (4, 2), (2, 1)] {
        if x >= BigInt::one() << shift {
            x >>= shift;
            n += add;
        }
    }
    if x >= BigInt::from(2u8) {
        n += 1;
    }
    n
}
