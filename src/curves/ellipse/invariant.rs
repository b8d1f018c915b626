//! Invariant of the ellipse curves with a certified error bound.
//!
//! The invariant `r` is the positive root of
//!
//! ```text
//! (AChi·AChi - 1)·r² - 2·(At·AChi)·r + At·At = 0
//! ```
//!
//! where `At = A·(x, y)` and `AChi = A·(A⁻¹x(τβ), A⁻¹y(τα))`.  The square
//! root term `(At·AChi)² - (AChi·AChi - 1)·(At·At)` is expanded into three
//! helpers whose cross terms are evaluated against Xp constants.
//!
//! Two denominators are offered:
//!
//! | Curve | Denominator | Error growth |
//! |-------|-------------|--------------|
//! | CEMM | [`calc_a_chi_a_chi`] at 18 decimals | `err / den` when `den <= 1` |
//! | ECLP | [`calc_a_chi_a_chi_in_xp`] at 38 decimals | `err · (1/den)` plus a `λ²` term |
//!
//! Both results are biased low by the reported error, so the bracket is
//! `(invariant + 2·error, invariant)`.

use std::sync::LazyLock;

use num_bigint::BigInt;

use crate::config::{DerivedEllipseParams, EllipseParams};
use crate::domain::{InvariantWithError, Rounding};
use crate::error::ClpError;
use crate::math::{pow10, Fixed, Np, Xp};

/// Cap on `x + y` for either ellipse family (1e16 tokens).
pub static MAX_BALANCES: LazyLock<Fixed<Np>> = LazyLock::new(|| Fixed::from_raw(pow10(34)));

/// Cap on `invariant + error` (3e19 units).
pub static MAX_INVARIANT: LazyLock<Fixed<Np>> =
    LazyLock::new(|| Fixed::from_raw(BigInt::from(3u8) * pow10(37)));

static SQRT_FALLBACK_ERROR: LazyLock<Fixed<Np>> = LazyLock::new(|| Fixed::from_raw(pow10(9)));

fn xp_wei(n: u8) -> Fixed<Xp> {
    Fixed::from_raw(n)
}

fn np_wei(n: u8) -> Fixed<Np> {
    Fixed::from_raw(n)
}

/// Xp views of the derived constants with `λ` lifted to Xp.
struct CrossTerms<'a> {
    u: &'a Fixed<Xp>,
    v: &'a Fixed<Xp>,
    w: &'a Fixed<Xp>,
    z: &'a Fixed<Xp>,
    d_sq: &'a Fixed<Xp>,
    lambda: Fixed<Xp>,
}

impl<'a> CrossTerms<'a> {
    fn new(params: &EllipseParams, derived: &'a DerivedEllipseParams) -> Result<Self, ClpError> {
        Ok(Self {
            u: derived.u(),
            v: derived.v(),
            w: derived.w(),
            z: derived.z(),
            d_sq: derived.d_sq(),
            lambda: params.lambda().to_xp()?,
        })
    }

    fn d_sq_pow(&self, n: usize) -> Result<Fixed<Xp>, ClpError> {
        let mut acc = self.d_sq.clone();
        for _ in 1..n {
            acc = acc.mul_xp(self.d_sq)?;
        }
        Ok(acc)
    }

    fn over_d_sq_thrice(&self, value: &Fixed<Xp>) -> Result<Fixed<Xp>, ClpError> {
        value.div_xp(self.d_sq)?.div_xp(self.d_sq)?.div_xp(self.d_sq)
    }
}

/// `At · AChi`.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn calc_at_a_chi(
    x: &Fixed<Np>,
    y: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<Fixed<Np>, ClpError> {
    let t = CrossTerms::new(params, derived)?;
    let (c, s, lambda) = (params.c(), params.s(), params.lambda());
    let d_sq2 = t.d_sq_pow(2)?;

    let term_xp = t.w.div_xp(&t.lambda)?.checked_add(t.z)?.div_xp(&t.lambda)?.div_xp(&d_sq2)?;
    let term_np = x.mul_down(c)?.checked_sub(&y.mul_down(s)?)?;
    let mut val = term_np.mul_down_xp_to_np(&term_xp)?;

    let term_np = x
        .mul_down(lambda)?
        .mul_down(s)?
        .checked_add(&y.mul_down(lambda)?.mul_down(c)?)?;
    val = val.checked_add(&term_np.mul_down_xp_to_np(&t.u.div_xp(&d_sq2)?)?)?;

    let term_np = x.mul_down(s)?.checked_add(&y.mul_down(c)?)?;
    val.checked_add(&term_np.mul_down_xp_to_np(&t.v.div_xp(&d_sq2)?)?)
}

/// `AChi · AChi` at 18 decimals, rounded up.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn calc_a_chi_a_chi(
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<Fixed<Np>, ClpError> {
    let t = CrossTerms::new(params, derived)?;
    let lambda = params.lambda();
    let one_wei = np_wei(1);

    let term_xp = t.over_d_sq_thrice(&t.u.mul_int(2)?.mul_xp(t.v)?)?;
    let mut val = lambda.mul_up_xp_to_np(&term_xp)?;

    let u_up = t.u.checked_add(&xp_wei(1))?;
    let term_xp = t.over_d_sq_thrice(&u_up.mul_xp(&u_up)?)?;
    val = val.checked_add(&lambda.mul_up(lambda)?.mul_up_xp_to_np(&term_xp)?)?;

    let term_xp = t.over_d_sq_thrice(&t.v.mul_xp(t.v)?)?.checked_sub(&xp_wei(1))?;
    val = val.checked_add(&term_xp.to_np(Rounding::Down)?)?.checked_add(&one_wei)?;

    let w_z = t.w.div_up(&t.lambda)?.checked_add(t.z)?;
    let term_xp = t.over_d_sq_thrice(&w_z.mul_xp(&w_z)?)?.checked_sub(&xp_wei(1))?;
    val.checked_add(&term_xp.to_np(Rounding::Down)?)?.checked_add(&one_wei)
}

/// `AChi · AChi` kept at 38 decimals, rounded up where it matters.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn calc_a_chi_a_chi_in_xp(
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<Fixed<Xp>, ClpError> {
    let t = CrossTerms::new(params, derived)?;
    let d_sq3 = t.d_sq_pow(3)?;

    let term_xp = t.u.mul_int(2)?.mul_xp(t.v)?.div_xp(&d_sq3)?;
    let mut val = t.lambda.mul_up(&term_xp)?;

    let u_up = t.u.checked_add(&xp_wei(1))?;
    let term_xp = u_up.mul_xp(&u_up)?.div_xp(&d_sq3)?;
    val = val.checked_add(&term_xp.mul_up(&t.lambda)?.mul_up(&t.lambda)?)?;

    val = val.checked_add(&t.v.mul_xp(t.v)?.div_xp(&d_sq3)?)?;

    let w_z = t.w.div_up(&t.lambda)?.checked_add(t.z)?;
    val.checked_add(&w_z.mul_xp(&w_z)?.div_xp(&d_sq3)?)
}

/// `-(At.x · AChi.y)² + (At.x)²`, the first part of the square-root term.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn calc_min_atx_a_chiy_sq_plus_atx_sq(
    x: &Fixed<Np>,
    y: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<Fixed<Np>, ClpError> {
    let t = CrossTerms::new(params, derived)?;
    let (c, s, lambda) = (params.c(), params.s(), params.lambda());

    let term_np = x
        .mul_up(x)?
        .mul_up(c)?
        .mul_up(c)?
        .checked_add(&y.mul_up(y)?.mul_up(s)?.mul_up(s)?)?
        .checked_sub(&x.mul_down(y)?.mul_down(&c.mul_int(2)?)?.mul_down(s)?)?;

    let term_xp = t
        .u
        .mul_xp(t.u)?
        .checked_add(&t.u.mul_int(2)?.mul_xp(t.v)?.div_xp(&t.lambda)?)?
        .checked_add(&t.v.mul_xp(t.v)?.div_xp(&t.lambda)?.div_xp(&t.lambda)?)?
        .div_xp(&t.d_sq_pow(4)?)?;
    let val = (-&term_np).mul_down_xp_to_np(&term_xp)?;

    let term_np = term_np.checked_sub(&np_wei(9))?.div_down(lambda)?.div_down(lambda)?;
    val.checked_add(&term_np.mul_down_xp_to_np(&Fixed::<Xp>::one().div_xp(t.d_sq)?)?)
}

/// `2 · At.x · At.y · AChi.x · AChi.y`, the middle part of the square-root
/// term.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn calc_2_atx_aty_a_chix_a_chiy(
    x: &Fixed<Np>,
    y: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<Fixed<Np>, ClpError> {
    let t = CrossTerms::new(params, derived)?;
    let (c, s) = (params.c(), params.s());

    let xy = y.mul_down(&x.mul_int(2)?)?;
    let term_np = x
        .mul_down(x)?
        .checked_sub(&y.mul_up(y)?)?
        .mul_down(&c.mul_int(2)?)?
        .mul_down(s)?
        .checked_add(&xy.mul_down(c)?.mul_down(c)?)?
        .checked_sub(&xy.mul_down(s)?.mul_down(s)?)?;

    let term_xp = t
        .z
        .mul_xp(t.u)?
        .checked_add(&t.w.mul_xp(t.u)?.checked_add(&t.z.mul_xp(t.v)?)?.div_xp(&t.lambda)?)?
        .checked_add(&t.w.mul_xp(t.v)?.div_xp(&t.lambda)?.div_xp(&t.lambda)?)?
        .div_xp(&t.d_sq_pow(4)?)?;

    term_np.mul_down_xp_to_np(&term_xp)
}

/// `-(At.y · AChi.x)² + (At.y)²`, the last part of the square-root term.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn calc_min_aty_a_chix_sq_plus_aty_sq(
    x: &Fixed<Np>,
    y: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<Fixed<Np>, ClpError> {
    let t = CrossTerms::new(params, derived)?;
    let (c, s) = (params.c(), params.s());

    let term_np = x
        .mul_up(x)?
        .mul_up(s)?
        .mul_up(s)?
        .checked_add(&y.mul_up(y)?.mul_up(c)?.mul_up(c)?)?
        .checked_add(&x.mul_up(y)?.mul_up(&s.mul_int(2)?)?.mul_up(c)?)?;

    let term_xp = t
        .z
        .mul_xp(t.z)?
        .checked_add(&t.w.mul_xp(t.w)?.div_xp(&t.lambda)?.div_xp(&t.lambda)?)?
        .checked_add(&t.z.mul_int(2)?.mul_xp(t.w)?.div_xp(&t.lambda)?)?
        .div_xp(&t.d_sq_pow(4)?)?;
    let val = (-&term_np).mul_down_xp_to_np(&term_xp)?;

    let term_np = term_np.checked_sub(&np_wei(9))?;
    val.checked_add(&term_np.mul_down_xp_to_np(&Fixed::<Xp>::one().div_xp(t.d_sq)?)?)
}

/// Square root of the discriminant term and the error of its argument.
///
/// A negative argument (only possible through rounding) is floored at
/// zero.
///
/// # Errors
///
/// Returns [`ClpError::SqrtFailed`] or [`ClpError::ArithmeticOverflow`].
pub fn calc_invariant_sqrt(
    x: &Fixed<Np>,
    y: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<(Fixed<Np>, Fixed<Np>), ClpError> {
    let val = calc_min_atx_a_chiy_sq_plus_atx_sq(x, y, params, derived)?
        .checked_add(&calc_2_atx_aty_a_chix_a_chiy(x, y, params, derived)?)?
        .checked_add(&calc_min_aty_a_chix_sq_plus_aty_sq(x, y, params, derived)?)?;
    let err = x
        .mul_up(x)?
        .checked_add(&y.mul_up(y)?)?
        .div_int(pow10(38), Rounding::Down)?;
    let val = if val.is_negative() { Fixed::zero() } else { val };
    Ok((val.sqrt()?, err))
}

/// Shared numerator `At·AChi + sqrt - err` and the error before the
/// denominator is applied.
fn numerator_and_error(
    x: &Fixed<Np>,
    y: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<(Fixed<Np>, Fixed<Np>), ClpError> {
    let sum = x.checked_add(y)?;
    if sum > *MAX_BALANCES {
        return Err(ClpError::AssetBoundsExceeded("ellipse balances above cap"));
    }
    let one_wei = np_wei(1);
    let at_a_chi = calc_at_a_chi(x, y, params, derived)?;
    let (sqrt, err) = calc_invariant_sqrt(x, y, params, derived)?;
    let err = if sqrt.is_positive() {
        err.checked_add(&one_wei)?.div_up(&sqrt.mul_int(2)?)?
    } else if err.is_positive() {
        err.sqrt()?
    } else {
        SQRT_FALLBACK_ERROR.clone()
    };
    let err = params
        .lambda()
        .mul_up(&sum)?
        .div_int(pow10(38), Rounding::Down)?
        .checked_add(&err)?
        .checked_add(&one_wei)?
        .mul_int(20)?;
    let numerator = at_a_chi.checked_add(&sqrt)?.checked_sub(&err)?;
    Ok((numerator, err))
}

fn finish(invariant: Fixed<Np>, error: Fixed<Np>) -> Result<InvariantWithError, ClpError> {
    if invariant.is_negative() {
        return Err(ClpError::ArithmeticUnderflow("ellipse invariant"));
    }
    if invariant.checked_add(&error)? > *MAX_INVARIANT {
        return Err(ClpError::AssetBoundsExceeded("ellipse invariant above cap"));
    }
    Ok(InvariantWithError::new(invariant, error))
}

/// ECLP invariant with the certified extra-precision error bound.
///
/// # Errors
///
/// - [`ClpError::IllConditionedCurve`] if `AChi·AChi - 1 <= 0`.
/// - [`ClpError::AssetBoundsExceeded`] if a balance or invariant cap is hit.
/// - [`ClpError::ArithmeticUnderflow`] if the estimate is negative.
pub fn eclp_invariant_with_error(
    x: &Fixed<Np>,
    y: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<InvariantWithError, ClpError> {
    let (numerator, err) = numerator_and_error(x, y, params, derived)?;

    let one = Fixed::<Xp>::one();
    let denominator = calc_a_chi_a_chi_in_xp(params, derived)?.checked_sub(&one)?;
    if !denominator.is_positive() {
        return Err(ClpError::IllConditionedCurve);
    }
    let mul_denominator = one.div_xp(&denominator)?;
    let invariant = numerator.mul_down_xp_to_np(&mul_denominator)?;

    let lambda_sq = params.lambda().mul_down(params.lambda())?.into_raw() / pow10(18);
    let scaled = invariant
        .mul_up_xp_to_np(&mul_denominator)?
        .mul_int(lambda_sq)?
        .mul_int(40)?
        .div_int(pow10(38), Rounding::Down)?;
    let err = err
        .mul_up_xp_to_np(&mul_denominator)?
        .checked_add(&scaled)?
        .checked_add(&np_wei(1))?;
    finish(invariant, err)
}

/// CEMM invariant with the normal-precision denominator.
///
/// # Errors
///
/// Same as [`eclp_invariant_with_error`].
pub fn cemm_invariant_with_error(
    x: &Fixed<Np>,
    y: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
) -> Result<InvariantWithError, ClpError> {
    let (numerator, err) = numerator_and_error(x, y, params, derived)?;

    let one = Fixed::<Np>::one();
    let denominator = calc_a_chi_a_chi(params, derived)?.checked_sub(&one)?;
    if !denominator.is_positive() {
        return Err(ClpError::IllConditionedCurve);
    }
    let invariant = numerator.div_down(&denominator)?;
    let err = if denominator > one { err } else { err.div_up(&denominator)? };
    let err = err.checked_add(
        &invariant
            .mul_int(10)?
            .div_up(&denominator)?
            .div_int(pow10(18), Rounding::Down)?,
    )?;
    finish(invariant, err)
}
