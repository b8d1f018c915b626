//! Virtual offsets, feasibility ceilings and trade solving on the ellipse.
//!
//! Given an invariant bracket `r = (over, under)`, the curve centre sits at
//! the virtual offsets `(a, b)`.  A trade fixes the new balance of one asset
//! and [`solve_quadratic_swap`] returns the balance of the other:
//!
//! ```text
//! calc_y_given_x(x) = solve(λ, x, s, c, r, (a, b), τβ)
//! calc_x_given_y(y) = solve(λ, y, c, s, r, (b, a), (-τα.x, τα.y))
//! ```
//!
//! Offsets and the quadratic round so the solved counter-balance is never
//! below the true curve: the pool never pays out more than the curve allows.

use crate::config::{DerivedEllipseParams, EllipseParams, SwapLimits};
use crate::domain::{Balances, InvariantPair, TokenIndex, Vector2};
use crate::error::ClpError;
use crate::math::{Fixed, Np, Xp};

use super::geometry::EllipseShape;
use super::invariant::MAX_BALANCES;

fn xp_wei(n: u8) -> Fixed<Xp> {
    Fixed::from_raw(n)
}

// -- Offsets and ceilings ---------------------------------------------------

/// Virtual offset of asset 0, rounded up.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn virtual_offset0(
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    let (lambda, c, s) = (params.lambda(), params.c(), params.s());
    let tau_beta = derived.tau_beta();
    let term_xp = tau_beta.x().div_xp(derived.d_sq())?;
    let a = if tau_beta.x().is_positive() {
        r.over().mul_up(lambda)?.mul_up(c)?.mul_up_xp_to_np(&term_xp)?
    } else {
        r.under().mul_down(lambda)?.mul_down(c)?.mul_up_xp_to_np(&term_xp)?
    };
    let term_xp = tau_beta.y().div_xp(derived.d_sq())?;
    a.checked_add(&r.over().mul_up(s)?.mul_up_xp_to_np(&term_xp)?)
}

/// Virtual offset of asset 1, rounded up.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn virtual_offset1(
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    let (lambda, c, s) = (params.lambda(), params.c(), params.s());
    let tau_alpha = derived.tau_alpha();
    let term_xp = tau_alpha.x().div_xp(derived.d_sq())?;
    let b = if tau_alpha.x().is_negative() {
        r.over().mul_up(lambda)?.mul_up(s)?.mul_up_xp_to_np(&-term_xp)?
    } else {
        (-r.under()).mul_down(lambda)?.mul_down(s)?.mul_up_xp_to_np(&term_xp)?
    };
    let term_xp = tau_alpha.y().div_xp(derived.d_sq())?;
    b.checked_add(&r.over().mul_up(c)?.mul_up_xp_to_np(&term_xp)?)
}

/// Largest balance of asset 0 on the curve, rounded down.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn max_balances0(
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    let (lambda, c, s) = (params.lambda(), params.c(), params.s());
    let (ta, tb) = (derived.tau_alpha(), derived.tau_beta());
    let term_xp1 = tb.x().checked_sub(ta.x())?.div_xp(derived.d_sq())?;
    let term_xp2 = tb.y().checked_sub(ta.y())?.div_xp(derived.d_sq())?;
    let xp = r.under().mul_down(lambda)?.mul_down(c)?.mul_down_xp_to_np(&term_xp1)?;
    let term_np = if term_xp2.is_positive() {
        r.under().mul_down(s)?
    } else {
        r.over().mul_up(s)?
    };
    xp.checked_add(&term_np.mul_down_xp_to_np(&term_xp2)?)
}

/// Largest balance of asset 1 on the curve, rounded down.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn max_balances1(
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    let (lambda, c, s) = (params.lambda(), params.c(), params.s());
    let (ta, tb) = (derived.tau_alpha(), derived.tau_beta());
    let term_xp1 = tb.x().checked_sub(ta.x())?.div_xp(derived.d_sq())?;
    let term_xp2 = ta.y().checked_sub(tb.y())?.div_xp(derived.d_sq())?;
    let yp = r.under().mul_down(lambda)?.mul_down(s)?.mul_down_xp_to_np(&term_xp1)?;
    let term_np = if term_xp2.is_positive() {
        r.under().mul_down(c)?
    } else {
        r.over().mul_up(c)?
    };
    yp.checked_add(&term_np.mul_down_xp_to_np(&term_xp2)?)
}

/// Ceiling for `token` (asset 0 or 1).
///
/// # Errors
///
/// Returns [`ClpError::InvalidBalances`] for [`TokenIndex::Third`].
pub fn max_balance(
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
    token: TokenIndex,
) -> Result<Fixed<Np>, ClpError> {
    match token {
        TokenIndex::First => max_balances0(params, derived, r),
        TokenIndex::Second => max_balances1(params, derived, r),
        TokenIndex::Third => Err(ClpError::InvalidBalances("ellipse curves trade two assets")),
    }
}

/// Rejects a new balance above the global cap or the curve ceiling.
///
/// # Errors
///
/// Returns [`ClpError::AssetBoundsExceeded`] when out of bounds.
pub fn check_asset_bounds(
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
    new_balance: &Fixed<Np>,
    token: TokenIndex,
) -> Result<(), ClpError> {
    if new_balance > &*MAX_BALANCES {
        return Err(ClpError::AssetBoundsExceeded("balance above global cap"));
    }
    if new_balance > &max_balance(params, derived, r, token)? {
        return Err(ClpError::AssetBoundsExceeded("balance above curve ceiling"));
    }
    Ok(())
}

// -- Quadratic --------------------------------------------------------------

/// `(x' - a)² / λ²`-type cross term of the swap quadratic, rounded up.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
#[allow(clippy::too_many_arguments)]
pub fn calc_xp_xp_div_lambda_lambda(
    x: &Fixed<Np>,
    r: &InvariantPair,
    lambda: &Fixed<Np>,
    s: &Fixed<Np>,
    c: &Fixed<Np>,
    tau_beta: &Vector2<Xp>,
    d_sq: &Fixed<Xp>,
) -> Result<Fixed<Np>, ClpError> {
    let (r0, r1) = (r.over(), r.under());
    let (two_s, two_c) = (s.mul_int(2)?, c.mul_int(2)?);
    let d_sq2 = d_sq.mul_xp(d_sq)?;

    let term_xp = tau_beta.x().mul_xp(tau_beta.x())?.div_xp(&d_sq2)?.checked_add(&xp_wei(7))?;
    let val = r0.mul_up(r0)?.mul_up(c)?.mul_up(c)?.mul_up_xp_to_np(&term_xp)?;

    let term_xp = tau_beta.x().mul_xp(tau_beta.y())?.div_xp(&d_sq2)?;
    let mut q_a = if term_xp.is_positive() {
        r0.mul_up(r0)?
            .mul_up(&two_s)?
            .mul_up(c)?
            .mul_up_xp_to_np(&term_xp.checked_add(&xp_wei(7))?)?
    } else {
        r1.mul_down(r1)?.mul_down(&two_s)?.mul_down(c)?.mul_up_xp_to_np(&term_xp)?
    };

    let term_xp = tau_beta.x().div_xp(d_sq)?;
    let q_b = if tau_beta.x().is_negative() {
        r0.mul_up(x)?
            .mul_up(&two_c)?
            .mul_up_xp_to_np(&(-term_xp).checked_add(&xp_wei(3))?)?
    } else {
        (-r1).mul_down(x)?.mul_down(&two_c)?.mul_up_xp_to_np(&term_xp)?
    };
    q_a = q_a.checked_add(&q_b)?;

    let term_xp = tau_beta.y().mul_xp(tau_beta.y())?.div_xp(&d_sq2)?.checked_add(&xp_wei(7))?;
    let q_b = r0.mul_up(r0)?.mul_up(s)?.mul_up(s)?.mul_up_xp_to_np(&term_xp)?;
    let q_c = (-r1)
        .mul_down(x)?
        .mul_down(&two_s)?
        .mul_up_xp_to_np(&tau_beta.y().div_xp(d_sq)?)?;
    let q_b = q_b.checked_add(&q_c)?.checked_add(&x.mul_up(x)?)?;
    let q_b = if q_b.is_positive() { q_b.div_up(lambda)? } else { q_b.div_down(lambda)? };

    let q_a = q_a.checked_add(&q_b)?;
    let q_a = if q_a.is_positive() { q_a.div_up(lambda)? } else { q_a.div_down(lambda)? };
    val.checked_add(&q_a)
}

/// Solves the ellipse for the counter-balance given one balance.
///
/// `ab` holds the offsets ordered as `(offset of x, offset of y)`.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`], [`ClpError::DivisionByZero`]
/// or [`ClpError::SqrtFailed`].
#[allow(clippy::too_many_arguments)]
pub fn solve_quadratic_swap(
    lambda: &Fixed<Np>,
    x: &Fixed<Np>,
    s: &Fixed<Np>,
    c: &Fixed<Np>,
    r: &InvariantPair,
    ab: &Vector2<Np>,
    tau_beta: &Vector2<Xp>,
    d_sq: &Fixed<Xp>,
) -> Result<Fixed<Np>, ClpError> {
    let one = Fixed::<Xp>::one();
    let lam2 = lambda.to_xp()?;
    let lam_bar0 = one.checked_sub(&one.div_xp(&lam2)?.div_xp(&lam2)?)?;
    let lam_bar1 = one.checked_sub(&one.div_up(&lam2)?.div_up(&lam2)?)?;

    let xp = x.checked_sub(ab.x())?;
    let qb = if xp.is_positive() {
        (-&xp).mul_down(s)?.mul_down(c)?.mul_up_xp_to_np(&lam_bar1.div_xp(d_sq)?)?
    } else {
        (-xp.mul_up(s)?.mul_up(c)?)
            .mul_up_xp_to_np(&lam_bar0.div_xp(d_sq)?.checked_add(&xp_wei(1))?)?
    };

    let s2 = s.to_xp()?;
    let s_term0 = one.checked_sub(&lam_bar1.mul_xp(&s2)?.mul_xp(&s2)?.div_xp(d_sq)?)?;
    let s_term1 = one
        .checked_sub(
            &lam_bar0
                .mul_up(&s2)?
                .mul_up(&s2)?
                .div_xp(&d_sq.checked_add(&xp_wei(1))?)?,
        )?
        .checked_sub(&xp_wei(1))?;

    let r1 = r.under();
    let qc = (-calc_xp_xp_div_lambda_lambda(x, r, lambda, s, c, tau_beta, d_sq)?)
        .checked_add(&r1.mul_down(r1)?.mul_down_xp_to_np(&s_term1)?)?;
    let qc = if qc.is_negative() { Fixed::zero() } else { qc };
    let qc = qc.sqrt()?;

    let diff = qb.checked_sub(&qc)?;
    let qa = if diff.is_positive() {
        diff.mul_up_xp_to_np(&one.div_xp(&s_term1)?.checked_add(&xp_wei(1))?)?
    } else {
        diff.mul_up_xp_to_np(&one.div_xp(&s_term0)?)?
    };
    qa.checked_add(ab.y())
}

fn offsets(
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
) -> Result<(Fixed<Np>, Fixed<Np>), ClpError> {
    Ok((virtual_offset0(params, derived, r)?, virtual_offset1(params, derived, r)?))
}

/// Balance of asset 1 on the curve when asset 0 holds `x`.
///
/// # Errors
///
/// See [`solve_quadratic_swap`].
pub fn calc_y_given_x(
    x: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    let (a, b) = offsets(params, derived, r)?;
    solve_quadratic_swap(
        params.lambda(),
        x,
        params.s(),
        params.c(),
        r,
        &Vector2::new(a, b),
        derived.tau_beta(),
        derived.d_sq(),
    )
}

/// Balance of asset 0 on the curve when asset 1 holds `y`.
///
/// # Errors
///
/// See [`solve_quadratic_swap`].
pub fn calc_x_given_y(
    y: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    let (a, b) = offsets(params, derived, r)?;
    let tau_alpha = derived.tau_alpha();
    let mirrored = Vector2::new(-tau_alpha.x(), tau_alpha.y().clone());
    solve_quadratic_swap(
        params.lambda(),
        y,
        params.c(),
        params.s(),
        r,
        &Vector2::new(b, a),
        &mirrored,
        derived.d_sq(),
    )
}

fn calc_given(
    asset_in_is_first: bool,
    balance: &Fixed<Np>,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    if asset_in_is_first {
        calc_y_given_x(balance, params, derived, r)
    } else {
        calc_x_given_y(balance, params, derived, r)
    }
}

// -- Trades -----------------------------------------------------------------

/// Amount out for `amount_in`, rounded down.
///
/// # Errors
///
/// - [`ClpError::RatioLimitExceeded`] if either side is over its limit.
/// - [`ClpError::AssetBoundsExceeded`] if the new input balance is past
///   the ceiling or the solved balance is negative.
/// - [`ClpError::ArithmeticUnderflow`] if the output balance would grow.
#[allow(clippy::too_many_arguments)]
pub fn calc_out_given_in(
    balances: &Balances,
    amount_in: &Fixed<Np>,
    asset_in_is_first: bool,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
    limits: &SwapLimits,
) -> Result<Fixed<Np>, ClpError> {
    balances.expect_len(2)?;
    let (token_in, token_out) = TokenIndex::from_asset_in_is_first(asset_in_is_first);
    let (bal_in, bal_out) = (balances.get(token_in)?, balances.get(token_out)?);
    limits.check_in(token_in, amount_in, bal_in)?;

    let bal_in_new = bal_in.checked_add(amount_in)?;
    check_asset_bounds(params, derived, r, &bal_in_new, token_in)?;
    let bal_out_new = calc_given(asset_in_is_first, &bal_in_new, params, derived, r)?;
    if bal_out_new.is_negative() {
        return Err(ClpError::AssetBoundsExceeded("solved balance negative"));
    }
    let amount_out = bal_out.checked_sub(&bal_out_new)?;
    if amount_out.is_negative() {
        return Err(ClpError::ArithmeticUnderflow("amount out"));
    }
    limits.check_out(token_out, &amount_out, bal_out)?;
    Ok(amount_out)
}

/// Amount in for `amount_out`, rounded up.
///
/// # Errors
///
/// Same as [`calc_out_given_in`].
#[allow(clippy::too_many_arguments)]
pub fn calc_in_given_out(
    balances: &Balances,
    amount_out: &Fixed<Np>,
    asset_in_is_first: bool,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
    limits: &SwapLimits,
) -> Result<Fixed<Np>, ClpError> {
    balances.expect_len(2)?;
    let (token_in, token_out) = TokenIndex::from_asset_in_is_first(asset_in_is_first);
    let (bal_in, bal_out) = (balances.get(token_in)?, balances.get(token_out)?);
    limits.check_out(token_out, amount_out, bal_out)?;

    let bal_out_new = bal_out.checked_sub(amount_out)?;
    if bal_out_new.is_negative() {
        return Err(ClpError::ArithmeticUnderflow("balance out"));
    }
    let bal_in_new = calc_given(!asset_in_is_first, &bal_out_new, params, derived, r)?;
    check_asset_bounds(params, derived, r, &bal_in_new, token_in)?;
    let amount_in = bal_in_new.checked_sub(bal_in)?;
    if amount_in.is_negative() {
        return Err(ClpError::ArithmeticUnderflow("amount in"));
    }
    limits.check_in(token_in, &amount_in, bal_in)?;
    Ok(amount_in)
}

/// Marginal price of asset 0 in units of asset 1 at the current state,
/// taken at the point estimate `r.under()`.
///
/// # Errors
///
/// Returns [`ClpError::DivisionByZero`] at a degenerate state.
pub fn calc_spot_price0in1(
    balances: &Balances,
    params: &EllipseParams,
    derived: &DerivedEllipseParams,
    r: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    balances.expect_len(2)?;
    let point = InvariantPair::exact(r.under().clone())?;
    let (a, b) = offsets(params, derived, &point)?;
    let shifted = Vector2::new(
        balances.get(TokenIndex::First)?.checked_sub(&a)?,
        balances.get(TokenIndex::Second)?.checked_sub(&b)?,
    );
    let shape = EllipseShape::<Np>::from_params(params)?;
    let image = shape.mul_a(&shifted)?;
    let pxc = image.x().div_down(image.y())?;
    shape.price_from_circle(&pxc)
}
