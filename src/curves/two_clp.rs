//! Two-asset bounded constant-product curve (2CLP).
//!
//! The curve is a constant product on virtual reserves:
//!
//! ```text
//! (x + L/√β) · (y + L·√α) = L²
//! ```
//!
//! which restricts the price of `x` in `y` to `[α, β]`. The invariant is the
//! positive root of
//!
//! ```text
//! a·L² - mb·L - mc = 0
//! a  = 1 - √α/√β
//! mb = y/√β + x·√α
//! mc = x·y
//! ```
//!
//! # Algorithm
//!
//! 1. The quadratic is solved twice, every operation rounded down for the
//!    underestimate and up for the overestimate.
//! 2. `mb²` is expanded from the balances rather than squared, and the pool
//!    square root is widened by its tolerance in the matching direction.
//! 3. Swaps run on [`virtual_offset`](super::virtual_offset) with
//!    `L/√β` for asset 0 and `L·√α` for asset 1.

use crate::config::{SwapLimits, TwoClpConfig, TwoClpParams};
use crate::domain::{Balances, InvariantPair, InvariantWithError, Rounding, TokenIndex};
use crate::error::ClpError;
use crate::math::{Fixed, Np, DEFAULT_SQRT_TOLERANCE};
use crate::traits::{two_asset_direction, FromConfig, InvariantCurve};

use super::virtual_offset;

/// Coefficients of the 2CLP quadratic, all non-negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadraticTerms {
    /// `1 - √α/√β`.
    pub a: Fixed<Np>,
    /// `y/√β + x·√α`.
    pub mb: Fixed<Np>,
    /// `mb²`, expanded term by term.
    pub b_square: Fixed<Np>,
    /// `x·y`.
    pub mc: Fixed<Np>,
}

/// Builds the quadratic for `(x, y)`, rounding every step in `rounding`.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn calculate_quadratic_terms(
    x: &Fixed<Np>,
    y: &Fixed<Np>,
    params: &TwoClpParams,
    rounding: Rounding,
) -> Result<QuadraticTerms, ClpError> {
    let (sqrt_alpha, sqrt_beta) = (params.sqrt_alpha(), params.sqrt_beta());
    let a = Fixed::<Np>::one().checked_sub(&sqrt_alpha.div_by(sqrt_beta, rounding)?)?;
    let mb = y
        .div_by(sqrt_beta, rounding)?
        .checked_add(&x.mul_by(sqrt_alpha, rounding)?)?;
    let mc = x.mul_by(y, rounding)?;

    let xx = x.mul_by(x, rounding)?.mul_by(sqrt_alpha, rounding)?.mul_by(sqrt_alpha, rounding)?;
    let xy = x
        .mul_by(y, rounding)?
        .mul_int(2)?
        .mul_by(sqrt_alpha, rounding)?
        .div_by(sqrt_beta, rounding)?;
    let yy = y
        .mul_by(y, rounding)?
        .div_by(&sqrt_beta.mul_by(sqrt_beta, rounding.reverse())?, rounding)?;
    let b_square = xx.checked_add(&xy)?.checked_add(&yy)?;

    Ok(QuadraticTerms { a, mb, b_square, mc })
}

/// Positive root `(mb + sqrt(mb² + 4·a·mc)) / 2a`, rounded in `rounding`.
///
/// # Errors
///
/// - [`ClpError::SqrtFailed`] if the pool square root fails its check.
/// - [`ClpError::DivisionByZero`] if `a` is zero.
pub fn calculate_quadratic(
    terms: &QuadraticTerms,
    rounding: Rounding,
) -> Result<Fixed<Np>, ClpError> {
    let add_term = terms.mc.mul_by(&terms.a, rounding)?.mul_int(4)?;
    let root = terms.b_square.checked_add(&add_term)?.sqrt()?;
    let slack = Fixed::<Np>::from_raw(DEFAULT_SQRT_TOLERANCE);
    let root = match rounding {
        Rounding::Up => root.checked_add(&slack)?,
        Rounding::Down if root > slack => root.checked_sub(&slack)?,
        Rounding::Down => Fixed::zero(),
    };
    terms
        .mb
        .checked_add(&root)?
        .div_by(&terms.a.mul_int(2)?, rounding)
}

/// Invariant underestimate and the width of the bracket above it.
///
/// # Errors
///
/// Returns [`ClpError::InvalidBalances`] for anything but two balances,
/// plus any arithmetic failure.
pub fn calculate_invariant_with_error(
    balances: &Balances,
    params: &TwoClpParams,
) -> Result<InvariantWithError, ClpError> {
    balances.expect_len(2)?;
    let (x, y) = (balances.get(TokenIndex::First)?, balances.get(TokenIndex::Second)?);
    let under = calculate_quadratic(
        &calculate_quadratic_terms(x, y, params, Rounding::Down)?,
        Rounding::Down,
    )?;
    let over = calculate_quadratic(
        &calculate_quadratic_terms(x, y, params, Rounding::Up)?,
        Rounding::Up,
    )?;
    let error = over.checked_sub(&under)?;
    Ok(InvariantWithError::new(under, error))
}

/// The `(over, under)` bracket.
///
/// # Errors
///
/// Same as [`calculate_invariant_with_error`].
pub fn invariant_pair(
    balances: &Balances,
    params: &TwoClpParams,
) -> Result<InvariantPair, ClpError> {
    let estimate = calculate_invariant_with_error(balances, params)?;
    InvariantPair::new(
        estimate.invariant().checked_add(estimate.error())?,
        estimate.invariant().clone(),
    )
}

/// Virtual reserve added to asset 0: `L / √β`.
///
/// # Errors
///
/// Returns [`ClpError::DivisionByZero`] on a zero bound.
pub fn virtual_parameter0(
    invariant: &Fixed<Np>,
    sqrt_beta: &Fixed<Np>,
    rounding: Rounding,
) -> Result<Fixed<Np>, ClpError> {
    invariant.div_by(sqrt_beta, rounding)
}

/// Virtual reserve added to asset 1: `L · √α`.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn virtual_parameter1(
    invariant: &Fixed<Np>,
    sqrt_alpha: &Fixed<Np>,
    rounding: Rounding,
) -> Result<Fixed<Np>, ClpError> {
    invariant.mul_by(sqrt_alpha, rounding)
}

fn offset(
    token: TokenIndex,
    invariant: &Fixed<Np>,
    params: &TwoClpParams,
    rounding: Rounding,
) -> Result<Fixed<Np>, ClpError> {
    match token {
        TokenIndex::First => virtual_parameter0(invariant, params.sqrt_beta(), rounding),
        _ => virtual_parameter1(invariant, params.sqrt_alpha(), rounding),
    }
}

fn offsets(
    asset_in_is_first: bool,
    params: &TwoClpParams,
    r: &InvariantPair,
) -> Result<(TokenIndex, TokenIndex, Fixed<Np>, Fixed<Np>), ClpError> {
    let (token_in, token_out) = TokenIndex::from_asset_in_is_first(asset_in_is_first);
    let offset_in = offset(token_in, r.over(), params, Rounding::Up)?;
    let offset_out = offset(token_out, r.under(), params, Rounding::Down)?;
    Ok((token_in, token_out, offset_in, offset_out))
}

/// Amount out for `amount_in`, rounded down.
///
/// # Errors
///
/// - [`ClpError::RatioLimitExceeded`] if `amount_in` is over the limit.
/// - [`ClpError::AssetBoundsExceeded`] if the pool cannot pay out.
pub fn calc_out_given_in(
    balances: &Balances,
    amount_in: &Fixed<Np>,
    asset_in_is_first: bool,
    params: &TwoClpParams,
    r: &InvariantPair,
    limits: &SwapLimits,
) -> Result<Fixed<Np>, ClpError> {
    balances.expect_len(2)?;
    let (token_in, token_out, offset_in, offset_out) = offsets(asset_in_is_first, params, r)?;
    let (bal_in, bal_out) = (balances.get(token_in)?, balances.get(token_out)?);
    limits.check_in(token_in, amount_in, bal_in)?;
    virtual_offset::calc_out_given_in(bal_in, bal_out, amount_in, &offset_in, &offset_out)
}

/// Amount in for `amount_out`, rounded up.
///
/// # Errors
///
/// - [`ClpError::RatioLimitExceeded`] if `amount_out` is over the limit.
/// - [`ClpError::AssetBoundsExceeded`] if `amount_out` exceeds the
///   balance.
pub fn calc_in_given_out(
    balances: &Balances,
    amount_out: &Fixed<Np>,
    asset_in_is_first: bool,
    params: &TwoClpParams,
    r: &InvariantPair,
    limits: &SwapLimits,
) -> Result<Fixed<Np>, ClpError> {
    balances.expect_len(2)?;
    let (token_in, token_out, offset_in, offset_out) = offsets(asset_in_is_first, params, r)?;
    let (bal_in, bal_out) = (balances.get(token_in)?, balances.get(token_out)?);
    limits.check_out(token_out, amount_out, bal_out)?;
    virtual_offset::calc_in_given_out(bal_in, bal_out, amount_out, &offset_in, &offset_out)
}

/// Largest balance of each asset the curve can hold at `r.under()`,
/// reached when the other asset is drained.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn max_balances(
    params: &TwoClpParams,
    r: &InvariantPair,
) -> Result<(Fixed<Np>, Fixed<Np>), ClpError> {
    let l = r.under();
    let (sqrt_alpha, sqrt_beta) = (params.sqrt_alpha(), params.sqrt_beta());
    let x = l.div_down(sqrt_alpha)?.checked_sub(&l.div_up(sqrt_beta)?)?;
    let y = l.mul_down(sqrt_beta)?.checked_sub(&l.mul_up(sqrt_alpha)?)?;
    Ok((x, y))
}

/// `L / (x + L/√β)`, the square root of the current price.
///
/// # Errors
///
/// Returns [`ClpError::DivisionByZero`] when the virtual reserve is zero.
pub fn calculate_sqrt_price(
    invariant: &Fixed<Np>,
    virtual_x: &Fixed<Np>,
    rounding: Rounding,
) -> Result<Fixed<Np>, ClpError> {
    invariant.div_by(virtual_x, rounding)
}

/// Price of asset 0 in asset 1: `(y + L·√α) / (x + L/√β)` at `r.under()`.
///
/// # Errors
///
/// Returns [`ClpError::DivisionByZero`] at a degenerate state.
pub fn calc_spot_price0in1(
    balances: &Balances,
    params: &TwoClpParams,
    r: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    let (virtual_x, virtual_y) = virtual_reserves(balances, params, r)?;
    virtual_y.div_down(&virtual_x)
}

fn virtual_reserves(
    balances: &Balances,
    params: &TwoClpParams,
    r: &InvariantPair,
) -> Result<(Fixed<Np>, Fixed<Np>), ClpError> {
    balances.expect_len(2)?;
    let l = r.under();
    Ok((
        balances
            .get(TokenIndex::First)?
            .checked_add(&virtual_parameter0(l, params.sqrt_beta(), Rounding::Down)?)?,
        balances
            .get(TokenIndex::Second)?
            .checked_add(&virtual_parameter1(l, params.sqrt_alpha(), Rounding::Down)?)?,
    ))
}

// ---------------------------------------------------------------------------

/// A 2CLP curve.
///
/// Created from a [`TwoClpConfig`] via [`FromConfig`].
///
/// # Example
///
/// ```
/// use clp_math::config::TwoClpConfig;
/// use clp_math::curves::TwoClpCurve;
/// use clp_math::domain::{Balances, TokenIndex};
/// use clp_math::traits::{FromConfig, InvariantCurve};
///
/// let sqrt_alpha = "0.97".parse().expect("decimal");
/// let sqrt_beta = "1.02".parse().expect("decimal");
/// let config = TwoClpConfig::from_bounds(sqrt_alpha, sqrt_beta).expect("valid bounds");
/// let curve = TwoClpCurve::from_config(&config).expect("valid config");
/// let balances = Balances::from_decimals(&["100", "200"]).expect("balances");
/// let pair = curve.invariant_pair(&balances).expect("invariant");
/// let amount_in = "10".parse().expect("decimal");
/// let out = curve
///     .calc_out_given_in(&balances, TokenIndex::First, TokenIndex::Second, &amount_in, &pair)
///     .expect("swap");
/// assert!(out.to_string().starts_with("10.04"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoClpCurve {
    config: TwoClpConfig,
}

impl TwoClpCurve {
    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &TwoClpConfig {
        &self.config
    }
}

impl FromConfig<TwoClpConfig> for TwoClpCurve {
    fn from_config(config: &TwoClpConfig) -> Result<Self, ClpError> {
        config.validate()?;
        tracing::debug!(
            sqrt_alpha = %config.params().sqrt_alpha(),
            sqrt_beta = %config.params().sqrt_beta(),
            "created 2CLP curve"
        );
        Ok(Self {
            config: config.clone(),
        })
    }
}

impl InvariantCurve for TwoClpCurve {
    fn num_tokens(&self) -> usize {
        2
    }

    fn swap_limits(&self) -> &SwapLimits {
        self.config.limits()
    }

    fn calculate_invariant_with_error(
        &self,
        balances: &Balances,
    ) -> Result<InvariantWithError, ClpError> {
        calculate_invariant_with_error(balances, self.config.params())
    }

    fn invariant_pair(&self, balances: &Balances) -> Result<InvariantPair, ClpError> {
        invariant_pair(balances, self.config.params())
    }

    fn calc_out_given_in(
        &self,
        balances: &Balances,
        token_in: TokenIndex,
        token_out: TokenIndex,
        amount_in: &Fixed<Np>,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        calc_out_given_in(
            balances,
            amount_in,
            two_asset_direction(token_in, token_out)?,
            self.config.params(),
            invariant,
            self.config.limits(),
        )
    }

    fn calc_in_given_out(
        &self,
        balances: &Balances,
        token_in: TokenIndex,
        token_out: TokenIndex,
        amount_out: &Fixed<Np>,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        calc_in_given_out(
            balances,
            amount_out,
            two_asset_direction(token_in, token_out)?,
            self.config.params(),
            invariant,
            self.config.limits(),
        )
    }

    fn max_balance(
        &self,
        token: TokenIndex,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        let (x, y) = max_balances(self.config.params(), invariant)?;
        match token {
            TokenIndex::First => Ok(x),
            TokenIndex::Second => Ok(y),
            TokenIndex::Third => Err(ClpError::InvalidBalances("two-asset curve has no asset 2")),
        }
    }

    fn spot_price(
        &self,
        balances: &Balances,
        base: TokenIndex,
        quote: TokenIndex,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        let (virtual_x, virtual_y) = virtual_reserves(balances, self.config.params(), invariant)?;
        if two_asset_direction(base, quote)? {
            virtual_y.div_down(&virtual_x)
        } else {
            virtual_x.div_down(&virtual_y)
        }
    }
}
