//! Three-asset bounded constant-product curve (3CLP).
//!
//! All three assets share one virtual offset `L·r` with `r = ∛α`:
//!
//! ```text
//! (x + L·r) · (y + L·r) · (z + L·r) = L³
//! ```
//!
//! Expanded in `L` this is the cubic
//!
//! ```text
//! f(L) = a·L³ - mb·L² - mc·L - md
//! a  = 1 - r³                  (kept at 38 decimals)
//! mb = (x + y + z) · r²
//! mc = (xy + yz + zx) · r
//! md = xyz
//! ```
//!
//! # Algorithm
//!
//! 1. Newton's method from `1.5 ×` the analytic local minimum of `f`,
//!    which lies right of the root, so the iteration descends onto it.
//! 2. The loop stops when each balance re-derived from the candidate root
//!    is within tolerance, when the step vanishes or `f` turns negative
//!    after the first step, or when the budget runs out. Every exit yields
//!    a root; only the first is [`NewtonOutcome::Converged`].
//! 3. The bracket is widened by `max(L·1e-14, |last step|)`; the lower end
//!    stays at the root when `f` certifies it as an underestimate.

use std::sync::LazyLock;

use crate::config::{NewtonConfig, SwapLimits, ThreeClpConfig, ThreeClpParams};
use crate::domain::{
    Balances, InvariantPair, InvariantWithError, NewtonOutcome, Rounding, TokenIndex,
};
use crate::error::ClpError;
use crate::math::{Fixed, Np, Xp};
use crate::traits::{FromConfig, InvariantCurve};

use super::virtual_offset;

/// Largest balance of any single asset.
pub static MAX_BALANCE: LazyLock<Fixed<Np>> =
    LazyLock::new(|| Fixed::from_raw(crate::math::pow10(29)));

/// Largest accepted invariant overestimate.
pub static MAX_INVARIANT: LazyLock<Fixed<Np>> =
    LazyLock::new(|| Fixed::from_raw(crate::math::pow10(34)));

// 1e-14 relative widening of the final bracket
const MIN_STEP_RAW: u64 = 10_000;

/// Balance indices with the largest balance first, the other two in
/// the order the solver consumes them.
#[must_use]
pub fn max_other_balances(balances: &[Fixed<Np>; 3]) -> [usize; 3] {
    if balances[0] >= balances[1] {
        if balances[0] >= balances[2] {
            [0, 1, 2]
        } else {
            [2, 0, 1]
        }
    } else if balances[1] >= balances[2] {
        [1, 0, 2]
    } else {
        [2, 1, 0]
    }
}

fn three(balances: &Balances) -> Result<[Fixed<Np>; 3], ClpError> {
    balances.expect_len(3)?;
    Ok([
        balances.get(TokenIndex::First)?.clone(),
        balances.get(TokenIndex::Second)?.clone(),
        balances.get(TokenIndex::Third)?.clone(),
    ])
}

// -- Cubic ------------------------------------------------------------------

/// Coefficients of `a·L³ - mb·L² - mc·L - md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubicTerms {
    /// `1 - r³`, exact at 38 decimals.
    pub a: Fixed<Xp>,
    /// `(x + y + z) · r²`.
    pub mb: Fixed<Np>,
    /// `(xy + yz + zx) · r`.
    pub mc: Fixed<Np>,
    /// `xyz`.
    pub md: Fixed<Np>,
}

impl CubicTerms {
    /// Builds the coefficients, largest balance first.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn new(balances: &[Fixed<Np>; 3], root3_alpha: &Fixed<Np>) -> Result<Self, ClpError> {
        let [i, j, k] = max_other_balances(balances);
        let (x, y, z) = (&balances[i], &balances[j], &balances[k]);

        let r = root3_alpha.to_xp()?;
        let a = Fixed::<Xp>::one().checked_sub(&r.mul_xp(&r)?.mul_xp(&r)?)?;
        let mb = x
            .checked_add(y)?
            .checked_add(z)?
            .mul_down(&root3_alpha.mul_down(root3_alpha)?)?;
        let mc = x
            .mul_down(y)?
            .checked_add(&y.mul_down(z)?)?
            .checked_add(&z.mul_down(x)?)?
            .mul_down(root3_alpha)?;
        let md = x.mul_down(y)?.mul_down(z)?;
        Ok(Self { a, mb, mc, md })
    }

    /// Positive local minimum of `f`: `mb/3a + sqrt(mb² + 3a·mc)/3a`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::DivisionByZero`] if `a` is zero.
    pub fn local_minimum(&self) -> Result<Fixed<Np>, ClpError> {
        let a3 = self.a.mul_int(3)?;
        let radicand = self
            .mb
            .mul_down(&self.mb)?
            .checked_add(&self.mc.mul_by(&a3, Rounding::Down)?)?;
        self.mb
            .div_by(&a3, Rounding::Down)?
            .checked_add(&radicand.sqrt()?.div_by(&a3, Rounding::Down)?)
    }

    /// Newton starting point, `1.5 ×` the local minimum.
    ///
    /// # Errors
    ///
    /// See [`CubicTerms::local_minimum`].
    pub fn starting_point(&self) -> Result<Fixed<Np>, ClpError> {
        self.local_minimum()?.mul_down(&Fixed::from_raw(1_500_000_000_000_000_000u64))
    }

    /// `f(l)`, rounded down term by term.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn value_at(&self, l: &Fixed<Np>) -> Result<Fixed<Np>, ClpError> {
        let l2 = l.mul_down(l)?;
        let l3 = l2.mul_down(l)?;
        l3.mul_by(&self.a, Rounding::Down)?
            .checked_sub(&l2.mul_down(&self.mb)?)?
            .checked_sub(&self.mc.mul_down(l)?)?
            .checked_sub(&self.md)
    }

    /// `f'(l) = 3a·l² - 2mb·l - mc`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn derivative_at(&self, l: &Fixed<Np>) -> Result<Fixed<Np>, ClpError> {
        l.mul_down(l)?
            .mul_int(3)?
            .mul_by(&self.a, Rounding::Down)?
            .checked_sub(&l.mul_down(&self.mb)?.mul_int(2)?)?
            .checked_sub(&self.mc)
    }

    /// `true` if `f(l) <= 0` even with the positive term rounded up, so
    /// `l` is at or below the root.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn is_invariant_underestimated(&self, l: &Fixed<Np>) -> Result<bool, ClpError> {
        let upper = l.mul_up(l)?.mul_up(l)?.mul_by(&self.a, Rounding::Up)?;
        let f = upper
            .checked_sub(&l.mul_down(l)?.mul_down(&self.mb)?)?
            .checked_sub(&l.mul_down(&self.mc)?)?
            .checked_sub(&self.md)?;
        Ok(!f.is_positive())
    }
}

/// Balances re-derived from a candidate invariant `l`, minus the actual
/// balances. All three are zero at the exact root.
///
/// # Errors
///
/// Returns [`ClpError::DivisionByZero`] when `l` and a balance are both
/// zero.
pub fn invariant_errors_in_assets(
    l: &Fixed<Np>,
    balances: &[Fixed<Np>; 3],
    root3_alpha: &Fixed<Np>,
) -> Result<[Fixed<Np>; 3], ClpError> {
    let [x, y, z] = balances;
    let lr = l.mul_down(root3_alpha)?;
    let (vx, vy, vz) = (x.checked_add(&lr)?, y.checked_add(&lr)?, z.checked_add(&lr)?);
    let gamma = l.mul_down(l)?.div_down(&vx.mul_down(&vy)?)?;
    let px = vz.div_down(&vx)?;
    let py = vz.div_down(&vy)?;
    let x1 = l.mul_down(&gamma.div_down(&px)?.checked_sub(root3_alpha)?)?;
    let y1 = l.mul_down(&gamma.div_down(&py)?.checked_sub(root3_alpha)?)?;
    let z1 = l.mul_down(&gamma.checked_sub(root3_alpha)?)?;
    Ok([x1.checked_sub(x)?, y1.checked_sub(y)?, z1.checked_sub(z)?])
}

/// Root returned by [`solve_cubic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubicSolution {
    /// Best root found.
    pub invariant: Fixed<Np>,
    /// Magnitude of the last Newton step taken (zero if none).
    pub last_step: Fixed<Np>,
    /// How the loop terminated.
    pub outcome: NewtonOutcome,
}

impl CubicSolution {
    /// The root, or [`ClpError::NumericalInstability`] unless the loop
    /// converged.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn into_certified(self) -> Result<Fixed<Np>, ClpError> {
        if self.outcome.is_converged() {
            Ok(self.invariant)
        } else {
            Err(ClpError::NumericalInstability {
                iterations: self.outcome.iterations(),
            })
        }
    }
}

/// Newton's method on the 3CLP cubic within the budget of `newton`.
///
/// # Errors
///
/// Arithmetic failures only; non-convergence is reported through
/// [`CubicSolution::outcome`].
pub fn solve_cubic(
    balances: &[Fixed<Np>; 3],
    root3_alpha: &Fixed<Np>,
    newton: &NewtonConfig,
) -> Result<CubicSolution, ClpError> {
    if balances.iter().all(Fixed::is_zero) {
        return Ok(CubicSolution {
            invariant: Fixed::zero(),
            last_step: Fixed::zero(),
            outcome: NewtonOutcome::Converged { iterations: 0 },
        });
    }

    let terms = CubicTerms::new(balances, root3_alpha)?;
    let tolerance = newton.convergence_tolerance();
    let mut l = terms.starting_point()?;
    let mut last_step = Fixed::<Np>::zero();

    for iteration in 0..newton.max_iterations() {
        let f = terms.value_at(&l)?;
        let errors = invariant_errors_in_assets(&l, balances, root3_alpha)?;
        tracing::trace!(iteration, %l, %f, "cubic newton step");

        if errors.iter().all(|e| &e.abs() < tolerance) {
            return Ok(CubicSolution {
                invariant: l,
                last_step,
                outcome: NewtonOutcome::Converged { iterations: iteration },
            });
        }

        let df = terms.derivative_at(&l)?;
        if df.is_zero() {
            return Ok(early_exit(l, last_step, iteration));
        }
        let delta = (-&f).div_down(&df)?;
        if iteration > 0 && (delta.is_zero() || f.is_negative()) {
            return Ok(early_exit(l, delta.abs(), iteration));
        }
        l = l.checked_add(&delta)?;
        last_step = delta.abs();
    }

    tracing::warn!(
        iterations = newton.max_iterations(),
        %l,
        "cubic solver exhausted its budget"
    );
    Ok(CubicSolution {
        invariant: l,
        last_step,
        outcome: NewtonOutcome::BudgetExhausted {
            iterations: newton.max_iterations(),
        },
    })
}

fn early_exit(invariant: Fixed<Np>, last_step: Fixed<Np>, iterations: u32) -> CubicSolution {
    tracing::debug!(iterations, %invariant, "cubic solver stopped at a numerical fixed point");
    CubicSolution {
        invariant,
        last_step,
        outcome: NewtonOutcome::EarlyExit { iterations },
    }
}

/// Conservative bracket around the cubic root and the solver outcome.
///
/// # Errors
///
/// - [`ClpError::InvalidBalances`] for anything but three balances.
/// - [`ClpError::AssetBoundsExceeded`] above the balance or invariant cap.
pub fn invariant_bracket(
    balances: &Balances,
    params: &ThreeClpParams,
    newton: &NewtonConfig,
) -> Result<(InvariantPair, NewtonOutcome), ClpError> {
    let values = three(balances)?;
    if values.iter().any(|b| b > &*MAX_BALANCE) {
        return Err(ClpError::AssetBoundsExceeded("3CLP balance above cap"));
    }
    let root3_alpha = params.root3_alpha();
    let solution = solve_cubic(&values, root3_alpha, newton)?;
    let l = &solution.invariant;

    let min_step = l.mul_up(&Fixed::from_raw(MIN_STEP_RAW))?;
    let step = if solution.last_step > min_step {
        solution.last_step.clone()
    } else {
        min_step
    };
    let over = l.checked_add(&step)?;
    if over > *MAX_INVARIANT {
        return Err(ClpError::AssetBoundsExceeded("3CLP invariant above cap"));
    }
    let under = if CubicTerms::new(&values, root3_alpha)?.is_invariant_underestimated(l)? {
        l.clone()
    } else if l > &step {
        l.checked_sub(&step)?
    } else {
        Fixed::zero()
    };
    Ok((InvariantPair::new(over, under)?, solution.outcome))
}

// -- Trades -----------------------------------------------------------------

fn distinct(token_in: TokenIndex, token_out: TokenIndex) -> Result<(), ClpError> {
    if token_in == token_out {
        return Err(ClpError::InvalidBalances("swap needs two distinct assets"));
    }
    Ok(())
}

fn offsets(root3_alpha: &Fixed<Np>, r: &InvariantPair) -> Result<(Fixed<Np>, Fixed<Np>), ClpError> {
    Ok((r.over().mul_up(root3_alpha)?, r.under().mul_down(root3_alpha)?))
}

/// Amount of `token_out` for `amount_in` of `token_in`, rounded down.
///
/// # Errors
///
/// - [`ClpError::InvalidBalances`] for the same asset on both sides.
/// - [`ClpError::RatioLimitExceeded`] if `amount_in` is over the limit.
/// - [`ClpError::AssetBoundsExceeded`] if the pool cannot pay out.
pub fn calc_out_given_in(
    balances: &Balances,
    token_in: TokenIndex,
    token_out: TokenIndex,
    amount_in: &Fixed<Np>,
    params: &ThreeClpParams,
    r: &InvariantPair,
    limits: &SwapLimits,
) -> Result<Fixed<Np>, ClpError> {
    balances.expect_len(3)?;
    distinct(token_in, token_out)?;
    let (bal_in, bal_out) = (balances.get(token_in)?, balances.get(token_out)?);
    limits.check_in(token_in, amount_in, bal_in)?;
    let (offset_in, offset_out) = offsets(params.root3_alpha(), r)?;
    virtual_offset::calc_out_given_in(bal_in, bal_out, amount_in, &offset_in, &offset_out)
}

/// Amount of `token_in` for `amount_out` of `token_out`, rounded up.
///
/// # Errors
///
/// Same as [`calc_out_given_in`], with the limit applied to `amount_out`.
pub fn calc_in_given_out(
    balances: &Balances,
    token_in: TokenIndex,
    token_out: TokenIndex,
    amount_out: &Fixed<Np>,
    params: &ThreeClpParams,
    r: &InvariantPair,
    limits: &SwapLimits,
) -> Result<Fixed<Np>, ClpError> {
    balances.expect_len(3)?;
    distinct(token_in, token_out)?;
    let (bal_in, bal_out) = (balances.get(token_in)?, balances.get(token_out)?);
    limits.check_out(token_out, amount_out, bal_out)?;
    let (offset_in, offset_out) = offsets(params.root3_alpha(), r)?;
    virtual_offset::calc_in_given_out(bal_in, bal_out, amount_out, &offset_in, &offset_out)
}

// ---------------------------------------------------------------------------

/// A 3CLP curve.
///
/// Created from a [`ThreeClpConfig`] via [`FromConfig`]. The solver budget
/// travels with the config; [`ThreeClpCurve::invariant_with_outcome`]
/// exposes how the last solve terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeClpCurve {
    config: ThreeClpConfig,
}

impl ThreeClpCurve {
    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &ThreeClpConfig {
        &self.config
    }

    /// The invariant bracket together with the solver outcome.
    ///
    /// # Errors
    ///
    /// See [`invariant_bracket`].
    pub fn invariant_with_outcome(
        &self,
        balances: &Balances,
    ) -> Result<(InvariantPair, NewtonOutcome), ClpError> {
        invariant_bracket(balances, self.config.params(), self.config.newton())
    }
}

impl FromConfig<ThreeClpConfig> for ThreeClpCurve {
    fn from_config(config: &ThreeClpConfig) -> Result<Self, ClpError> {
        config.validate()?;
        tracing::debug!(
            root3_alpha = %config.params().root3_alpha(),
            max_iterations = config.newton().max_iterations(),
            "created 3CLP curve"
        );
        Ok(Self {
            config: config.clone(),
        })
    }
}

impl InvariantCurve for ThreeClpCurve {
    fn num_tokens(&self) -> usize {
        3
    }

    fn swap_limits(&self) -> &SwapLimits {
        self.config.limits()
    }

    fn calculate_invariant_with_error(
        &self,
        balances: &Balances,
    ) -> Result<InvariantWithError, ClpError> {
        let (pair, outcome) = self.invariant_with_outcome(balances)?;
        Ok(InvariantWithError::new(pair.under().clone(), pair.spread()).with_outcome(outcome))
    }

    fn invariant_pair(&self, balances: &Balances) -> Result<InvariantPair, ClpError> {
        self.invariant_with_outcome(balances).map(|(pair, _)| pair)
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
            token_in,
            token_out,
            amount_in,
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
            token_in,
            token_out,
            amount_out,
            self.config.params(),
            invariant,
            self.config.limits(),
        )
    }

    fn max_balance(
        &self,
        _token: TokenIndex,
        _invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        Err(ClpError::UnsupportedOperation(
            "3CLP ceiling depends on the other two balances",
        ))
    }

    fn spot_price(
        &self,
        balances: &Balances,
        base: TokenIndex,
        quote: TokenIndex,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        balances.expect_len(3)?;
        distinct(base, quote)?;
        let lr = invariant.under().mul_down(self.config.params().root3_alpha())?;
        balances
            .get(quote)?
            .checked_add(&lr)?
            .div_down(&balances.get(base)?.checked_add(&lr)?)
    }
}
