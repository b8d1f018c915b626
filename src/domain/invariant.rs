//! Invariant estimates with their certified error.

use core::fmt;

use crate::domain::NewtonOutcome;
use crate::error::ClpError;
use crate::math::{Fixed, Np};

/// A conservative bracket around the true invariant.
///
/// # Invariants
///
/// - `0 <= under <= over`.
///
/// Swap math derives the offset of the asset going *in* from `over` and the
/// offset of the asset going *out* from `under`, so either error in the
/// estimate works against the trader.
///
/// # Examples
///
/// ```
/// use clp_math::domain::InvariantPair;
///
/// let over = "10.5".parse().expect("decimal");
/// let under = "10.4".parse().expect("decimal");
/// let pair = InvariantPair::new(over, under).expect("over >= under");
/// assert_eq!(pair.spread().to_string(), "0.1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvariantPair {
    over: Fixed<Np>,
    under: Fixed<Np>,
}

impl InvariantPair {
    /// Creates a validated pair.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticUnderflow`] if `under` is negative or
    /// exceeds `over`.
    pub fn new(over: Fixed<Np>, under: Fixed<Np>) -> Result<Self, ClpError> {
        if under.is_negative() || under > over {
            return Err(ClpError::ArithmeticUnderflow(
                "invariant pair must satisfy 0 <= under <= over",
            ));
        }
        Ok(Self { over, under })
    }

    /// A degenerate pair for an exactly known invariant.
    ///
    /// # Errors
    ///
    /// See [`InvariantPair::new`].
    pub fn exact(invariant: Fixed<Np>) -> Result<Self, ClpError> {
        Self::new(invariant.clone(), invariant)
    }

    /// Overestimate of the invariant.
    #[must_use]
    pub const fn over(&self) -> &Fixed<Np> {
        &self.over
    }

    /// Underestimate of the invariant.
    #[must_use]
    pub const fn under(&self) -> &Fixed<Np> {
        &self.under
    }

    /// `over - under`.
    #[must_use]
    pub fn spread(&self) -> Fixed<Np> {
        Fixed::from_raw(self.over.raw() - self.under.raw())
    }

    /// Returns `true` if `value` lies inside the bracket.
    #[must_use]
    pub fn contains(&self, value: &Fixed<Np>) -> bool {
        &self.under <= value && value <= &self.over
    }
}

impl fmt::Display for InvariantPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.under, self.over)
    }
}

/// Point estimate of the invariant with a same-direction error bound.
///
/// The true invariant lies in `[invariant - error, invariant + error]`
/// (or a one-sided variant documented by the producing curve).
///
/// Iterative solvers attach their [`NewtonOutcome`]; closed-form curves
/// leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvariantWithError {
    invariant: Fixed<Np>,
    error: Fixed<Np>,
    outcome: Option<NewtonOutcome>,
}

impl InvariantWithError {
    /// Wraps a closed-form estimate and its error.
    #[must_use]
    pub const fn new(invariant: Fixed<Np>, error: Fixed<Np>) -> Self {
        Self {
            invariant,
            error,
            outcome: None,
        }
    }

    /// Attaches the termination state of the solver that produced the
    /// estimate.
    #[must_use]
    pub fn with_outcome(mut self, outcome: NewtonOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Solver termination state, `None` for closed-form curves.
    #[must_use]
    pub const fn outcome(&self) -> Option<NewtonOutcome> {
        self.outcome
    }

    /// Returns `true` when an iterative solver stopped short of its
    /// tolerance.
    #[must_use]
    pub const fn is_reduced_confidence(&self) -> bool {
        match self.outcome {
            Some(outcome) => outcome.is_reduced_confidence(),
            None => false,
        }
    }

    /// The point estimate.
    #[must_use]
    pub const fn invariant(&self) -> &Fixed<Np> {
        &self.invariant
    }

    /// The error bound.
    #[must_use]
    pub const fn error(&self) -> &Fixed<Np> {
        &self.error
    }

    /// `(invariant + 2·error, invariant)`: the pair used by the ellipse
    /// curves, whose point estimate is already biased low by `error`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow and
    /// [`ClpError::ArithmeticUnderflow`] for a negative estimate.
    pub fn to_shifted_pair(&self) -> Result<InvariantPair, ClpError> {
        let over = self.invariant.checked_add(&self.error.mul_int(2)?)?;
        InvariantPair::new(over, self.invariant.clone())
    }

    /// `(invariant + error, invariant - error)`, floored at zero.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn to_symmetric_pair(&self) -> Result<InvariantPair, ClpError> {
        let over = self.invariant.checked_add(&self.error)?;
        let under = self.invariant.checked_sub(&self.error)?;
        let under = if under.is_negative() { Fixed::zero() } else { under };
        InvariantPair::new(over, under)
    }
}

impl fmt::Display for InvariantWithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ± {}", self.invariant, self.error)
    }
}
