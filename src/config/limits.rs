//! Per-trade circuit breakers and iterative-solver budget.

use core::fmt;

use crate::domain::TokenIndex;
use crate::error::ClpError;
use crate::math::{Fixed, Np};

/// Hard upper bound on Newton steps for the cubic solver.
pub const MAX_NEWTON_ITERATIONS: u32 = 255;

/// Maximum trade size as a fraction of the affected balance.
///
/// A swap is rejected with [`ClpError::RatioLimitExceeded`] when
/// `amount_in > balance_in · max_in_ratio` or
/// `amount_out > balance_out · max_out_ratio` (limits rounded down).
///
/// # Examples
///
/// ```
/// use clp_math::config::SwapLimits;
///
/// let limits = SwapLimits::default();
/// assert_eq!(limits.max_in_ratio().to_string(), "0.3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapLimits {
    max_in_ratio: Fixed<Np>,
    max_out_ratio: Fixed<Np>,
}

impl SwapLimits {
    /// Creates validated limits.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] unless both ratios lie in
    /// `(0, 1]`.
    pub fn new(max_in_ratio: Fixed<Np>, max_out_ratio: Fixed<Np>) -> Result<Self, ClpError> {
        let limits = Self {
            max_in_ratio,
            max_out_ratio,
        };
        limits.validate()?;
        Ok(limits)
    }

    /// Validates both ratios.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] unless both ratios lie in
    /// `(0, 1]`.
    pub fn validate(&self) -> Result<(), ClpError> {
        let one = Fixed::<Np>::one();
        for ratio in [&self.max_in_ratio, &self.max_out_ratio] {
            if !ratio.is_positive() || ratio > &one {
                return Err(ClpError::ParameterValidation(
                    "swap ratio limits must lie in (0, 1]",
                ));
            }
        }
        Ok(())
    }

    /// Fraction of the input balance a single trade may add.
    #[must_use]
    pub const fn max_in_ratio(&self) -> &Fixed<Np> {
        &self.max_in_ratio
    }

    /// Fraction of the output balance a single trade may remove.
    #[must_use]
    pub const fn max_out_ratio(&self) -> &Fixed<Np> {
        &self.max_out_ratio
    }

    /// Rejects `amount_in` above the input limit.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::RatioLimitExceeded`] when over the limit.
    pub fn check_in(
        &self,
        token: TokenIndex,
        amount_in: &Fixed<Np>,
        balance_in: &Fixed<Np>,
    ) -> Result<(), ClpError> {
        check(token, "in", amount_in, &balance_in.mul_down(&self.max_in_ratio)?)
    }

    /// Rejects `amount_out` above the output limit.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::RatioLimitExceeded`] when over the limit.
    pub fn check_out(
        &self,
        token: TokenIndex,
        amount_out: &Fixed<Np>,
        balance_out: &Fixed<Np>,
    ) -> Result<(), ClpError> {
        check(token, "out", amount_out, &balance_out.mul_down(&self.max_out_ratio)?)
    }
}

fn check(
    token: TokenIndex,
    side: &str,
    amount: &Fixed<Np>,
    limit: &Fixed<Np>,
) -> Result<(), ClpError> {
    if amount > limit {
        tracing::debug!(%token, side, %amount, %limit, "swap rejected by ratio limit");
        return Err(ClpError::RatioLimitExceeded {
            limit: limit.to_string(),
            requested: amount.to_string(),
        });
    }
    Ok(())
}

impl Default for SwapLimits {
    fn default() -> Self {
        let ratio = Fixed::from_raw(300_000_000_000_000_000u64);
        Self {
            max_in_ratio: ratio.clone(),
            max_out_ratio: ratio,
        }
    }
}

impl fmt::Display for SwapLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in<={} out<={}", self.max_in_ratio, self.max_out_ratio)
    }
}

/// Budget and tolerance for the cubic Newton solver.
///
/// The budget is fixed at construction so the worst-case cost of an
/// invariant computation is known in advance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewtonConfig {
    max_iterations: u32,
    convergence_tolerance: Fixed<Np>,
}

impl NewtonConfig {
    /// Creates a validated solver configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] if `max_iterations` is zero
    /// or above [`MAX_NEWTON_ITERATIONS`], or the tolerance is not positive.
    pub fn new(max_iterations: u32, convergence_tolerance: Fixed<Np>) -> Result<Self, ClpError> {
        let config = Self {
            max_iterations,
            convergence_tolerance,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the budget and tolerance.
    ///
    /// # Errors
    ///
    /// See [`NewtonConfig::new`].
    pub fn validate(&self) -> Result<(), ClpError> {
        if self.max_iterations == 0 || self.max_iterations > MAX_NEWTON_ITERATIONS {
            return Err(ClpError::ParameterValidation(
                "newton budget must lie in 1..=255",
            ));
        }
        if !self.convergence_tolerance.is_positive() {
            return Err(ClpError::ParameterValidation(
                "newton tolerance must be positive",
            ));
        }
        Ok(())
    }

    /// Maximum number of Newton steps.
    #[must_use]
    pub const fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Per-asset reconstruction tolerance.
    #[must_use]
    pub const fn convergence_tolerance(&self) -> &Fixed<Np> {
        &self.convergence_tolerance
    }
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_NEWTON_ITERATIONS,
            convergence_tolerance: Fixed::ulp(),
        }
    }
}
