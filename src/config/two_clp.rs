//! Configuration for two-asset bounded constant-product curves.

use crate::config::SwapLimits;
use crate::error::ClpError;
use crate::math::{Fixed, Np};

/// Price bounds of a 2CLP curve, given as square roots.
///
/// The curve trades `x` against `y` inside the price range
/// `[sqrt_alpha², sqrt_beta²]` (price of `x` quoted in `y`).
///
/// # Validation
///
/// - `0 < sqrt_alpha < sqrt_beta`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoClpParams {
    sqrt_alpha: Fixed<Np>,
    sqrt_beta: Fixed<Np>,
}

impl TwoClpParams {
    /// Creates validated price bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] unless
    /// `0 < sqrt_alpha < sqrt_beta`.
    pub fn new(sqrt_alpha: Fixed<Np>, sqrt_beta: Fixed<Np>) -> Result<Self, ClpError> {
        let params = Self {
            sqrt_alpha,
            sqrt_beta,
        };
        params.validate()?;
        Ok(params)
    }

    /// Validates the bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] unless
    /// `0 < sqrt_alpha < sqrt_beta`.
    pub fn validate(&self) -> Result<(), ClpError> {
        if !self.sqrt_alpha.is_positive() {
            return Err(ClpError::ParameterValidation("sqrt_alpha must be positive"));
        }
        if self.sqrt_alpha >= self.sqrt_beta {
            return Err(ClpError::ParameterValidation(
                "sqrt_alpha must be below sqrt_beta",
            ));
        }
        Ok(())
    }

    /// Square root of the lower price bound.
    #[must_use]
    pub const fn sqrt_alpha(&self) -> &Fixed<Np> {
        &self.sqrt_alpha
    }

    /// Square root of the upper price bound.
    #[must_use]
    pub const fn sqrt_beta(&self) -> &Fixed<Np> {
        &self.sqrt_beta
    }
}

/// Full configuration of a 2CLP curve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoClpConfig {
    params: TwoClpParams,
    #[cfg_attr(feature = "serde", serde(default))]
    limits: SwapLimits,
}

impl TwoClpConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] if the params or limits are
    /// invalid.
    pub fn new(params: TwoClpParams, limits: SwapLimits) -> Result<Self, ClpError> {
        let config = Self { params, limits };
        config.validate()?;
        Ok(config)
    }

    /// Configuration with the default 30% swap limits.
    ///
    /// # Errors
    ///
    /// See [`TwoClpParams::new`].
    pub fn from_bounds(sqrt_alpha: Fixed<Np>, sqrt_beta: Fixed<Np>) -> Result<Self, ClpError> {
        Self::new(TwoClpParams::new(sqrt_alpha, sqrt_beta)?, SwapLimits::default())
    }

    /// Validates params and limits.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] on the first violation.
    pub fn validate(&self) -> Result<(), ClpError> {
        self.params.validate()?;
        self.limits.validate()
    }

    /// The price bounds.
    #[must_use]
    pub const fn params(&self) -> &TwoClpParams {
        &self.params
    }

    /// Per-trade ratio limits.
    #[must_use]
    pub const fn limits(&self) -> &SwapLimits {
        &self.limits
    }
}
