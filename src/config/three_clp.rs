//! Configuration for three-asset bounded constant-product curves.

use std::sync::LazyLock;

use crate::config::{NewtonConfig, SwapLimits};
use crate::error::ClpError;
use crate::math::{Fixed, Np};

/// Largest accepted cube root of the lower price bound.
///
/// Closer to one the cubic's leading coefficient `1 - r³` loses too many
/// significant digits for the solver to certify its root.
pub static ROOT_ALPHA_MAX: LazyLock<Fixed<Np>> =
    LazyLock::new(|| Fixed::from_raw(999_966_665_550_000_000u64));

/// The single price parameter of a 3CLP curve.
///
/// All three pairwise prices live in `[alpha, 1/alpha]` with
/// `alpha = root3_alpha³`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreeClpParams {
    root3_alpha: Fixed<Np>,
}

impl ThreeClpParams {
    /// Creates a validated parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] unless
    /// `0 < root3_alpha <= ROOT_ALPHA_MAX`.
    pub fn new(root3_alpha: Fixed<Np>) -> Result<Self, ClpError> {
        let params = Self { root3_alpha };
        params.validate()?;
        Ok(params)
    }

    /// Validates the parameter.
    ///
    /// # Errors
    ///
    /// See [`ThreeClpParams::new`].
    pub fn validate(&self) -> Result<(), ClpError> {
        if !self.root3_alpha.is_positive() {
            return Err(ClpError::ParameterValidation("root3_alpha must be positive"));
        }
        if self.root3_alpha > *ROOT_ALPHA_MAX {
            return Err(ClpError::ParameterValidation("root3_alpha too close to one"));
        }
        Ok(())
    }

    /// Cube root of the lower price bound.
    #[must_use]
    pub const fn root3_alpha(&self) -> &Fixed<Np> {
        &self.root3_alpha
    }
}

/// Full configuration of a 3CLP curve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreeClpConfig {
    params: ThreeClpParams,
    #[cfg_attr(feature = "serde", serde(default))]
    newton: NewtonConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    limits: SwapLimits,
}

impl ThreeClpConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] if any part is invalid.
    pub fn new(
        params: ThreeClpParams,
        newton: NewtonConfig,
        limits: SwapLimits,
    ) -> Result<Self, ClpError> {
        let config = Self {
            params,
            newton,
            limits,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration with the default solver budget and swap limits.
    ///
    /// # Errors
    ///
    /// See [`ThreeClpParams::new`].
    pub fn from_root3_alpha(root3_alpha: Fixed<Np>) -> Result<Self, ClpError> {
        Self::new(
            ThreeClpParams::new(root3_alpha)?,
            NewtonConfig::default(),
            SwapLimits::default(),
        )
    }

    /// Validates every part.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] on the first violation.
    pub fn validate(&self) -> Result<(), ClpError> {
        self.params.validate()?;
        self.newton.validate()?;
        self.limits.validate()
    }

    /// The price parameter.
    #[must_use]
    pub const fn params(&self) -> &ThreeClpParams {
        &self.params
    }

    /// Newton solver budget.
    #[must_use]
    pub const fn newton(&self) -> &NewtonConfig {
        &self.newton
    }

    /// Per-trade ratio limits.
    #[must_use]
    pub const fn limits(&self) -> &SwapLimits {
        &self.limits
    }
}
