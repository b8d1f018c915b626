//! Construction of a curve from its configuration.
//!
//! [`FromConfig`] gives every curve family a uniform constructor.  Each
//! curve implements `FromConfig<C>` for its own config type, so the factory
//! dispatches construction without `dyn` trait objects:
//!
//! ```text
//! CurveConfig::TwoClp(cfg)   => TwoClpCurve::from_config(cfg)
//! CurveConfig::ThreeClp(cfg) => ThreeClpCurve::from_config(cfg)
//! CurveConfig::Cemm(cfg)     => CemmCurve::from_config(cfg)
//! CurveConfig::Eclp(cfg)     => EclpCurve::from_config(cfg)
//! ```
//!
//! Implementations validate the whole configuration once.  Per-call paths
//! never re-check parameters.

use crate::error::ClpError;

/// Builds a curve from a configuration of type `C`.
///
/// # Implementors
///
/// - `impl FromConfig<TwoClpConfig> for TwoClpCurve`
/// - `impl FromConfig<ThreeClpConfig> for ThreeClpCurve`
/// - `impl FromConfig<EllipseConfig> for CemmCurve`
/// - `impl FromConfig<EllipseConfig> for EclpCurve`
///
/// # Errors
///
/// Returns [`ClpError::ParameterValidation`] or
/// [`ClpError::IllConditionedCurve`] if the configuration is invalid.
pub trait FromConfig<C> {
    /// Validates `config` and returns the curve.
    ///
    /// # Errors
    ///
    /// See the trait-level documentation.
    fn from_config(config: &C) -> Result<Self, ClpError>
    where
        Self: Sized;
}
