//! Default curve factory implementation.

use crate::config::CurveConfig;
use crate::curves::CurveBox;
use crate::error::ClpError;

#[cfg(any(feature = "two-clp", feature = "three-clp", feature = "cemm", feature = "eclp"))]
use crate::traits::FromConfig;

/// Stateless factory for creating curves from configuration.
///
/// `DefaultCurveFactory` matches on the [`CurveConfig`] variant, validates
/// the configuration, delegates to the curve's [`FromConfig`]
/// implementation and wraps the result in a [`CurveBox`].
///
/// [`create`](Self::create) holds no state and is safe to call from any
/// thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefaultCurveFactory;

impl DefaultCurveFactory {
    /// Creates a curve from the given configuration.
    ///
    /// # Flow
    ///
    /// 1. Validate the configuration via [`CurveConfig::validate`].
    /// 2. Match on the config variant.
    /// 3. Delegate to the curve's [`FromConfig`] implementation.
    /// 4. Wrap the curve in the corresponding [`CurveBox`] variant.
    ///
    /// # Errors
    ///
    /// - [`ClpError::ParameterValidation`] if the configuration is invalid
    ///   or the requested family's feature is not enabled.
    /// - Any error propagated from the curve's `from_config`.
    pub fn create(config: &CurveConfig) -> Result<CurveBox, ClpError> {
        config.validate()?;
        tracing::debug!(curve = %config, "creating curve");

        match config {
            #[cfg(feature = "two-clp")]
            CurveConfig::TwoClp(cfg) => {
                let curve = crate::curves::two_clp::TwoClpCurve::from_config(cfg)?;
                Ok(CurveBox::TwoClp(Box::new(curve)))
            }

            #[cfg(feature = "three-clp")]
            CurveConfig::ThreeClp(cfg) => {
                let curve = crate::curves::three_clp::ThreeClpCurve::from_config(cfg)?;
                Ok(CurveBox::ThreeClp(Box::new(curve)))
            }

            #[cfg(feature = "cemm")]
            CurveConfig::Cemm(cfg) => {
                let curve = crate::curves::cemm::CemmCurve::from_config(cfg)?;
                Ok(CurveBox::Cemm(Box::new(curve)))
            }

            #[cfg(feature = "eclp")]
            CurveConfig::Eclp(cfg) => {
                let curve = crate::curves::eclp::EclpCurve::from_config(cfg)?;
                Ok(CurveBox::Eclp(Box::new(curve)))
            }

            // Config variants whose curve feature is disabled.
            #[allow(unreachable_patterns)]
            _ => Err(ClpError::ParameterValidation(
                "requested curve family is not enabled (missing feature flag)",
            )),
        }
    }
}
