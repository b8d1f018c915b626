//! Top-level curve configuration enum.
//!
//! [`CurveConfig`] is the declarative blueprint for any supported curve.
//! The factory matches on it to dispatch construction:
//!
//! ```text
//! match config {
//!     CurveConfig::TwoClp(cfg)   => TwoClpCurve::from_config(cfg),
//!     CurveConfig::ThreeClp(cfg) => ThreeClpCurve::from_config(cfg),
//!     CurveConfig::Cemm(cfg)     => CemmCurve::from_config(cfg),
//!     CurveConfig::Eclp(cfg)     => EclpCurve::from_config(cfg),
//! }
//! ```

use super::{EllipseConfig, ThreeClpConfig, TwoClpConfig};
use crate::error::ClpError;

/// Configuration for one of the four curve families.
///
/// # Variants
///
/// - [`TwoClp`](CurveConfig::TwoClp): two assets, bounded constant product
/// - [`ThreeClp`](CurveConfig::ThreeClp): three assets, bounded constant product
/// - [`Cemm`](CurveConfig::Cemm): rotated and stretched circle
/// - [`Eclp`](CurveConfig::Eclp): the ellipse with the certified
///   extra-precision error bound
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "curve", rename_all = "kebab-case"))]
pub enum CurveConfig {
    /// Two-asset bounded constant product.
    TwoClp(TwoClpConfig),
    /// Three-asset bounded constant product.
    ThreeClp(ThreeClpConfig),
    /// Ellipse curve with the normal-precision denominator.
    Cemm(EllipseConfig),
    /// Ellipse curve with the extra-precision denominator.
    Eclp(EllipseConfig),
}

impl CurveConfig {
    /// Validates the inner configuration.
    ///
    /// # Errors
    ///
    /// Returns the error of the inner config's `validate()`.
    pub fn validate(&self) -> Result<(), ClpError> {
        match self {
            Self::TwoClp(cfg) => cfg.validate(),
            Self::ThreeClp(cfg) => cfg.validate(),
            Self::Cemm(cfg) | Self::Eclp(cfg) => cfg.validate(),
        }
    }

    /// Number of assets the curve trades.
    #[must_use]
    pub const fn num_tokens(&self) -> usize {
        match self {
            Self::ThreeClp(_) => 3,
            Self::TwoClp(_) | Self::Cemm(_) | Self::Eclp(_) => 2,
        }
    }

    /// Returns `true` for [`TwoClp`](Self::TwoClp).
    #[must_use]
    pub const fn is_two_clp(&self) -> bool {
        matches!(self, Self::TwoClp(_))
    }

    /// Returns `true` for [`ThreeClp`](Self::ThreeClp).
    #[must_use]
    pub const fn is_three_clp(&self) -> bool {
        matches!(self, Self::ThreeClp(_))
    }

    /// Returns `true` for [`Cemm`](Self::Cemm).
    #[must_use]
    pub const fn is_cemm(&self) -> bool {
        matches!(self, Self::Cemm(_))
    }

    /// Returns `true` for [`Eclp`](Self::Eclp).
    #[must_use]
    pub const fn is_eclp(&self) -> bool {
        matches!(self, Self::Eclp(_))
    }

    /// Returns `true` for either ellipse family.
    #[must_use]
    pub const fn is_ellipse(&self) -> bool {
        self.is_cemm() || self.is_eclp()
    }
}

impl core::fmt::Display for CurveConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TwoClp(_) => write!(f, "2CLP"),
            Self::ThreeClp(_) => write!(f, "3CLP"),
            Self::Cemm(_) => write!(f, "CEMM"),
            Self::Eclp(_) => write!(f, "ECLP"),
        }
    }
}
