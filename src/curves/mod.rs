//! Curve implementations and the [`CurveBox`] dispatch enum.
//!
//! Each family sits behind its own Cargo feature. The ellipse math in
//! [`ellipse`] is always compiled since configuration validation uses it.
//!
//! # Families
//!
//! | Feature | Curve | Assets | Invariant |
//! |---------|-------|--------|-----------|
//! | `two-clp` | [`TwoClpCurve`] | 2 | closed-form quadratic |
//! | `three-clp` | [`ThreeClpCurve`] | 3 | Newton on a cubic |
//! | `cemm` | [`CemmCurve`] | 2 | ellipse, 18-decimal denominator |
//! | `eclp` | [`EclpCurve`] | 2 | ellipse, certified 38-decimal bound |

#[cfg(feature = "cemm")]
pub mod cemm;
#[cfg(feature = "eclp")]
pub mod eclp;
pub mod ellipse;
#[cfg(feature = "three-clp")]
pub mod three_clp;
#[cfg(feature = "two-clp")]
pub mod two_clp;
#[cfg(any(feature = "two-clp", feature = "three-clp"))]
pub mod virtual_offset;

mod curve_box;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;

#[cfg(feature = "cemm")]
pub use cemm::CemmCurve;
pub use curve_box::CurveBox;
#[cfg(feature = "eclp")]
pub use eclp::EclpCurve;
#[cfg(feature = "three-clp")]
pub use three_clp::{CubicSolution, CubicTerms, ThreeClpCurve};
#[cfg(feature = "two-clp")]
pub use two_clp::TwoClpCurve;
