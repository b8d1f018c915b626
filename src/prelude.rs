//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use clp_math::prelude::*;
//!
//! let balances = Balances::from_decimals(&["1", "2"]).expect("valid");
//! assert_eq!(balances.len(), 2);
//! ```

pub use crate::config::{
    CurveConfig, EllipseConfig, EllipseParams, NewtonConfig, SwapLimits, ThreeClpConfig,
    TwoClpConfig,
};
pub use crate::curves::CurveBox;
pub use crate::domain::{
    Balances, InvariantPair, InvariantWithError, NewtonOutcome, Rounding, SwapKind, TokenIndex,
};
pub use crate::error::{ClpError, Result};
pub use crate::factory::DefaultCurveFactory;
pub use crate::math::{CheckedArithmetic, Fixed, Np, Xp};
pub use crate::traits::{FromConfig, InvariantCurve};
