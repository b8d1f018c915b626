//! Curve configuration enums and structs.
//!
//! This module contains the [`CurveConfig`] enum, the top-level
//! declarative blueprint for creating any curve, along with per-family
//! configuration structs, swap ratio limits and the cubic solver budget.
//!
//! Configuration types are always compiled, independent of which curve
//! features are enabled.

mod curve_config;
mod ellipse;
mod limits;
mod three_clp;
mod two_clp;

pub use curve_config::CurveConfig;
pub use ellipse::{
    DerivedEllipseParams, EllipseConfig, EllipseParams, DERIVED_DSQ_NORM_ACCURACY_XP,
    DERIVED_TAU_NORM_ACCURACY_XP, MAX_INV_INVARIANT_DENOMINATOR_XP, MAX_STRETCH_FACTOR,
    ROTATION_VECTOR_NORM_ACCURACY,
};
pub use limits::{NewtonConfig, SwapLimits, MAX_NEWTON_ITERATIONS};
pub use three_clp::{ThreeClpConfig, ThreeClpParams, ROOT_ALPHA_MAX};
pub use two_clp::{TwoClpConfig, TwoClpParams};
