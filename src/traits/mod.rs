//! Core trait abstractions for curve math.
//!
//! [`InvariantCurve`] is the solver and swap contract every curve family
//! satisfies; [`FromConfig`] is the validating constructor the factory
//! dispatches through.

mod from_config;
mod invariant_curve;

pub use from_config::FromConfig;
pub use invariant_curve::{two_asset_direction, InvariantCurve};
