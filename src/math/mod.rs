//! Fixed-point arithmetic for invariant and swap calculations.
//!
//! This module provides the [`Fixed<S>`] scaled-integer type, the
//! [`Scale`] markers it is generic over, [`CheckedArithmetic`] for
//! non-negative quantities, [`div_round`] for explicit division rounding,
//! and the pool square root.
//!
//! # Scales
//!
//! | Marker | Decimals | Use case |
//! |--------|----------|----------|
//! | [`Np`] | 18 | Balances, params, invariants |
//! | [`Xp`] | 38 | Derived ellipse params, cross terms |
//! | [`Wide`] | 100 | Reference computations in tests |
//!
//! The same curve code runs at every scale; only [`Np`] and [`Xp`] enforce
//! the 256-bit range.

mod checked;
mod fixed;
mod precision;
mod rounding;
mod sqrt;
mod xp;

pub use checked::CheckedArithmetic;
pub use fixed::Fixed;
pub use precision::{pow10, Np, Scale, Wide, Xp};
pub use rounding::div_round;
pub use sqrt::{pool_sqrt, DEFAULT_SQRT_TOLERANCE};
