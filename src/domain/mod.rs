//! Value types shared by every curve family.
//!
//! This module contains the types that model the invariant-math domain:
//! rounding direction, balance vectors, 2-vectors for the ellipse geometry,
//! invariant brackets and solver outcomes.  Types with invariants use
//! validated constructors.

mod balances;
mod convergence;
mod invariant;
mod rounding;
mod token_index;
mod vector2;

pub use balances::Balances;
pub use convergence::NewtonOutcome;
pub use invariant::{InvariantPair, InvariantWithError};
pub use rounding::Rounding;
pub use token_index::{SwapKind, TokenIndex};
pub use vector2::Vector2;
