//! Math shared by the two ellipse curve families.
//!
//! - [`geometry`]: the `A` transform, `zeta`, `eta` and `tau`, generic over
//!   scale.
//! - [`invariant`]: the invariant helpers, both denominators and the
//!   certified error bound.
//! - [`swap`]: virtual offsets, balance ceilings, the swap quadratic and
//!   the two trade directions.
//!
//! This module is compiled regardless of curve features because ellipse
//! configuration validation needs the invariant denominator.

pub mod geometry;
pub mod invariant;
pub mod swap;

pub use geometry::{eta, scalar_prod, EllipseShape};
pub use invariant::{
    calc_a_chi_a_chi, calc_a_chi_a_chi_in_xp, calc_at_a_chi, calc_invariant_sqrt,
    cemm_invariant_with_error, eclp_invariant_with_error, MAX_BALANCES, MAX_INVARIANT,
};
pub use swap::{
    calc_in_given_out, calc_out_given_in, calc_spot_price0in1, calc_x_given_y, calc_y_given_x,
    max_balances0, max_balances1, solve_quadratic_swap, virtual_offset0, virtual_offset1,
};

use crate::config::EllipseConfig;
use crate::domain::{Balances, InvariantPair, TokenIndex};
use crate::error::ClpError;
use crate::math::{Fixed, Np};

/// Spot price of `base` in `quote` for either ellipse family.
pub(crate) fn spot_price(
    config: &EllipseConfig,
    balances: &Balances,
    base: TokenIndex,
    quote: TokenIndex,
    invariant: &InvariantPair,
) -> Result<Fixed<Np>, ClpError> {
    let px = calc_spot_price0in1(balances, config.params(), config.derived(), invariant)?;
    match (base, quote) {
        (TokenIndex::First, TokenIndex::Second) => Ok(px),
        (TokenIndex::Second, TokenIndex::First) => Fixed::<Np>::one().div_down(&px),
        _ => Err(ClpError::InvalidBalances("two-asset curve expects assets 0 and 1")),
    }
}
