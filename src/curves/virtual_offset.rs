//! Trade solving on a constant product shifted by virtual offsets.
//!
//! Both bounded constant-product families trade on
//! `(x + a)(y + b) = L²` with offsets derived from the invariant. The
//! input side uses the offset from the overestimate, the output side the
//! offset from the underestimate, each nudged by a couple of wei:
//!
//! ```text
//! virt_in  = balance_in  + offset_in  · (1 + 2 wei)   rounded up
//! virt_out = balance_out + offset_out · (1 - 1 wei)   rounded down
//!
//! out = virt_out · in  / (virt_in + in)                rounded down
//! in  = virt_in  · out / (virt_out - out)              rounded up
//! ```

use crate::error::ClpError;
use crate::math::{Fixed, Np};

fn nudged(
    balance_in: &Fixed<Np>,
    offset_in: &Fixed<Np>,
    balance_out: &Fixed<Np>,
    offset_out: &Fixed<Np>,
) -> Result<(Fixed<Np>, Fixed<Np>), ClpError> {
    let one = Fixed::<Np>::one();
    let up = one.checked_add(&Fixed::from_raw(2))?;
    let down = one.checked_sub(&Fixed::ulp())?;
    Ok((
        balance_in.checked_add(&offset_in.mul_up(&up)?)?,
        balance_out.checked_add(&offset_out.mul_down(&down)?)?,
    ))
}

/// Amount out for `amount_in`, rounded down.
///
/// `offset_in` must come from the invariant overestimate rounded up,
/// `offset_out` from the underestimate rounded down.
///
/// # Errors
///
/// - [`ClpError::AssetBoundsExceeded`] if the result exceeds `balance_out`.
/// - [`ClpError::ArithmeticOverflow`] on overflow.
pub fn calc_out_given_in(
    balance_in: &Fixed<Np>,
    balance_out: &Fixed<Np>,
    amount_in: &Fixed<Np>,
    offset_in: &Fixed<Np>,
    offset_out: &Fixed<Np>,
) -> Result<Fixed<Np>, ClpError> {
    if amount_in.is_negative() {
        return Err(ClpError::ArithmeticUnderflow("amount in"));
    }
    let (virt_in, virt_out) = nudged(balance_in, offset_in, balance_out, offset_out)?;
    let amount_out = virt_out
        .mul_down(amount_in)?
        .div_down(&virt_in.checked_add(amount_in)?)?;
    if &amount_out > balance_out {
        return Err(ClpError::AssetBoundsExceeded("amount out above balance"));
    }
    Ok(amount_out)
}

/// Amount in for `amount_out`, rounded up.
///
/// # Errors
///
/// - [`ClpError::AssetBoundsExceeded`] if `amount_out` exceeds
///   `balance_out`.
/// - [`ClpError::ArithmeticOverflow`] on overflow.
pub fn calc_in_given_out(
    balance_in: &Fixed<Np>,
    balance_out: &Fixed<Np>,
    amount_out: &Fixed<Np>,
    offset_in: &Fixed<Np>,
    offset_out: &Fixed<Np>,
) -> Result<Fixed<Np>, ClpError> {
    if amount_out.is_negative() {
        return Err(ClpError::ArithmeticUnderflow("amount out"));
    }
    if amount_out > balance_out {
        return Err(ClpError::AssetBoundsExceeded("amount out above balance"));
    }
    let (virt_in, virt_out) = nudged(balance_in, offset_in, balance_out, offset_out)?;
    virt_in
        .mul_up(amount_out)?
        .div_up(&virt_out.checked_sub(amount_out)?)
}
