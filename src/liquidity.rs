//! Invariant updates for joins and exits, and the protocol fee split.
//!
//! Joins and exits move every balance by the same fraction, so the
//! invariant scales by that fraction too and need not be re-solved:
//!
//! ```text
//! L' = L ± L · Δsupply / supply
//! ```
//!
//! Growth of `L` between two joins or exits comes from swap fees; the
//! protocol takes `protocol_fee_pct` of that growth by minting pool shares,
//! split between two recipients.
//!
//! # Rounding
//!
//! | Operation | Direction |
//! |-----------|-----------|
//! | invariant increase | up |
//! | invariant decrease | step rounded down |
//! | tokens in for shares out | up |
//! | tokens out for shares in | down |
//! | protocol fee shares | down |

use crate::domain::{Balances, Rounding};
use crate::error::ClpError;
use crate::math::{CheckedArithmetic, Fixed, Np};

/// Shares minted to the two fee recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolFees {
    /// Shares for the primary recipient.
    pub gyro: Fixed<Np>,
    /// Shares for the secondary recipient.
    pub other: Fixed<Np>,
}

impl ProtocolFees {
    /// No fees.
    #[must_use]
    pub fn none() -> Self {
        Self {
            gyro: Fixed::zero(),
            other: Fixed::zero(),
        }
    }

    /// Total shares minted.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn total(&self) -> Result<Fixed<Np>, ClpError> {
        self.gyro.safe_add(&self.other)
    }
}

fn apply(
    invariant: &Fixed<Np>,
    delta: &Fixed<Np>,
    is_increase: bool,
) -> Result<Fixed<Np>, ClpError> {
    if is_increase {
        invariant.safe_add(delta)
    } else {
        invariant.safe_sub(delta)
    }
}

/// Scales `invariant` by a change of `supply_delta` in `total_supply`.
///
/// # Errors
///
/// - [`ClpError::DivisionByZero`] for zero supply.
/// - [`ClpError::ArithmeticUnderflow`] when an exit removes more than the
///   whole supply.
pub fn liquidity_invariant_update(
    invariant: &Fixed<Np>,
    supply_delta: &Fixed<Np>,
    total_supply: &Fixed<Np>,
    is_increase: bool,
) -> Result<Fixed<Np>, ClpError> {
    let delta = if is_increase {
        invariant.mul_up(supply_delta)?.div_up(total_supply)?
    } else {
        invariant.mul_down(supply_delta)?.div_down(total_supply)?
    };
    apply(invariant, &delta, is_increase)
}

/// Scales `invariant` by the relative change of the largest balance.
///
/// Uses the largest balance since its ratio carries the most significant
/// digits.
///
/// # Errors
///
/// - [`ClpError::InvalidBalances`] if the vectors differ in length.
/// - [`ClpError::DivisionByZero`] if every balance is zero.
/// - [`ClpError::ArithmeticUnderflow`] on an exit larger than the pool.
pub fn liquidity_invariant_update_from_balances(
    balances: &Balances,
    invariant: &Fixed<Np>,
    deltas: &Balances,
    is_increase: bool,
) -> Result<Fixed<Np>, ClpError> {
    deltas.expect_len(balances.len())?;
    let (index, largest) = balances.largest()?;
    let ratio = deltas.get(index)?.div_down(largest)?;
    let delta = ratio.mul_down(invariant)?;
    apply(invariant, &delta, is_increase)
}

/// 2CLP invariant update from balance deltas at the current square-root
/// price.
///
/// Uses `dL = dy / (√p - √α)` when `x <= y`, else
/// `dL = dx / (1/√p - 1/√β)`, reading the delta of the smaller side's
/// counterpart so the denominator stays away from zero. The step is
/// rounded down on a join and up on an exit.
///
/// # Errors
///
/// - [`ClpError::InvalidBalances`] for anything but two balances.
/// - [`ClpError::DivisionByZero`] at a price bound.
/// - [`ClpError::ArithmeticUnderflow`] on an exit larger than the pool.
#[cfg(feature = "two-clp")]
pub fn liquidity_invariant_update_from_sqrt_price(
    balances: &Balances,
    params: &crate::config::TwoClpParams,
    invariant: &Fixed<Np>,
    deltas: &Balances,
    is_increase: bool,
) -> Result<Fixed<Np>, ClpError> {
    use crate::curves::two_clp::{calculate_sqrt_price, virtual_parameter0};
    use crate::domain::TokenIndex;

    balances.expect_len(2)?;
    deltas.expect_len(2)?;
    let (x, y) = (balances.get(TokenIndex::First)?, balances.get(TokenIndex::Second)?);
    let rounding = if is_increase { Rounding::Down } else { Rounding::Up };
    // √p = L / (x + L/√β), rounded so the denominator below moves against `rounding`
    let price_at = |price_rounding: Rounding| -> Result<Fixed<Np>, ClpError> {
        let offset = virtual_parameter0(invariant, params.sqrt_beta(), price_rounding.reverse())?;
        calculate_sqrt_price(invariant, &x.safe_add(&offset)?, price_rounding)
    };

    let delta = if x <= y {
        let denominator = price_at(rounding.reverse())?.safe_sub(params.sqrt_alpha())?;
        deltas.get(TokenIndex::Second)?.div_by(&denominator, rounding)?
    } else {
        let sqrt_price = price_at(rounding)?;
        let one = Fixed::<Np>::one();
        let inverse_price = one.div_by(&sqrt_price, rounding.reverse())?;
        let inverse_beta = one.div_by(params.sqrt_beta(), rounding)?;
        let denominator = inverse_price.safe_sub(&inverse_beta)?;
        deltas.get(TokenIndex::First)?.div_by(&denominator, rounding)?
    };
    apply(invariant, &delta, is_increase)
}

/// Tokens a joiner pays for `shares_out` new pool shares, rounded up.
///
/// # Errors
///
/// Returns [`ClpError::DivisionByZero`] for zero supply.
pub fn calc_all_tokens_in_given_exact_bpt_out(
    balances: &Balances,
    shares_out: &Fixed<Np>,
    total_supply: &Fixed<Np>,
) -> Result<Vec<Fixed<Np>>, ClpError> {
    proportional_amounts(balances, shares_out, total_supply, true)
}

/// Tokens an exiter receives for burning `shares_in`, rounded down.
///
/// # Errors
///
/// Returns [`ClpError::DivisionByZero`] for zero supply.
pub fn calc_tokens_out_given_exact_bpt_in(
    balances: &Balances,
    shares_in: &Fixed<Np>,
    total_supply: &Fixed<Np>,
) -> Result<Vec<Fixed<Np>>, ClpError> {
    proportional_amounts(balances, shares_in, total_supply, false)
}

fn proportional_amounts(
    balances: &Balances,
    shares: &Fixed<Np>,
    total_supply: &Fixed<Np>,
    pool_receives: bool,
) -> Result<Vec<Fixed<Np>>, ClpError> {
    let rounding = Rounding::for_payment(pool_receives);
    let ratio = shares.div_by(total_supply, rounding)?;
    balances.as_slice().iter().map(|b| b.mul_by(&ratio, rounding)).collect()
}

/// Pool shares minted as protocol fees on invariant growth.
///
/// ```text
/// diff = pct · (L_new - L_prev)
/// ΔS   = diff · S / (L_new - diff)
/// gyro = portion · ΔS,  other = ΔS - gyro
/// ```
///
/// Zero when the invariant did not grow or the fee is zero.
///
/// # Errors
///
/// - [`ClpError::ParameterValidation`] if a fraction is outside `[0, 1]`.
/// - [`ClpError::DivisionByZero`] when `L_new` is consumed by the fee.
pub fn calc_protocol_fees(
    previous_invariant: &Fixed<Np>,
    current_invariant: &Fixed<Np>,
    current_supply: &Fixed<Np>,
    protocol_fee_pct: &Fixed<Np>,
    gyro_portion: &Fixed<Np>,
) -> Result<ProtocolFees, ClpError> {
    let one = Fixed::<Np>::one();
    for fraction in [protocol_fee_pct, gyro_portion] {
        if fraction.is_negative() || fraction > &one {
            return Err(ClpError::ParameterValidation("fee fraction outside [0, 1]"));
        }
    }
    if current_invariant <= previous_invariant || protocol_fee_pct.is_zero() {
        return Ok(ProtocolFees::none());
    }

    let growth = current_invariant.safe_sub(previous_invariant)?;
    let diff = protocol_fee_pct.mul_down(&growth)?;
    let shares = diff
        .mul_down(current_supply)?
        .div_down(&current_invariant.safe_sub(&diff)?)?;
    let gyro = shares.mul_down(gyro_portion)?;
    let other = shares.safe_sub(&gyro)?;
    tracing::debug!(%growth, %shares, "protocol fees on invariant growth");
    Ok(ProtocolFees { gyro, other })
}
