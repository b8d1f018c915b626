//! The polymorphic invariant and swap contract shared by every curve.
//!
//! [`InvariantCurve`] covers the full per-call surface of a curve:
//!
//! 1. **Solve**: [`InvariantCurve::calculate_invariant_with_error`] and
//!    [`InvariantCurve::invariant_pair`] turn balances into an invariant
//!    estimate.
//! 2. **Price**: [`InvariantCurve::calc_out_given_in`] and
//!    [`InvariantCurve::calc_in_given_out`] solve a trade against a
//!    previously computed [`InvariantPair`].
//! 3. **Bound**: [`InvariantCurve::max_balance`] returns the feasibility
//!    ceiling of one asset.
//! 4. **Quote**: [`InvariantCurve::spot_price`] returns the marginal
//!    price at the current state.
//!
//! # Rounding Contract
//!
//! Every implementation rounds in favor of existing liquidity providers:
//!
//! ```text
//! amount_out  rounded down, derived with the asset-out offset from `under`
//! amount_in   rounded up,   derived with the asset-in offset from `over`
//! ```
//!
//! # Purity
//!
//! Curves hold only immutable parameters.  Balances are inputs and amounts
//! are outputs; no method mutates the curve.

use crate::config::SwapLimits;
use crate::domain::{Balances, InvariantPair, InvariantWithError, SwapKind, TokenIndex};
use crate::error::ClpError;
use crate::math::{Fixed, Np};

/// Invariant solver and swap pricing for one curve family.
///
/// # Errors
///
/// Methods return [`ClpError`]; the most common per-call variants are
///
/// - [`ClpError::InvalidBalances`]: wrong arity or an index outside the pool
/// - [`ClpError::RatioLimitExceeded`]: trade above the configured fraction
/// - [`ClpError::AssetBoundsExceeded`]: resulting balance infeasible
/// - [`ClpError::ArithmeticOverflow`] / [`ClpError::ArithmeticUnderflow`]
pub trait InvariantCurve {
    /// Number of assets the curve trades (2 or 3).
    #[must_use]
    fn num_tokens(&self) -> usize;

    /// Per-trade ratio limits.
    #[must_use]
    fn swap_limits(&self) -> &SwapLimits;

    /// Point estimate of the invariant with its error bound.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::InvalidBalances`] for the wrong arity, plus any
    /// arithmetic or family-specific failure.
    fn calculate_invariant_with_error(
        &self,
        balances: &Balances,
    ) -> Result<InvariantWithError, ClpError>;

    /// Conservative `(over, under)` bracket of the invariant.
    ///
    /// # Errors
    ///
    /// Same as [`InvariantCurve::calculate_invariant_with_error`].
    fn invariant_pair(&self, balances: &Balances) -> Result<InvariantPair, ClpError>;

    /// Point estimate of the invariant, biased low.
    ///
    /// # Errors
    ///
    /// Same as [`InvariantCurve::calculate_invariant_with_error`].
    fn calculate_invariant(&self, balances: &Balances) -> Result<Fixed<Np>, ClpError> {
        self.calculate_invariant_with_error(balances)
            .map(|estimate| estimate.invariant().clone())
    }

    /// Amount of `token_out` paid for `amount_in` of `token_in`, rounded
    /// down.
    ///
    /// # Errors
    ///
    /// - [`ClpError::RatioLimitExceeded`] if either side exceeds its limit.
    /// - [`ClpError::AssetBoundsExceeded`] if the trade leaves the curve.
    fn calc_out_given_in(
        &self,
        balances: &Balances,
        token_in: TokenIndex,
        token_out: TokenIndex,
        amount_in: &Fixed<Np>,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError>;

    /// Amount of `token_in` charged for `amount_out` of `token_out`, rounded
    /// up.
    ///
    /// # Errors
    ///
    /// Same as [`InvariantCurve::calc_out_given_in`].
    fn calc_in_given_out(
        &self,
        balances: &Balances,
        token_in: TokenIndex,
        token_out: TokenIndex,
        amount_out: &Fixed<Np>,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError>;

    /// Solves whichever side `kind` leaves open.
    ///
    /// # Errors
    ///
    /// Same as [`InvariantCurve::calc_out_given_in`].
    fn solve_swap(
        &self,
        kind: SwapKind,
        balances: &Balances,
        token_in: TokenIndex,
        token_out: TokenIndex,
        amount: &Fixed<Np>,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        match kind {
            SwapKind::GivenIn => self.calc_out_given_in(
                balances,
                token_in,
                token_out,
                amount,
                invariant,
            ),
            SwapKind::GivenOut => self.calc_in_given_out(
                balances,
                token_in,
                token_out,
                amount,
                invariant,
            ),
        }
    }

    /// Largest balance of `token` the curve can hold at this invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::UnsupportedOperation`] for families without a
    /// per-asset ceiling.
    fn max_balance(
        &self,
        token: TokenIndex,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError>;

    /// Marginal price of `base` in units of `quote`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::InvalidBalances`] for an index outside the pool
    /// and [`ClpError::DivisionByZero`] at a degenerate state.
    fn spot_price(
        &self,
        balances: &Balances,
        base: TokenIndex,
        quote: TokenIndex,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError>;
}

/// Maps a two-asset `(token_in, token_out)` request to the
/// `asset_in_is_first` flag.
///
/// # Errors
///
/// Returns [`ClpError::InvalidBalances`] unless the indices are
/// `(First, Second)` or `(Second, First)`.
pub fn two_asset_direction(token_in: TokenIndex, token_out: TokenIndex) -> Result<bool, ClpError> {
    match (token_in, token_out) {
        (TokenIndex::First, TokenIndex::Second) => Ok(true),
        (TokenIndex::Second, TokenIndex::First) => Ok(false),
        _ => Err(ClpError::InvalidBalances("two-asset curve expects assets 0 and 1")),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trips() {
        for first in [true, false] {
            let (token_in, token_out) = TokenIndex::from_asset_in_is_first(first);
            assert_eq!(two_asset_direction(token_in, token_out), Ok(first));
        }
    }

    #[test]
    fn direction_rejects_bad_pairs() {
        assert!(two_asset_direction(TokenIndex::First, TokenIndex::First).is_err());
        assert!(two_asset_direction(TokenIndex::First, TokenIndex::Third).is_err());
    }
}
