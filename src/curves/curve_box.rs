//! Enum dispatch wrapper for all curve families.
//!
//! [`CurveBox`] holds any concrete curve behind one type so callers can
//! keep heterogeneous collections without trait objects. Each variant is
//! gated by the feature of its curve.

#[cfg(feature = "cemm")]
use super::cemm::CemmCurve;
#[cfg(feature = "eclp")]
use super::eclp::EclpCurve;
#[cfg(feature = "three-clp")]
use super::three_clp::ThreeClpCurve;
#[cfg(feature = "two-clp")]
use super::two_clp::TwoClpCurve;

use crate::config::SwapLimits;
use crate::domain::{Balances, InvariantPair, InvariantWithError, TokenIndex};
use crate::error::ClpError;
use crate::math::{Fixed, Np};
use crate::traits::InvariantCurve;

/// Static dispatch over every enabled curve family.
///
/// Implements [`InvariantCurve`] by delegating each call to the inner
/// curve with a `match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveBox {
    /// Two-asset bounded constant product.
    #[cfg(feature = "two-clp")]
    TwoClp(Box<TwoClpCurve>),

    /// Three-asset bounded constant product.
    #[cfg(feature = "three-clp")]
    ThreeClp(Box<ThreeClpCurve>),

    /// Ellipse with the normal-precision denominator.
    #[cfg(feature = "cemm")]
    Cemm(Box<CemmCurve>),

    /// Ellipse with the certified extra-precision error bound.
    #[cfg(feature = "eclp")]
    Eclp(Box<EclpCurve>),
}

impl CurveBox {
    /// Short family name, matching [`CurveConfig`](crate::config::CurveConfig)'s
    /// `Display`.
    #[must_use]
    pub const fn family(&self) -> &'static str {
        match *self {
            #[cfg(feature = "two-clp")]
            Self::TwoClp(_) => "2CLP",
            #[cfg(feature = "three-clp")]
            Self::ThreeClp(_) => "3CLP",
            #[cfg(feature = "cemm")]
            Self::Cemm(_) => "CEMM",
            #[cfg(feature = "eclp")]
            Self::Eclp(_) => "ECLP",
        }
    }
}

macro_rules! delegate {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match *$self {
            #[cfg(feature = "two-clp")]
            CurveBox::TwoClp(ref c) => c.$method($($arg),*),
            #[cfg(feature = "three-clp")]
            CurveBox::ThreeClp(ref c) => c.$method($($arg),*),
            #[cfg(feature = "cemm")]
            CurveBox::Cemm(ref c) => c.$method($($arg),*),
            #[cfg(feature = "eclp")]
            CurveBox::Eclp(ref c) => c.$method($($arg),*),
        }
    };
}

impl InvariantCurve for CurveBox {
    fn num_tokens(&self) -> usize {
        delegate!(self, num_tokens())
    }

    fn swap_limits(&self) -> &SwapLimits {
        delegate!(self, swap_limits())
    }

    fn calculate_invariant_with_error(
        &self,
        balances: &Balances,
    ) -> Result<InvariantWithError, ClpError> {
        delegate!(self, calculate_invariant_with_error(balances))
    }

    fn invariant_pair(&self, balances: &Balances) -> Result<InvariantPair, ClpError> {
        delegate!(self, invariant_pair(balances))
    }

    fn calc_out_given_in(
        &self,
        balances: &Balances,
        token_in: TokenIndex,
        token_out: TokenIndex,
        amount_in: &Fixed<Np>,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        delegate!(self, calc_out_given_in(balances, token_in, token_out, amount_in, invariant))
    }

    fn calc_in_given_out(
        &self,
        balances: &Balances,
        token_in: TokenIndex,
        token_out: TokenIndex,
        amount_out: &Fixed<Np>,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        delegate!(self, calc_in_given_out(balances, token_in, token_out, amount_out, invariant))
    }

    fn max_balance(
        &self,
        token: TokenIndex,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        delegate!(self, max_balance(token, invariant))
    }

    fn spot_price(
        &self,
        balances: &Balances,
        base: TokenIndex,
        quote: TokenIndex,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        delegate!(self, spot_price(balances, base, quote, invariant))
    }
}
