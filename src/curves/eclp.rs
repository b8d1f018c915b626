//! Elliptic concentrated liquidity pool (ECLP) curve.
//!
//! The trading curve is a circle of radius `r` mapped through a rotation
//! `(c, s)` and a stretch `λ`, then translated by the virtual offsets so
//! that prices stay inside `[alpha, beta]`.
//!
//! # Invariant
//!
//! The invariant denominator `AChi·AChi - 1` is kept at 38 decimals and its
//! reciprocal multiplies both the estimate and the error, so the error
//! bound stays certified even for strongly stretched curves:
//!
//! ```text
//! inv = (At·AChi + sqrt - err) · (1/den)
//! err = err · (1/den) + inv · (1/den) · ⌊λ²⌋ · 40 / 1e38 + 1 wei
//! ```
//!
//! The bracket handed to swaps is `(inv + 2·err, inv)`.

use crate::config::{EllipseConfig, SwapLimits};
use crate::domain::{Balances, InvariantPair, InvariantWithError, TokenIndex};
use crate::error::ClpError;
use crate::math::{Fixed, Np};
use crate::traits::{two_asset_direction, FromConfig, InvariantCurve};

use super::ellipse::{self, swap};

/// An ECLP curve.
///
/// Created from an [`EllipseConfig`] via [`FromConfig`]; the derived
/// constants are validated once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EclpCurve {
    config: EllipseConfig,
}

impl EclpCurve {
    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &EllipseConfig {
        &self.config
    }

    /// Virtual offsets `(a, b)` for the bracket `invariant`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn virtual_offsets(
        &self,
        invariant: &InvariantPair,
    ) -> Result<(Fixed<Np>, Fixed<Np>), ClpError> {
        let (params, derived) = (self.config.params(), self.config.derived());
        Ok((
            swap::virtual_offset0(params, derived, invariant)?,
            swap::virtual_offset1(params, derived, invariant)?,
        ))
    }
}

impl FromConfig<EllipseConfig> for EclpCurve {
    fn from_config(config: &EllipseConfig) -> Result<Self, ClpError> {
        config.validate()?;
        tracing::debug!(
            alpha = %config.params().alpha(),
            beta = %config.params().beta(),
            lambda = %config.params().lambda(),
            "created ECLP curve"
        );
        Ok(Self {
            config: config.clone(),
        })
    }
}

impl InvariantCurve for EclpCurve {
    fn num_tokens(&self) -> usize {
        2
    }

    fn swap_limits(&self) -> &SwapLimits {
        self.config.limits()
    }

    fn calculate_invariant_with_error(
        &self,
        balances: &Balances,
    ) -> Result<InvariantWithError, ClpError> {
        balances.expect_len(2)?;
        ellipse::eclp_invariant_with_error(
            balances.get(TokenIndex::First)?,
            balances.get(TokenIndex::Second)?,
            self.config.params(),
            self.config.derived(),
        )
    }

    fn invariant_pair(&self, balances: &Balances) -> Result<InvariantPair, ClpError> {
        self.calculate_invariant_with_error(balances)?.to_shifted_pair()
    }

    fn calc_out_given_in(
        &self,
        balances: &Balances,
        token_in: TokenIndex,
        token_out: TokenIndex,
        amount_in: &Fixed<Np>,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        swap::calc_out_given_in(
            balances,
            amount_in,
            two_asset_direction(token_in, token_out)?,
            self.config.params(),
            self.config.derived(),
            invariant,
            self.config.limits(),
        )
    }

    fn calc_in_given_out(
        &self,
        balances: &Balances,
        token_in: TokenIndex,
        token_out: TokenIndex,
        amount_out: &Fixed<Np>,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        swap::calc_in_given_out(
            balances,
            amount_out,
            two_asset_direction(token_in, token_out)?,
            self.config.params(),
            self.config.derived(),
            invariant,
            self.config.limits(),
        )
    }

    fn max_balance(
        &self,
        token: TokenIndex,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        swap::max_balance(self.config.params(), self.config.derived(), invariant, token)
    }

    fn spot_price(
        &self,
        balances: &Balances,
        base: TokenIndex,
        quote: TokenIndex,
        invariant: &InvariantPair,
    ) -> Result<Fixed<Np>, ClpError> {
        ellipse::spot_price(&self.config, balances, base, quote, invariant)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::EllipseParams;

    fn np(s: &str) -> Fixed<Np> {
        let Ok(v) = s.parse() else {
            panic!("valid decimal {s}");
        };
        v
    }

    fn curve() -> EclpCurve {
        let c = np("0.707106781186547524");
        let Ok(params) = EllipseParams::new(np("0.97"), np("1.02"), c.clone(), c, np("2")) else {
            panic!("valid params");
        };
        let Ok(cfg) = EllipseConfig::new(params, SwapLimits::default()) else {
            panic!("valid config");
        };
        let Ok(curve) = EclpCurve::from_config(&cfg) else {
            panic!("curve");
        };
        curve
    }

    fn balanced() -> Balances {
        let Ok(b) = Balances::pair(np("100"), np("100")) else {
            panic!("balances");
        };
        b
    }

    // -- Invariant ----------------------------------------------------------

    #[test]
    fn pair_brackets_point_estimate() {
        let curve = curve();
        let Ok(estimate) = curve.calculate_invariant_with_error(&balanced()) else {
            panic!("estimate");
        };
        let Ok(pair) = curve.invariant_pair(&balanced()) else {
            panic!("pair");
        };
        assert_eq!(pair.under(), estimate.invariant());
        assert!(pair.over() > pair.under());
        let Ok(point) = curve.calculate_invariant(&balanced()) else {
            panic!("point");
        };
        assert_eq!(&point, estimate.invariant());
    }

    #[test]
    fn rejects_three_balances() {
        let Ok(b) = Balances::triple(np("1"), np("1"), np("1")) else {
            panic!("balances");
        };
        assert!(matches!(
            curve().calculate_invariant_with_error(&b),
            Err(ClpError::InvalidBalances(_))
        ));
    }

    // -- Trades -------------------------------------------------------------

    #[test]
    fn solve_swap_dispatches() {
        let curve = curve();
        let Ok(pair) = curve.invariant_pair(&balanced()) else {
            panic!("pair");
        };
        let Ok(out) = curve.solve_swap(
            crate::domain::SwapKind::GivenIn,
            &balanced(),
            TokenIndex::First,
            TokenIndex::Second,
            &np("1"),
            &pair,
        ) else {
            panic!("swap");
        };
        let Ok(direct) = curve.calc_out_given_in(
            &balanced(),
            TokenIndex::First,
            TokenIndex::Second,
            &np("1"),
            &pair,
        ) else {
            panic!("direct");
        };
        assert_eq!(out, direct);
    }

    #[test]
    fn third_asset_rejected() {
        let curve = curve();
        let Ok(pair) = curve.invariant_pair(&balanced()) else {
            panic!("pair");
        };
        assert!(curve
            .calc_out_given_in(&balanced(), TokenIndex::First, TokenIndex::Third, &np("1"), &pair)
            .is_err());
        assert!(curve.max_balance(TokenIndex::Third, &pair).is_err());
    }

    #[test]
    fn spot_prices_are_reciprocal() {
        let curve = curve();
        let Ok(pair) = curve.invariant_pair(&balanced()) else {
            panic!("pair");
        };
        let Ok(px) = curve.spot_price(
            &balanced(),
            TokenIndex::First,
            TokenIndex::Second,
            &pair,
        ) else {
            panic!("px");
        };
        let Ok(inv) = curve.spot_price(
            &balanced(),
            TokenIndex::Second,
            TokenIndex::First,
            &pair,
        ) else {
            panic!("inverse");
        };
        let product = px.to_f64_lossy() * inv.to_f64_lossy();
        assert!((product - 1.0).abs() < 1e-12);
        assert!((px.to_f64_lossy() - 0.994758254234977).abs() < 1e-9);
    }

    #[test]
    fn offsets_bracket_balances() {
        let curve = curve();
        let Ok(pair) = curve.invariant_pair(&balanced()) else {
            panic!("pair");
        };
        let Ok((a, b)) = curve.virtual_offsets(&pair) else {
            panic!("offsets");
        };
        assert!((a.to_f64_lossy() - 2081.927413704108).abs() < 1e-6);
        assert!((b.to_f64_lossy() - 2124.034235348661).abs() < 1e-6);
    }
}
