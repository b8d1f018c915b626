//! Constant ellipse market maker (CEMM) curve.
//!
//! Same geometry and swap math as [`EclpCurve`](super::EclpCurve); the
//! invariant divides by `AChi·AChi - 1` computed at 18 decimals, which
//! leaves a looser error bound for strongly stretched curves.

use crate::config::{EllipseConfig, SwapLimits};
use crate::domain::{Balances, InvariantPair, InvariantWithError, TokenIndex};
use crate::error::ClpError;
use crate::math::{Fixed, Np};
use crate::traits::{two_asset_direction, FromConfig, InvariantCurve};

use super::ellipse::{self, swap};

/// A CEMM curve, created from an [`EllipseConfig`] via [`FromConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CemmCurve {
    config: EllipseConfig,
}

impl CemmCurve {
    #[must_use]
    pub const fn config(&self) -> &EllipseConfig {
        &self.config
    }
}

impl FromConfig<EllipseConfig> for CemmCurve {
    fn from_config(config: &EllipseConfig) -> Result<Self, ClpError> {
        config.validate()?;
        tracing::debug!(
            alpha = %config.params().alpha(),
            beta = %config.params().beta(),
            lambda = %config.params().lambda(),
            "created CEMM curve"
        );
        Ok(Self {
            config: config.clone(),
        })
    }
}

impl InvariantCurve for CemmCurve {
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
        ellipse::cemm_invariant_with_error(
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
