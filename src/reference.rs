//! Ground-truth solvers at 100 decimals.
//!
//! These evaluate the plain algebra of each curve with no conservative
//! rounding: every product and quotient rounds toward zero at [`Wide`]
//! scale, so the results agree with the exact values to far more digits
//! than the 18-decimal engine carries.  Differential tests check that the
//! engine's invariant brackets contain these roots and that its swap
//! outputs stay on the right side of them.

use crate::config::{EllipseParams, ThreeClpParams, TwoClpParams};
use crate::curves::ellipse::{scalar_prod, EllipseShape};
use crate::domain::{Balances, Rounding, TokenIndex, Vector2};
use crate::error::ClpError;
use crate::math::{pow10, Fixed, Np, Wide};

const NEWTON_BUDGET: u32 = 255;

/// Lifts an 18-decimal value to 100 decimals (exact).
///
/// # Errors
///
/// Never fails for 18-decimal input; the `Result` follows
/// [`Fixed::rescale`].
pub fn lift(value: &Fixed<Np>) -> Result<Fixed<Wide>, ClpError> {
    value.rescale::<Wide>(Rounding::Down)
}

fn lifted(balances: &Balances, token: TokenIndex) -> Result<Fixed<Wide>, ClpError> {
    lift(balances.get(token)?)
}

/// Positive root of `a·L² - b·L - c = 0`: `(b + √(b² + 4ac)) / 2a`.
///
/// # Errors
///
/// Returns [`ClpError::DivisionByZero`] when `a` vanishes.
pub fn two_clp_invariant(
    balances: &Balances,
    params: &TwoClpParams,
) -> Result<Fixed<Wide>, ClpError> {
    balances.expect_len(2)?;
    let (x, y) = (lifted(balances, TokenIndex::First)?, lifted(balances, TokenIndex::Second)?);
    let (sqrt_alpha, sqrt_beta) = (lift(params.sqrt_alpha())?, lift(params.sqrt_beta())?);

    let a = Fixed::<Wide>::one().checked_sub(&sqrt_alpha.div_down(&sqrt_beta)?)?;
    let b = y.div_down(&sqrt_beta)?.checked_add(&x.mul_down(&sqrt_alpha)?)?;
    let c = x.mul_down(&y)?;
    let discriminant = b.mul_down(&b)?.checked_add(&a.mul_down(&c)?.mul_int(4)?)?;
    b.checked_add(&discriminant.sqrt()?)?.div_down(&a.mul_int(2)?)
}

/// Root of the 3CLP cubic `a·L³ - b·L² - c·L - d` by Newton's method.
///
/// ```text
/// a = 1 - r³    b = (x + y + z)·r²    c = (xy + yz + zx)·r    d = xyz
/// ```
///
/// # Errors
///
/// Returns [`ClpError::NumericalInstability`] if the step does not fall
/// below `1e-80` within 255 iterations.
pub fn three_clp_invariant(
    balances: &Balances,
    params: &ThreeClpParams,
) -> Result<Fixed<Wide>, ClpError> {
    balances.expect_len(3)?;
    let x = lifted(balances, TokenIndex::First)?;
    let y = lifted(balances, TokenIndex::Second)?;
    let z = lifted(balances, TokenIndex::Third)?;
    if x.is_zero() && y.is_zero() && z.is_zero() {
        return Ok(Fixed::zero());
    }
    let r = lift(params.root3_alpha())?;
    let r2 = r.mul_down(&r)?;

    let a = Fixed::<Wide>::one().checked_sub(&r2.mul_down(&r)?)?;
    let b = x.checked_add(&y)?.checked_add(&z)?.mul_down(&r2)?;
    let c = x
        .mul_down(&y)?
        .checked_add(&y.mul_down(&z)?)?
        .checked_add(&z.mul_down(&x)?)?
        .mul_down(&r)?;
    let d = x.mul_down(&y)?.mul_down(&z)?;

    let three_a = a.mul_int(3)?;
    let local_minimum = b
        .checked_add(&b.mul_down(&b)?.checked_add(&c.mul_down(&three_a)?)?.sqrt()?)?
        .div_down(&three_a)?;
    let mut l = local_minimum.mul_int(3)?.div_int(2, Rounding::Down)?;
    let tolerance = Fixed::<Wide>::from_raw(pow10(20));

    for _ in 0..NEWTON_BUDGET {
        let l2 = l.mul_down(&l)?;
        let f = a
            .mul_down(&l2)?
            .mul_down(&l)?
            .checked_sub(&b.mul_down(&l2)?)?
            .checked_sub(&c.mul_down(&l)?)?
            .checked_sub(&d)?;
        let df = three_a
            .mul_down(&l2)?
            .checked_sub(&b.mul_down(&l)?.mul_int(2)?)?
            .checked_sub(&c)?;
        let delta = f.div_down(&df)?;
        l = l.checked_sub(&delta)?;
        if delta.abs() <= tolerance {
            return Ok(l);
        }
    }
    Err(ClpError::NumericalInstability {
        iterations: NEWTON_BUDGET,
    })
}

/// Plain-algebra model of an ellipse curve.
///
/// Holds the normalized shape and the two boundary vectors; everything
/// else is recomputed per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EllipseReference {
    shape: EllipseShape<Wide>,
    tau_alpha: Vector2<Wide>,
    tau_beta: Vector2<Wide>,
}

impl EllipseReference {
    /// Derives the reference model from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::DivisionByZero`] for a degenerate rotation.
    pub fn new(params: &EllipseParams) -> Result<Self, ClpError> {
        let shape = EllipseShape::<Wide>::normalized(params)?;
        let tau_alpha = shape.tau(&lift(params.alpha())?)?;
        let tau_beta = shape.tau(&lift(params.beta())?)?;
        Ok(Self {
            shape,
            tau_alpha,
            tau_beta,
        })
    }

    /// Boundary vector at the lower price bound.
    #[must_use]
    pub const fn tau_alpha(&self) -> &Vector2<Wide> {
        &self.tau_alpha
    }

    /// Boundary vector at the upper price bound.
    #[must_use]
    pub const fn tau_beta(&self) -> &Vector2<Wide> {
        &self.tau_beta
    }

    /// `χ = ((A⁻¹τβ)x, (A⁻¹τα)y)`, the offset direction.
    fn chi(&self) -> Result<Vector2<Wide>, ClpError> {
        Ok(Vector2::new(
            self.shape.mul_a_inv(&self.tau_beta)?.x().clone(),
            self.shape.mul_a_inv(&self.tau_alpha)?.y().clone(),
        ))
    }

    /// Invariant `r = (b + √(b² - ac)) / a` with
    /// `a = Aχ·Aχ - 1`, `b = At·Aχ`, `c = At·At`.
    ///
    /// # Errors
    ///
    /// - [`ClpError::InvalidBalances`] for anything but two balances.
    /// - [`ClpError::DivisionByZero`] when `Aχ·Aχ = 1`.
    pub fn invariant(&self, balances: &Balances) -> Result<Fixed<Wide>, ClpError> {
        balances.expect_len(2)?;
        let t = Vector2::new(
            lifted(balances, TokenIndex::First)?,
            lifted(balances, TokenIndex::Second)?,
        );
        let at = self.shape.mul_a(&t)?;
        let a_chi = self.shape.mul_a(&self.chi()?)?;

        let a = scalar_prod(&a_chi, &a_chi)?.checked_sub(&Fixed::one())?;
        let b = scalar_prod(&at, &a_chi)?;
        let c = scalar_prod(&at, &at)?;
        let discriminant = b.mul_down(&b)?.checked_sub(&a.mul_down(&c)?)?;
        b.checked_add(&discriminant.sqrt()?)?.div_down(&a)
    }

    /// Virtual offsets `(a, b) = r·χ`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn offsets(&self, r: &Fixed<Wide>) -> Result<(Fixed<Wide>, Fixed<Wide>), ClpError> {
        let chi = self.chi()?;
        Ok((r.mul_down(chi.x())?, r.mul_down(chi.y())?))
    }

    /// Balance ceilings `r·(A⁻¹τβ - A⁻¹τα)x` and `r·(A⁻¹τα - A⁻¹τβ)y`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn max_balances(&self, r: &Fixed<Wide>) -> Result<(Fixed<Wide>, Fixed<Wide>), ClpError> {
        let at_alpha = self.shape.mul_a_inv(&self.tau_alpha)?;
        let at_beta = self.shape.mul_a_inv(&self.tau_beta)?;
        Ok((
            r.mul_down(&at_beta.x().checked_sub(at_alpha.x())?)?,
            r.mul_down(&at_alpha.y().checked_sub(at_beta.y())?)?,
        ))
    }

    /// `1 - 1/λ²`.
    fn stretch_term(&self) -> Result<Fixed<Wide>, ClpError> {
        let lambda = self.shape.lambda();
        Fixed::<Wide>::one().checked_sub(&Fixed::one().div_down(&lambda.mul_down(lambda)?)?)
    }

    /// Lower-branch root of the ellipse quadratic in the shifted
    /// coordinate `q` for a given shifted `p`; `(cp, cq)` pick the axis.
    fn solve_branch(
        &self,
        p: &Fixed<Wide>,
        r: &Fixed<Wide>,
        cp: &Fixed<Wide>,
        cq: &Fixed<Wide>,
    ) -> Result<Fixed<Wide>, ClpError> {
        let ls = self.stretch_term()?;
        let one = Fixed::<Wide>::one();
        let (s, c) = (self.shape.s(), self.shape.c());
        let cross = s.mul_down(c)?.mul_down(&ls)?.mul_down(p)?;
        let lead = one.checked_sub(&ls.mul_down(&cq.mul_down(cq)?)?)?;
        let tail = one
            .checked_sub(&ls.mul_down(&cp.mul_down(cp)?)?)?
            .mul_down(&p.mul_down(p)?)?
            .checked_sub(&r.mul_down(r)?)?;
        let discriminant = cross.mul_down(&cross)?.checked_sub(&lead.mul_down(&tail)?)?;
        (-cross).checked_sub(&discriminant.sqrt()?)?.div_down(&lead)
    }

    /// Balance of asset 1 on the curve for balance `x` of asset 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticUnderflow`] when `x` is off the curve.
    pub fn y_for_x(&self, x: &Fixed<Wide>, r: &Fixed<Wide>) -> Result<Fixed<Wide>, ClpError> {
        let (a, b) = self.offsets(r)?;
        let shifted = self.solve_branch(&x.checked_sub(&a)?, r, self.shape.c(), self.shape.s())?;
        shifted.checked_add(&b)
    }

    /// Balance of asset 0 on the curve for balance `y` of asset 1.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticUnderflow`] when `y` is off the curve.
    pub fn x_for_y(&self, y: &Fixed<Wide>, r: &Fixed<Wide>) -> Result<Fixed<Wide>, ClpError> {
        let (a, b) = self.offsets(r)?;
        let shifted = self.solve_branch(&y.checked_sub(&b)?, r, self.shape.s(), self.shape.c())?;
        shifted.checked_add(&a)
    }

    /// Price of asset 0 in asset 1 at `balances` on the curve of radius `r`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::DivisionByZero`] at a degenerate state.
    pub fn spot_price(
        &self,
        balances: &Balances,
        r: &Fixed<Wide>,
    ) -> Result<Fixed<Wide>, ClpError> {
        balances.expect_len(2)?;
        let (a, b) = self.offsets(r)?;
        let shifted = Vector2::new(
            lifted(balances, TokenIndex::First)?.checked_sub(&a)?,
            lifted(balances, TokenIndex::Second)?.checked_sub(&b)?,
        );
        let image = self.shape.mul_a(&shifted)?;
        self.shape.price_from_circle(&image.x().div_down(image.y())?)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn np(s: &str) -> Fixed<Np> {
        let Ok(v) = s.parse() else {
            panic!("valid decimal {s}");
        };
        v
    }

    fn wide(s: &str) -> Fixed<Wide> {
        let Ok(v) = s.parse() else {
            panic!("valid decimal {s}");
        };
        v
    }

    fn close(a: &Fixed<Wide>, b: &Fixed<Wide>, tol: &str) -> bool {
        let Ok(diff) = a.checked_sub(b) else {
            return false;
        };
        diff.abs() <= wide(tol)
    }

    fn balances(values: &[&str]) -> Balances {
        let Ok(b) = Balances::from_decimals(values) else {
            panic!("valid balances");
        };
        b
    }

    fn ellipse() -> EllipseReference {
        let c = np("0.707106781186547524");
        let Ok(params) = EllipseParams::new(np("0.97"), np("1.02"), c.clone(), c, np("2")) else {
            panic!("valid params");
        };
        let Ok(reference) = EllipseReference::new(&params) else {
            panic!("reference");
        };
        reference
    }

    // -- Constant-product roots -----------------------------------------------

    #[test]
    fn two_clp_root() {
        let Ok(params) = TwoClpParams::new(np("0.97"), np("1.02")) else {
            panic!("params");
        };
        let Ok(l) = two_clp_invariant(&balances(&["100", "200"]), &params) else {
            panic!("root");
        };
        assert!(close(&l, &wide("6046.279513490840875146896120940607"), "1e-29"));
    }

    #[test]
    fn three_clp_root() {
        let Ok(params) = ThreeClpParams::new(np("0.99")) else {
            panic!("params");
        };
        let Ok(l) = three_clp_invariant(&balances(&["100", "200", "300"]), &params) else {
            panic!("root");
        };
        assert!(close(&l, &wide("19983.319421248345915654604867389629"), "1e-29"));
        let Ok(zero) = three_clp_invariant(&balances(&["0", "0", "0"]), &params) else {
            panic!("zero");
        };
        assert!(zero.is_zero());
    }

    // -- Ellipse ----------------------------------------------------------------

    #[test]
    fn ellipse_invariant_and_offsets() {
        let reference = ellipse();
        let Ok(r) = reference.invariant(&balances(&["100", "100"])) else {
            panic!("invariant");
        };
        assert!(close(&r, &wide("2832.681766435195111918219409298"), "1e-27"));
        let Ok((a, b)) = reference.offsets(&r) else {
            panic!("offsets");
        };
        assert!(close(&a, &wide("2081.927413704108376275997804284"), "1e-27"));
        assert!(close(&b, &wide("2124.034235348660951147836922160"), "1e-27"));
    }

    #[test]
    fn ellipse_point_lies_on_curve() {
        let reference = ellipse();
        let Ok(r) = reference.invariant(&balances(&["100", "100"])) else {
            panic!("invariant");
        };
        let Ok(y) = reference.y_for_x(&wide("100"), &r) else {
            panic!("y");
        };
        let Ok(x) = reference.x_for_y(&wide("100"), &r) else {
            panic!("x");
        };
        assert!(close(&y, &wide("100"), "1e-80"));
        assert!(close(&x, &wide("100"), "1e-80"));
        let Ok(moved) = reference.y_for_x(&wide("110"), &r) else {
            panic!("moved");
        };
        assert!(close(&moved, &wide("90.064786145958002357667293109878"), "1e-27"));
    }

    #[test]
    fn ellipse_price_and_ceilings() {
        let reference = ellipse();
        let state = balances(&["100", "100"]);
        let Ok(r) = reference.invariant(&state) else {
            panic!("invariant");
        };
        let Ok(px) = reference.spot_price(&state, &r) else {
            panic!("price");
        };
        assert!(close(&px, &wide("0.994758254234976775333207047616"), "1e-27"));
        let Ok((x_max, y_max)) = reference.max_balances(&r) else {
            panic!("ceilings");
        };
        assert!(close(&x_max, &wide("201.801415907446768800639763137"), "1e-27"));
        assert!(close(&y_max, &wide("200.729862688675117826200855345"), "1e-27"));
    }
}
