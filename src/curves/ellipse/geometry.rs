//! Linear algebra of the ellipse transform.
//!
//! The ellipse is the image of a unit circle under
//!
//! ```text
//! A = [  c/λ  -s/λ ]        A⁻¹ = [  λc   s ]
//!     [  s     c   ]              [ -λs   c ]
//! ```
//!
//! [`EllipseShape`] holds `(c, s, λ)` at any [`Scale`], so the same code
//! serves the 18-decimal spot price and the 100-decimal reference.  All
//! products and quotients round toward zero.

use crate::config::EllipseParams;
use crate::domain::{Rounding, Vector2};
use crate::error::ClpError;
use crate::math::{Fixed, Scale};

/// Rotation and stretch of an ellipse at scale `S`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EllipseShape<S: Scale> {
    c: Fixed<S>,
    s: Fixed<S>,
    lambda: Fixed<S>,
}

impl<S: Scale> EllipseShape<S> {
    /// Wraps raw components.
    #[must_use]
    pub const fn new(c: Fixed<S>, s: Fixed<S>, lambda: Fixed<S>) -> Self {
        Self { c, s, lambda }
    }

    /// Lifts the parameters to scale `S` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] if a component does not fit.
    pub fn from_params(params: &EllipseParams) -> Result<Self, ClpError> {
        Ok(Self::new(
            params.c().rescale(Rounding::Down)?,
            params.s().rescale(Rounding::Down)?,
            params.lambda().rescale(Rounding::Down)?,
        ))
    }

    /// Lifts the parameters to scale `S` and divides `(c, s)` by its norm.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::DivisionByZero`] for a zero rotation vector.
    pub fn normalized(params: &EllipseParams) -> Result<Self, ClpError> {
        let raw = Self::from_params(params)?;
        let norm = raw.c.mul_down(&raw.c)?.checked_add(&raw.s.mul_down(&raw.s)?)?.sqrt()?;
        Ok(Self::new(raw.c.div_down(&norm)?, raw.s.div_down(&norm)?, raw.lambda))
    }

    /// Cosine component.
    #[must_use]
    pub const fn c(&self) -> &Fixed<S> {
        &self.c
    }

    /// Sine component.
    #[must_use]
    pub const fn s(&self) -> &Fixed<S> {
        &self.s
    }

    /// Stretch factor.
    #[must_use]
    pub const fn lambda(&self) -> &Fixed<S> {
        &self.lambda
    }

    /// `A · t`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn mul_a(&self, t: &Vector2<S>) -> Result<Vector2<S>, ClpError> {
        let x = self
            .c
            .mul_down(t.x())?
            .div_down(&self.lambda)?
            .checked_sub(&self.s.mul_down(t.y())?.div_down(&self.lambda)?)?;
        let y = self.s.mul_down(t.x())?.checked_add(&self.c.mul_down(t.y())?)?;
        Ok(Vector2::new(x, y))
    }

    /// `A⁻¹ · t`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ArithmeticOverflow`] on overflow.
    pub fn mul_a_inv(&self, t: &Vector2<S>) -> Result<Vector2<S>, ClpError> {
        let x = t
            .x()
            .mul_down(&self.lambda)?
            .mul_down(&self.c)?
            .checked_add(&self.s.mul_down(t.y())?)?;
        let y = (-t.x())
            .mul_down(&self.lambda)?
            .mul_down(&self.s)?
            .checked_add(&self.c.mul_down(t.y())?)?;
        Ok(Vector2::new(x, y))
    }

    /// Maps a price on the ellipse to the price at the corresponding point
    /// of the untransformed circle.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::DivisionByZero`] if `A · (-1, px)` has a zero
    /// first component.
    pub fn zeta(&self, px: &Fixed<S>) -> Result<Fixed<S>, ClpError> {
        let nd = self.mul_a(&Vector2::new(-Fixed::<S>::one(), px.clone()))?;
        (-nd.y()).div_down(nd.x())
    }

    /// `eta(zeta(px))`: the boundary vector for price `px`.
    ///
    /// # Errors
    ///
    /// See [`EllipseShape::zeta`] and [`eta`].
    pub fn tau(&self, px: &Fixed<S>) -> Result<Vector2<S>, ClpError> {
        eta(&self.zeta(px)?)
    }

    /// Inverse of [`EllipseShape::zeta`]: the ellipse price for a circle
    /// price `pxc`.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::DivisionByZero`] at a vertical tangent.
    pub fn price_from_circle(&self, pxc: &Fixed<S>) -> Result<Fixed<S>, ClpError> {
        let numerator = pxc
            .mul_down(&self.c)?
            .div_down(&self.lambda)?
            .checked_add(&self.s)?;
        let denominator = (-pxc)
            .mul_down(&self.s)?
            .div_down(&self.lambda)?
            .checked_add(&self.c)?;
        numerator.div_down(&denominator)
    }
}

/// Point on the unit circle with slope `pxc`: `(pxc, 1) / sqrt(1 + pxc²)`.
///
/// # Errors
///
/// Returns [`ClpError::SqrtFailed`] or [`ClpError::ArithmeticOverflow`]
/// from the square root.
pub fn eta<S: Scale>(pxc: &Fixed<S>) -> Result<Vector2<S>, ClpError> {
    let one = Fixed::<S>::one();
    let z = one.checked_add(&pxc.mul_down(pxc)?)?.sqrt()?;
    Ok(Vector2::new(pxc.div_down(&z)?, one.div_down(&z)?))
}

/// `a · b`.
///
/// # Errors
///
/// Returns [`ClpError::ArithmeticOverflow`] on overflow.
pub fn scalar_prod<S: Scale>(a: &Vector2<S>, b: &Vector2<S>) -> Result<Fixed<S>, ClpError> {
    a.x().mul_down(b.x())?.checked_add(&a.y().mul_down(b.y())?)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::math::Wide;

    fn wide(s: &str) -> Fixed<Wide> {
        let Ok(v) = s.parse() else {
            panic!("valid decimal {s}");
        };
        v
    }

    fn rotated() -> EllipseShape<Wide> {
        let Ok(half) = wide("0.5").sqrt() else {
            panic!("sqrt");
        };
        EllipseShape::new(half.clone(), half, wide("2"))
    }

    fn close(a: &Fixed<Wide>, b: &Fixed<Wide>, tol: &str) -> bool {
        let Ok(diff) = a.checked_sub(b) else {
            return false;
        };
        diff.abs() <= wide(tol)
    }

    #[test]
    fn a_inverse_round_trips() {
        let shape = rotated();
        let t = Vector2::new(wide("3.25"), wide("-1.5"));
        let Ok(image) = shape.mul_a(&t) else {
            panic!("mul_a");
        };
        let Ok(back) = shape.mul_a_inv(&image) else {
            panic!("mul_a_inv");
        };
        assert!(close(back.x(), t.x(), "1e-90"));
        assert!(close(back.y(), t.y(), "1e-90"));
    }

    #[test]
    fn eta_is_normalized() {
        let Ok(point) = eta(&wide("-0.75")) else {
            panic!("eta");
        };
        let Ok(norm) = scalar_prod(&point, &point) else {
            panic!("norm");
        };
        assert!(close(&norm, &Fixed::one(), "1e-90"));
        assert!(point.x().is_negative());
    }

    #[test]
    fn zeta_inverts_price_from_circle() {
        let shape = rotated();
        let px = wide("0.97");
        let Ok(pxc) = shape.zeta(&px) else {
            panic!("zeta");
        };
        let Ok(back) = shape.price_from_circle(&pxc) else {
            panic!("price");
        };
        assert!(close(&back, &px, "1e-90"));
    }

    #[test]
    fn tau_matches_known_value() {
        let Ok(tau) = rotated().tau(&wide("0.97")) else {
            panic!("tau");
        };
        assert!(close(tau.x(), &wide("-0.030442736420992833"), "1e-17"));
        assert!(close(tau.y(), &wide("0.99953651248926467"), "1e-16"));
    }

    #[test]
    fn circle_price_is_identity() {
        let shape = EllipseShape::new(Fixed::<Wide>::one(), Fixed::zero(), Fixed::one());
        let Ok(pxc) = shape.zeta(&wide("1.5")) else {
            panic!("zeta");
        };
        assert!(close(&pxc, &wide("1.5"), "1e-99"));
    }
}
