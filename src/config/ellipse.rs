//! Configuration for the ellipse curve families (CEMM and ECLP).
//!
//! An ellipse curve is described by a price range `[alpha, beta]`, a
//! rotation `(c, s)` with `c² + s² ≈ 1` and a stretch factor `lambda >= 1`.
//! From these, [`DerivedEllipseParams`] precomputes the two boundary
//! vectors `tau_alpha`, `tau_beta` on the transformed unit circle and the
//! cross terms `u`, `v`, `w`, `z`, `d_sq` at 38 decimals.
//!
//! Derivation runs once at 100 decimals and truncates to Xp, so the
//! per-call invariant and swap code never takes a square root of a
//! parameter.
//!
//! # Validation
//!
//! | Check | Bound |
//! |-------|-------|
//! | rotation components | `0 <= c, s <= 1` |
//! | rotation norm | `\|c² + s² - 1\| <= 1e-15` |
//! | stretch | `1 <= lambda <= 1e8` |
//! | price range | `0 < alpha < beta` |
//! | boundary vectors | `\|‖tau‖² - 1\| <= 1e-15` |
//! | cross terms | `u, v, w, z <= 1` |
//! | `d_sq` | `\|d_sq - 1\| <= 1e-15` |
//! | conditioning | `1 / (AChi·AChi - 1) <= 1e5` |

use std::sync::LazyLock;

use crate::config::SwapLimits;
use crate::curves::ellipse::invariant::calc_a_chi_a_chi_in_xp;
use crate::domain::{Rounding, Vector2};
use crate::error::ClpError;
use crate::math::{pow10, Fixed, Np, Wide, Xp};

/// Allowed deviation of `c² + s²` from one (Np).
pub static ROTATION_VECTOR_NORM_ACCURACY: LazyLock<Fixed<Np>> =
    LazyLock::new(|| Fixed::from_raw(pow10(3)));

/// Largest accepted stretch factor (Np).
pub static MAX_STRETCH_FACTOR: LazyLock<Fixed<Np>> = LazyLock::new(|| Fixed::from_raw(pow10(26)));

/// Allowed deviation of `‖tau‖²` from one (Xp).
pub static DERIVED_TAU_NORM_ACCURACY_XP: LazyLock<Fixed<Xp>> =
    LazyLock::new(|| Fixed::from_raw(pow10(23)));

/// Allowed deviation of `d_sq` from one (Xp).
pub static DERIVED_DSQ_NORM_ACCURACY_XP: LazyLock<Fixed<Xp>> =
    LazyLock::new(|| Fixed::from_raw(pow10(23)));

/// Largest accepted `1 / (AChi·AChi - 1)` (Xp).
pub static MAX_INV_INVARIANT_DENOMINATOR_XP: LazyLock<Fixed<Xp>> =
    LazyLock::new(|| Fixed::from_raw(pow10(43)));

/// Shape and price range of an ellipse curve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EllipseParams {
    alpha: Fixed<Np>,
    beta: Fixed<Np>,
    c: Fixed<Np>,
    s: Fixed<Np>,
    lambda: Fixed<Np>,
}

impl EllipseParams {
    /// Creates validated ellipse parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] if any check in the
    /// module table fails.
    pub fn new(
        alpha: Fixed<Np>,
        beta: Fixed<Np>,
        c: Fixed<Np>,
        s: Fixed<Np>,
        lambda: Fixed<Np>,
    ) -> Result<Self, ClpError> {
        let params = Self {
            alpha,
            beta,
            c,
            s,
            lambda,
        };
        params.validate()?;
        Ok(params)
    }

    /// Validates rotation, stretch and price range.
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::ParameterValidation`] on the first violation.
    pub fn validate(&self) -> Result<(), ClpError> {
        let one = Fixed::<Np>::one();
        for component in [&self.c, &self.s] {
            if component.is_negative() || component > &one {
                return Err(ClpError::ParameterValidation(
                    "rotation components must lie in [0, 1]",
                ));
            }
        }
        let norm = self.c.mul_down(&self.c)?.checked_add(&self.s.mul_down(&self.s)?)?;
        if norm.checked_sub(&one)?.abs() > *ROTATION_VECTOR_NORM_ACCURACY {
            return Err(ClpError::ParameterValidation("rotation vector not normalized"));
        }
        if self.lambda < one || self.lambda > *MAX_STRETCH_FACTOR {
            return Err(ClpError::ParameterValidation(
                "stretch factor must lie in [1, 1e8]",
            ));
        }
        if !self.alpha.is_positive() {
            return Err(ClpError::ParameterValidation("alpha must be positive"));
        }
        if self.alpha >= self.beta {
            return Err(ClpError::ParameterValidation("alpha must be below beta"));
        }
        Ok(())
    }

    /// Lower price bound.
    #[must_use]
    pub const fn alpha(&self) -> &Fixed<Np> {
        &self.alpha
    }

    /// Upper price bound.
    #[must_use]
    pub const fn beta(&self) -> &Fixed<Np> {
        &self.beta
    }

    /// Cosine of the rotation angle.
    #[must_use]
    pub const fn c(&self) -> &Fixed<Np> {
        &self.c
    }

    /// Sine of the rotation angle (sign flipped).
    #[must_use]
    pub const fn s(&self) -> &Fixed<Np> {
        &self.s
    }

    /// Stretch factor; one is a circle.
    #[must_use]
    pub const fn lambda(&self) -> &Fixed<Np> {
        &self.lambda
    }
}

/// Geometric constants precomputed from [`EllipseParams`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedEllipseParams {
    tau_alpha: Vector2<Xp>,
    tau_beta: Vector2<Xp>,
    u: Fixed<Xp>,
    v: Fixed<Xp>,
    w: Fixed<Xp>,
    z: Fixed<Xp>,
    d_sq: Fixed<Xp>,
}

impl DerivedEllipseParams {
    /// Wraps caller-supplied derived params without checks.
    ///
    /// Use [`DerivedEllipseParams::validate_against`] before trusting them.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn from_parts(
        tau_alpha: Vector2<Xp>,
        tau_beta: Vector2<Xp>,
        u: Fixed<Xp>,
        v: Fixed<Xp>,
        w: Fixed<Xp>,
        z: Fixed<Xp>,
        d_sq: Fixed<Xp>,
    ) -> Self {
        Self {
            tau_alpha,
            tau_beta,
            u,
            v,
            w,
            z,
            d_sq,
        }
    }

    /// Derives the constants at 100 decimals and truncates them to Xp.
    ///
    /// ```text
    /// d_px  = 1 / sqrt(((c + px·s)/d/λ)² + ((px·c - s)/d)²)
    /// tau   = ((px·c - s)·d_px, (c + px·s)·d_px/λ)
    /// u = s·c·(τβx - ταx)    v = s²·τβy + c²·ταy
    /// w = s·c·(τβy - ταy)    z = c²·τβx + s²·ταx
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ClpError::DivisionByZero`] for degenerate params and
    /// [`ClpError::ArithmeticOverflow`] if a constant does not fit Xp.
    pub fn derive(params: &EllipseParams) -> Result<Self, ClpError> {
        let wide = |v: &Fixed<Np>| v.rescale::<Wide>(Rounding::Down);
        let (c, s, lambda) = (wide(params.c())?, wide(params.s())?, wide(params.lambda())?);
        let d_sq = c.mul_down(&c)?.checked_add(&s.mul_down(&s)?)?;
        let d = d_sq.sqrt()?;
        let (cn, sn) = (c.div_down(&d)?, s.div_down(&d)?);

        let tau = |px: &Fixed<Wide>| -> Result<Vector2<Wide>, ClpError> {
            let a = cn.checked_add(&px.mul_down(&sn)?)?.div_down(&lambda)?;
            let b = px.mul_down(&cn)?.checked_sub(&sn)?;
            let norm = a.mul_down(&a)?.checked_add(&b.mul_down(&b)?)?.sqrt()?;
            let d_px = Fixed::<Wide>::one().div_down(&norm)?;
            Ok(Vector2::new(
                px.mul_down(&c)?.checked_sub(&s)?.mul_down(&d_px)?,
                c.checked_add(&s.mul_down(px)?)?
                    .mul_down(&d_px)?
                    .div_down(&lambda)?,
            ))
        };
        let ta = tau(&wide(params.alpha())?)?;
        let tb = tau(&wide(params.beta())?)?;

        let sc = s.mul_down(&c)?;
        let (c2, s2) = (c.mul_down(&c)?, s.mul_down(&s)?);
        let u = sc.mul_down(&tb.x().checked_sub(ta.x())?)?;
        let v = s2.mul_down(tb.y())?.checked_add(&c2.mul_down(ta.y())?)?;
        let w = sc.mul_down(&tb.y().checked_sub(ta.y())?)?;
        let z = c2.mul_down(tb.x())?.checked_add(&s2.mul_down(ta.x())?)?;

        let xp = |v: &Fixed<Wide>| v.rescale::<Xp>(Rounding::Down);
        Ok(Self {
            tau_alpha: Vector2::new(xp(ta.x())?, xp(ta.y())?),
            tau_beta: Vector2::new(xp(tb.x())?, xp(tb.y())?),
            u: xp(&u)?,
            v: xp(&v)?,
            w: xp(&w)?,
            z: xp(&z)?,
            d_sq: xp(&d_sq)?,
        })
    }

    /// Checks that these constants are a normalized, well-conditioned and
    /// consistent derivation of `params`.
    ///
    /// # Errors
    ///
    /// - [`ClpError::ParameterValidation`] if a norm, cross-term or
    ///   consistency check fails.
    /// - [`ClpError::IllConditionedCurve`] if the invariant denominator is
    ///   too small.
    pub fn validate_against(&self, params: &EllipseParams) -> Result<(), ClpError> {
        self.validate_limits(params)?;

        let expected = Self::derive(params)?;
        let tolerance = &*DERIVED_TAU_NORM_ACCURACY_XP;
        let pairs = [
            (self.tau_alpha.x(), expected.tau_alpha.x()),
            (self.tau_alpha.y(), expected.tau_alpha.y()),
            (self.tau_beta.x(), expected.tau_beta.x()),
            (self.tau_beta.y(), expected.tau_beta.y()),
            (&self.u, &expected.u),
            (&self.v, &expected.v),
            (&self.w, &expected.w),
            (&self.z, &expected.z),
            (&self.d_sq, &expected.d_sq),
        ];
        for (supplied, derived) in pairs {
            if &supplied.checked_sub(derived)?.abs() > tolerance {
                return Err(ClpError::ParameterValidation(
                    "derived params inconsistent with params",
                ));
            }
        }
        Ok(())
    }

    fn validate_limits(&self, params: &EllipseParams) -> Result<(), ClpError> {
        let one = Fixed::<Xp>::one();
        for tau in [&self.tau_alpha, &self.tau_beta] {
            let norm = tau.x().mul_xp(tau.x())?.checked_add(&tau.y().mul_xp(tau.y())?)?;
            if norm.checked_sub(&one)?.abs() > *DERIVED_TAU_NORM_ACCURACY_XP {
                return Err(ClpError::ParameterValidation("tau vector not normalized"));
            }
        }
        if [&self.u, &self.v, &self.w, &self.z].iter().any(|t| **t > one) {
            return Err(ClpError::ParameterValidation("cross term above one"));
        }
        if self.d_sq.checked_sub(&one)?.abs() > *DERIVED_DSQ_NORM_ACCURACY_XP {
            return Err(ClpError::ParameterValidation("d_sq not normalized"));
        }

        let denominator = calc_a_chi_a_chi_in_xp(params, self)?.checked_sub(&one)?;
        if !denominator.is_positive() {
            return Err(ClpError::IllConditionedCurve);
        }
        if one.div_up(&denominator)? > *MAX_INV_INVARIANT_DENOMINATOR_XP {
            return Err(ClpError::IllConditionedCurve);
        }
        Ok(())
    }

    /// Boundary vector for the lower price bound.
    #[must_use]
    pub const fn tau_alpha(&self) -> &Vector2<Xp> {
        &self.tau_alpha
    }

    /// Boundary vector for the upper price bound.
    #[must_use]
    pub const fn tau_beta(&self) -> &Vector2<Xp> {
        &self.tau_beta
    }

    /// `s·c·(τβx - ταx)`.
    #[must_use]
    pub const fn u(&self) -> &Fixed<Xp> {
        &self.u
    }

    /// `s²·τβy + c²·ταy`.
    #[must_use]
    pub const fn v(&self) -> &Fixed<Xp> {
        &self.v
    }

    /// `s·c·(τβy - ταy)`.
    #[must_use]
    pub const fn w(&self) -> &Fixed<Xp> {
        &self.w
    }

    /// `c²·τβx + s²·ταx`.
    #[must_use]
    pub const fn z(&self) -> &Fixed<Xp> {
        &self.z
    }

    /// `c² + s²` at extra precision.
    #[must_use]
    pub const fn d_sq(&self) -> &Fixed<Xp> {
        &self.d_sq
    }
}

/// Full configuration of a CEMM or ECLP curve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EllipseConfig {
    params: EllipseParams,
    derived: DerivedEllipseParams,
    #[cfg_attr(feature = "serde", serde(default))]
    limits: SwapLimits,
}

impl EllipseConfig {
    /// Derives the constants from `params`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`DerivedEllipseParams::derive`] and
    /// [`EllipseConfig::validate`].
    pub fn new(params: EllipseParams, limits: SwapLimits) -> Result<Self, ClpError> {
        let derived = DerivedEllipseParams::derive(&params)?;
        Self::with_derived(params, derived, limits)
    }

    /// Uses caller-supplied derived constants after checking them.
    ///
    /// # Errors
    ///
    /// See [`EllipseConfig::validate`].
    pub fn with_derived(
        params: EllipseParams,
        derived: DerivedEllipseParams,
        limits: SwapLimits,
    ) -> Result<Self, ClpError> {
        let config = Self {
            params,
            derived,
            limits,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates params, derived constants and limits.
    ///
    /// # Errors
    ///
    /// - [`ClpError::ParameterValidation`] on any failed check.
    /// - [`ClpError::IllConditionedCurve`] for a near-zero denominator.
    pub fn validate(&self) -> Result<(), ClpError> {
        self.params.validate()?;
        self.derived.validate_against(&self.params)?;
        self.limits.validate()
    }

    /// Shape and price range.
    #[must_use]
    pub const fn params(&self) -> &EllipseParams {
        &self.params
    }

    /// Precomputed constants.
    #[must_use]
    pub const fn derived(&self) -> &DerivedEllipseParams {
        &self.derived
    }

    /// Per-trade ratio limits.
    #[must_use]
    pub const fn limits(&self) -> &SwapLimits {
        &self.limits
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const SQRT_HALF: &str = "0.707106781186547524";

    fn np(s: &str) -> Fixed<Np> {
        let Ok(v) = s.parse() else {
            panic!("valid decimal {s}");
        };
        v
    }

    fn make_params() -> EllipseParams {
        let Ok(p) = EllipseParams::new(
            np("0.97"),
            np("1.02"),
            np(SQRT_HALF),
            np(SQRT_HALF),
            np("2"),
        ) else {
            panic!("valid params");
        };
        p
    }

    // -- EllipseParams ------------------------------------------------------

    #[test]
    fn params_validation() {
        let c = np(SQRT_HALF);
        assert!(EllipseParams::new(np("1.02"), np("0.97"), c.clone(), c.clone(), np("2")).is_err());
        assert!(EllipseParams::new(
            np("0.97"),
            np("1.02"),
            c.clone(),
            c.clone(),
            np("0.5"),
        ).is_err());
        assert!(
            EllipseParams::new(
                np("0.97"),
                np("1.02"),
                c.clone(),
                c.clone(),
                np("100000001"),
            ).is_err()
        );
        assert_eq!(
            EllipseParams::new(np("0.97"), np("1.02"), np("0.5"), np("0.5"), np("2")),
            Err(ClpError::ParameterValidation("rotation vector not normalized"))
        );
        assert!(EllipseParams::new(np("0.97"), np("1.02"), np("1.1"), np("0"), np("2")).is_err());
        assert!(EllipseParams::new(np("0.97"), np("1.02"), np("1"), np("0"), np("1")).is_ok());
    }

    // -- Derivation ---------------------------------------------------------

    #[test]
    fn derived_params_are_normalized() {
        let p = make_params();
        let Ok(d) = DerivedEllipseParams::derive(&p) else {
            panic!("derive");
        };
        assert!(d.validate_against(&p).is_ok());
        let one = Fixed::<Xp>::one();
        let Ok(d_sq_gap) = d.d_sq().checked_sub(&one) else {
            panic!("sub");
        };
        assert!(d_sq_gap.abs() <= *DERIVED_DSQ_NORM_ACCURACY_XP);
        assert!(d.tau_alpha().x().is_negative());
        assert!(d.tau_beta().x().is_positive());
    }

    #[test]
    fn circle_tau_is_symmetric() {
        let Ok(p) = EllipseParams::new(np("0.5"), np("2"), np("1"), np("0"), np("1")) else {
            panic!("valid params");
        };
        let Ok(d) = DerivedEllipseParams::derive(&p) else {
            panic!("derive");
        };
        // tau(px) = (px, 1) / sqrt(1 + px²) for the unrotated circle
        assert!((d.tau_alpha().x().to_f64_lossy() - 0.447_213_595_499_958).abs() < 1e-12);
        assert!((d.tau_beta().x().to_f64_lossy() - 0.894_427_190_999_916).abs() < 1e-12);
        assert!(d.u().is_zero());
        assert!(d.w().is_zero());
    }

    #[test]
    fn tampered_derived_rejected() {
        let p = make_params();
        let Ok(d) = DerivedEllipseParams::derive(&p) else {
            panic!("derive");
        };
        let Ok(bumped) = d.u().checked_add(&Fixed::from_raw(pow10(25))) else {
            panic!("add");
        };
        let tampered = DerivedEllipseParams::from_parts(
            d.tau_alpha().clone(),
            d.tau_beta().clone(),
            bumped,
            d.v().clone(),
            d.w().clone(),
            d.z().clone(),
            d.d_sq().clone(),
        );
        assert_eq!(
            tampered.validate_against(&p),
            Err(ClpError::ParameterValidation(
                "derived params inconsistent with params"
            ))
        );
    }

    #[test]
    fn unnormalized_tau_rejected() {
        let p = make_params();
        let Ok(d) = DerivedEllipseParams::derive(&p) else {
            panic!("derive");
        };
        let Ok(x) = d.tau_beta().x().mul_int(2) else {
            panic!("mul");
        };
        let tampered = DerivedEllipseParams::from_parts(
            d.tau_alpha().clone(),
            Vector2::new(x, d.tau_beta().y().clone()),
            d.u().clone(),
            d.v().clone(),
            d.w().clone(),
            d.z().clone(),
            d.d_sq().clone(),
        );
        assert_eq!(
            tampered.validate_against(&p),
            Err(ClpError::ParameterValidation("tau vector not normalized"))
        );
    }

    // -- EllipseConfig ------------------------------------------------------

    #[test]
    fn config_derives_on_construction() {
        let Ok(cfg) = EllipseConfig::new(make_params(), SwapLimits::default()) else {
            panic!("config");
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.params().lambda(), &np("2"));
    }
}
