//! Unified error type for the curve math library.
//!
//! Every fallible operation in the crate returns [`ClpError`].  Each
//! variant maps to a stable identifier ([`ClpError::code`]) so calling
//! code can assert on the exact failure mode rather than on the rendered
//! message.
//!
//! # Taxonomy
//!
//! | Variant | Raised | Recoverable |
//! |---------|--------|-------------|
//! | [`ParameterValidation`](ClpError::ParameterValidation) | construction | no |
//! | [`ArithmeticOverflow`](ClpError::ArithmeticOverflow) | any call | no |
//! | [`ArithmeticUnderflow`](ClpError::ArithmeticUnderflow) | any call | no |
//! | [`DivisionByZero`](ClpError::DivisionByZero) | any call | no |
//! | [`RatioLimitExceeded`](ClpError::RatioLimitExceeded) | swap | yes, smaller trade |
//! | [`AssetBoundsExceeded`](ClpError::AssetBoundsExceeded) | swap / invariant | yes, smaller trade |
//! | [`IllConditionedCurve`](ClpError::IllConditionedCurve) | construction / invariant | no |
//! | [`NumericalInstability`](ClpError::NumericalInstability) | cubic solver | yes |
//! | [`InvalidBalances`](ClpError::InvalidBalances) | any call | no |
//! | [`SqrtFailed`](ClpError::SqrtFailed) | any call | no |
//! | [`UnsupportedOperation`](ClpError::UnsupportedOperation) | any call | no |

use thiserror::Error;

/// Errors produced by the curve math engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ClpError {
    /// Curve or derived parameters are malformed or inconsistent.
    #[error("parameter validation failed: {0}")]
    ParameterValidation(&'static str),

    /// A fixed-point result left the representable range.
    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    /// A quantity that must stay non-negative went below zero.
    #[error("arithmetic underflow in {0}")]
    ArithmeticUnderflow(&'static str),

    /// Division by a zero fixed-point value.
    #[error("division by zero")]
    DivisionByZero,

    /// A trade amount exceeds the configured fraction of the balance.
    #[error("ratio limit exceeded: requested {requested}, limit {limit}")]
    RatioLimitExceeded {
        /// Maximum allowed amount, rendered as a decimal string.
        limit: String,
        /// Requested amount, rendered as a decimal string.
        requested: String,
    },

    /// A resulting balance falls outside the curve's feasible region.
    #[error("asset bounds exceeded: {0}")]
    AssetBoundsExceeded(&'static str),

    /// The ellipse invariant denominator is too close to zero.
    #[error("ill-conditioned curve: invariant denominator too small")]
    IllConditionedCurve,

    /// An iterative solver could not certify convergence within budget.
    #[error("numerical instability after {iterations} iterations")]
    NumericalInstability {
        /// Iterations spent before giving up.
        iterations: u32,
    },

    /// Balance vector has the wrong arity or a negative entry.
    #[error("invalid balances: {0}")]
    InvalidBalances(&'static str),

    /// The pool square root failed its tolerance self-check.
    #[error("square root failed tolerance check")]
    SqrtFailed,

    /// The curve family does not offer the requested operation.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, ClpError>;

impl ClpError {
    /// Stable identifier for this failure mode.
    ///
    /// Identifiers never change between releases, unlike the `Display`
    /// text.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ParameterValidation(_) => "CLP_PARAM",
            Self::ArithmeticOverflow(_) => "CLP_OVERFLOW",
            Self::ArithmeticUnderflow(_) => "CLP_UNDERFLOW",
            Self::DivisionByZero => "CLP_DIV_ZERO",
            Self::RatioLimitExceeded { .. } => "CLP_RATIO_LIMIT",
            Self::AssetBoundsExceeded(_) => "CLP_ASSET_BOUNDS",
            Self::IllConditionedCurve => "CLP_ILL_CONDITIONED",
            Self::NumericalInstability { .. } => "CLP_INSTABILITY",
            Self::InvalidBalances(_) => "CLP_BALANCES",
            Self::SqrtFailed => "CLP_SQRT",
            Self::UnsupportedOperation(_) => "CLP_UNSUPPORTED",
        }
    }

    /// Returns `true` for errors a caller can resolve by changing the
    /// request (a smaller trade, a retry with other balances).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RatioLimitExceeded { .. }
                | Self::AssetBoundsExceeded(_)
                | Self::NumericalInstability { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let all = [
            ClpError::ParameterValidation("x"),
            ClpError::ArithmeticOverflow("x"),
            ClpError::ArithmeticUnderflow("x"),
            ClpError::DivisionByZero,
            ClpError::RatioLimitExceeded {
                limit: "1".into(),
                requested: "2".into(),
            },
            ClpError::AssetBoundsExceeded("x"),
            ClpError::IllConditionedCurve,
            ClpError::NumericalInstability { iterations: 3 },
            ClpError::InvalidBalances("x"),
            ClpError::SqrtFailed,
            ClpError::UnsupportedOperation("x"),
        ];
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn code_ignores_payload() {
        assert_eq!(
            ClpError::ArithmeticOverflow("mul").code(),
            ClpError::ArithmeticOverflow("div").code()
        );
    }

    #[test]
    fn recoverable_split() {
        assert!(ClpError::AssetBoundsExceeded("y").is_recoverable());
        assert!(ClpError::NumericalInstability { iterations: 255 }.is_recoverable());
        assert!(!ClpError::ArithmeticOverflow("mul").is_recoverable());
        assert!(!ClpError::ParameterValidation("alpha").is_recoverable());
    }

    #[test]
    fn display_includes_context() {
        let e = ClpError::RatioLimitExceeded {
            limit: "30".into(),
            requested: "31".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("31"));
        assert!(msg.contains("30"));
    }
}
