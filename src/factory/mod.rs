//! Curve instantiation via the factory pattern.
//!
//! The [`DefaultCurveFactory`] creates curves from [`CurveConfig`] values,
//! validating the configuration and dispatching to the matching curve
//! constructor.
//!
//! # Usage
//!
//! ```rust
//! use clp_math::config::{CurveConfig, TwoClpConfig};
//! use clp_math::domain::Balances;
//! use clp_math::factory::DefaultCurveFactory;
//! use clp_math::traits::InvariantCurve;
//!
//! let cfg = TwoClpConfig::from_bounds("0.97".parse().expect("ok"), "1.02".parse().expect("ok"))
//!     .expect("valid");
//! let curve = DefaultCurveFactory::create(&CurveConfig::TwoClp(cfg)).expect("curve created");
//!
//! let balances = Balances::from_decimals(&["100", "200"]).expect("valid");
//! let pair = curve.invariant_pair(&balances).expect("solved");
//! assert!(pair.over() >= pair.under());
//! ```
//!
//! # Feature Gating
//!
//! Each match arm is gated behind its curve feature.  A config variant for
//! a disabled family returns [`ClpError::ParameterValidation`].
//!
//! [`CurveConfig`]: crate::config::CurveConfig
//! [`ClpError::ParameterValidation`]: crate::error::ClpError::ParameterValidation

mod default_factory;

pub use default_factory::DefaultCurveFactory;
