//! # CLP Math
//!
//! Invariant and swap math for bounded-price concentrated liquidity curves.
//!
//! Every curve trades inside a fixed price range.  The crate solves the
//! invariant of a pool from its balances, prices trades against it, and
//! keeps every result on the side that protects existing liquidity
//! providers: amounts out round down, amounts in round up, and each
//! invariant comes as a conservative `(over, under)` bracket.
//!
//! Four families are provided:
//!
//! - **2CLP**: two-asset constant product on virtual reserves, `two-clp`
//! - **3CLP**: three-asset constant product, one shared price range, `three-clp`
//! - **CEMM**: rotated and stretched circle with an 18-decimal error bound, `cemm`
//! - **ECLP**: the same ellipse with a certified 38-decimal bound, `eclp`
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `all-curves` | yes | Enables all four families |
//! | `serde` | no | `Serialize`/`Deserialize` for parameters and configs |
//!
//! # Quick Start
//!
//! ```rust
//! use clp_math::config::{CurveConfig, TwoClpConfig};
//! use clp_math::domain::{Balances, TokenIndex};
//! use clp_math::factory::DefaultCurveFactory;
//! use clp_math::traits::InvariantCurve;
//!
//! // 1. Price range [0.97², 1.02²] via its square roots
//! let sqrt_alpha = "0.97".parse().expect("decimal");
//! let sqrt_beta = "1.02".parse().expect("decimal");
//! let config = TwoClpConfig::from_bounds(sqrt_alpha, sqrt_beta).expect("valid bounds");
//!
//! // 2. Create the curve via the factory
//! let curve = DefaultCurveFactory::create(&CurveConfig::TwoClp(config)).expect("curve created");
//!
//! // 3. Solve the invariant for the current balances
//! let balances = Balances::from_decimals(&["100", "200"]).expect("valid balances");
//! let invariant = curve.invariant_pair(&balances).expect("solved");
//!
//! // 4. Price a trade of 10 units of asset 0
//! let amount_in = "10".parse().expect("decimal");
//! let out = curve
//!     .calc_out_given_in(&balances, TokenIndex::First, TokenIndex::Second, &amount_in, &invariant)
//!     .expect("within limits");
//! assert!(out.to_string().starts_with("10.04"));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Consumer   │  uses CurveConfig + DefaultCurveFactory
//! └──────┬──────┘
//!        │ create(&config)
//!        ▼
//! ┌─────────────┐
//! │   Factory    │  validates config, dispatches to FromConfig
//! └──────┬──────┘
//!        │ CurveBox (enum dispatch)
//!        ▼
//! ┌─────────────┐
//! │   Curves     │  2CLP, 3CLP, CEMM, ECLP
//! └──────┬──────┘
//!        │ InvariantCurve trait
//!        ▼
//! ┌─────────────┐
//! │    Math      │  Fixed<Np>, Fixed<Xp>, pool square root
//! └─────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`math`] | [`Fixed`](math::Fixed) at 18, 38 and 100 decimals with explicit rounding |
//! | [`domain`] | [`Balances`](domain::Balances), [`InvariantPair`](domain::InvariantPair), [`NewtonOutcome`](domain::NewtonOutcome), ... |
//! | [`config`] | [`CurveConfig`](config::CurveConfig) and per-family parameters |
//! | [`traits`] | [`InvariantCurve`](traits::InvariantCurve) and [`FromConfig`](traits::FromConfig) |
//! | [`curves`] | Feature-gated families and the [`CurveBox`](curves::CurveBox) dispatch enum |
//! | [`factory`] | [`DefaultCurveFactory`](factory::DefaultCurveFactory) |
//! | [`liquidity`] | Invariant updates for joins and exits, protocol fees |
//! | [`reference`] | 100-decimal ground-truth solvers |
//! | [`error`] | [`ClpError`](error::ClpError) taxonomy |
//! | [`prelude`] | Convenience re-exports |

pub mod config;
pub mod curves;
pub mod domain;
pub mod error;
pub mod factory;
pub mod liquidity;
pub mod math;
pub mod prelude;
pub mod reference;
pub mod traits;
