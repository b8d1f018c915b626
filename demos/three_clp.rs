//! Three-asset bounded CPMM (3CLP) example.
//!
//! Demonstrates the cubic invariant solve, reading the solver outcome, and
//! trading between any two of the three assets.
//!
//! # Run
//!
//! ```bash
//! cargo run --example three_clp
//! ```

use clp_math::config::{CurveConfig, ThreeClpConfig};
use clp_math::curves::CurveBox;
use clp_math::domain::{Balances, TokenIndex};
use clp_math::factory::DefaultCurveFactory;
use clp_math::traits::InvariantCurve;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Three-Asset Bounded CPMM (3CLP) ===\n");

    // ── 1. Configure a tight range ──────────────────────────────────────
    //    Each pairwise price stays within [alpha, 1/alpha], alpha = 0.99^3.
    let config = CurveConfig::ThreeClp(ThreeClpConfig::from_root3_alpha("0.99".parse()?)?);
    let curve = DefaultCurveFactory::create(&config)?;

    // ── 2. Solve the cubic ──────────────────────────────────────────────
    let balances = Balances::from_decimals(&["100", "200", "300"])?;
    if let CurveBox::ThreeClp(inner) = &curve {
        let (_, outcome) = inner.invariant_with_outcome(&balances)?;
        println!("Solver outcome: {outcome:?}");
    }
    let pair = curve.invariant_pair(&balances)?;
    println!("Invariant bracket: [{}, {}]", pair.under(), pair.over());

    // ── 3. Trade across each pair ───────────────────────────────────────
    let amount = "10".parse()?;
    for (token_in, token_out) in [
        (TokenIndex::First, TokenIndex::Second),
        (TokenIndex::First, TokenIndex::Third),
        (TokenIndex::Second, TokenIndex::Third),
    ] {
        let out = curve.calc_out_given_in(&balances, token_in, token_out, &amount, &pair)?;
        println!("Sell 10 of {token_in} -> receive {out} of {token_out}");
    }

    // ── 4. Oversized trades are rejected ────────────────────────────────
    let too_big = "31".parse()?;
    let rejected =
        curve.calc_out_given_in(&balances, TokenIndex::First, TokenIndex::Second, &too_big, &pair);
    match rejected {
        Ok(out) => println!("\nUnexpectedly filled: {out}"),
        Err(err) => println!("\nRejected 31% trade: {err}"),
    }

    println!("\nDone.");
    Ok(())
}
