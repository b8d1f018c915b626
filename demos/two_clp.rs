//! Two-asset bounded CPMM (2CLP) example.
//!
//! Demonstrates building a 2CLP curve from its square-root price bounds,
//! bracketing the invariant, quoting both swap directions, and growing
//! the invariant on a proportional join.
//!
//! # Run
//!
//! ```bash
//! cargo run --example two_clp
//! ```

use clp_math::config::{CurveConfig, TwoClpConfig};
use clp_math::domain::{Balances, SwapKind, TokenIndex};
use clp_math::factory::DefaultCurveFactory;
use clp_math::liquidity;
use clp_math::traits::InvariantCurve;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Two-Asset Bounded CPMM (2CLP) ===\n");

    // ── 1. Configure the price range ────────────────────────────────────
    //    sqrt(0.9409) = 0.97 and sqrt(1.0404) = 1.02.
    let config = CurveConfig::TwoClp(TwoClpConfig::from_bounds("0.97".parse()?, "1.02".parse()?)?);
    let curve = DefaultCurveFactory::create(&config)?;
    println!("Curve family: {}", curve.family());

    // ── 2. Bracket the invariant ────────────────────────────────────────
    let balances = Balances::from_decimals(&["100", "200"])?;
    let pair = curve.invariant_pair(&balances)?;
    println!("Invariant bracket: [{}, {}]", pair.under(), pair.over());

    // ── 3. Quote a trade in both directions ─────────────────────────────
    let amount = "10".parse()?;
    let out = curve.solve_swap(
        SwapKind::GivenIn,
        &balances,
        TokenIndex::First,
        TokenIndex::Second,
        &amount,
        &pair,
    )?;
    println!("\nSell 10 x  -> receive {out} y");

    let cost = curve.solve_swap(
        SwapKind::GivenOut,
        &balances,
        TokenIndex::First,
        TokenIndex::Second,
        &amount,
        &pair,
    )?;
    println!("Buy 10 y   -> pay     {cost} x");

    let price = curve.spot_price(&balances, TokenIndex::First, TokenIndex::Second, &pair)?;
    println!("Spot price of x in y: {price}");

    // ── 4. Join with 1% of the supply ───────────────────────────────────
    let supply = "1000".parse()?;
    let minted = "10".parse()?;
    let amounts = liquidity::calc_all_tokens_in_given_exact_bpt_out(&balances, &minted, &supply)?;
    let grown = liquidity::liquidity_invariant_update(pair.under(), &minted, &supply, true)?;
    println!("\nJoin deposits: x = {}, y = {}", amounts[0], amounts[1]);
    println!("Invariant after join: {grown}");

    println!("\nDone.");
    Ok(())
}
