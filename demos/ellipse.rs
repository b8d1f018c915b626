//! Elliptic concentrated liquidity (CEMM and ECLP) example.
//!
//! Demonstrates configuring a rotated, stretched ellipse, comparing the two
//! ellipse families on the same state, and reading per-asset ceilings.
//!
//! # Run
//!
//! ```bash
//! cargo run --example ellipse
//! ```

use clp_math::config::{CurveConfig, EllipseConfig, EllipseParams, SwapLimits};
use clp_math::domain::{Balances, TokenIndex};
use clp_math::factory::DefaultCurveFactory;
use clp_math::traits::InvariantCurve;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Elliptic Concentrated Liquidity ===\n");

    // ── 1. Define the ellipse ───────────────────────────────────────────
    //    Price range [0.97, 1.02], rotated 45 degrees, stretched by 2.
    let rotation = "0.707106781186547524";
    let params = EllipseParams::new(
        "0.97".parse()?,
        "1.02".parse()?,
        rotation.parse()?,
        rotation.parse()?,
        "2".parse()?,
    )?;
    let config = EllipseConfig::new(params, SwapLimits::default())?;

    // ── 2. Compare both families on one state ───────────────────────────
    let balances = Balances::from_decimals(&["100", "100"])?;
    let amount = "10".parse()?;
    for curve_config in [CurveConfig::Cemm(config.clone()), CurveConfig::Eclp(config)] {
        let curve = DefaultCurveFactory::create(&curve_config)?;
        let pair = curve.invariant_pair(&balances)?;
        let out = curve.calc_out_given_in(
            &balances,
            TokenIndex::First,
            TokenIndex::Second,
            &amount,
            &pair,
        )?;
        let x_max = curve.max_balance(TokenIndex::First, &pair)?;
        let y_max = curve.max_balance(TokenIndex::Second, &pair)?;

        println!("{curve_config}:");
        println!("  invariant bracket: [{}, {}]", pair.under(), pair.over());
        println!("  sell 10 x       -> {out} y");
        println!("  ceilings        :  x <= {x_max}, y <= {y_max}");
    }

    println!("\nDone.");
    Ok(())
}
