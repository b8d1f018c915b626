//! Property-based tests using `proptest` for curve invariants.
//!
//! Covers six properties across every enabled family:
//!
//! 1. **Swap monotonicity**: a larger input never pays less.
//! 2. **Round trip**: selling the proceeds back never returns more than
//!    the original input.
//! 3. **Price bounds**: spot prices stay inside the configured range.
//! 4. **Boundary feasibility**: balances stay below the curve ceiling and
//!    no trade pays out more than the pool holds.
//! 5. **Invariant non-decrease**: a trade never shrinks the invariant.
//! 6. **Newton exit safety**: the cubic solver stops within any budget and
//!    flags every non-converged result.
//!
//! Balances are drawn from `[1, 1e6]` tokens; below one token the 18-decimal
//! grid dominates the cubic and the brackets stop being meaningful.

use proptest::prelude::*;

use crate::config::{CurveConfig, EllipseConfig, EllipseParams, NewtonConfig, SwapLimits};
use crate::curves::CurveBox;
use crate::domain::{Balances, TokenIndex};
use crate::factory::DefaultCurveFactory;
use crate::math::{Fixed, Np};
use crate::traits::InvariantCurve;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn np(s: &str) -> Fixed<Np> {
    let Ok(v) = s.parse() else {
        panic!("valid decimal {s}");
    };
    v
}

fn ellipse_config() -> EllipseConfig {
    let c = np("0.707106781186547524");
    let Ok(params) = EllipseParams::new(np("0.97"), np("1.02"), c.clone(), c, np("2")) else {
        panic!("valid params");
    };
    let Ok(cfg) = EllipseConfig::new(params, SwapLimits::default()) else {
        panic!("valid config");
    };
    cfg
}

/// Every enabled two-asset family with its `[alpha, beta]` price range.
fn two_asset_curves() -> Vec<(CurveBox, Fixed<Np>, Fixed<Np>)> {
    let mut configs = Vec::new();
    #[cfg(feature = "two-clp")]
    {
        let Ok(cfg) = crate::config::TwoClpConfig::from_bounds(np("0.97"), np("1.02")) else {
            panic!("valid 2CLP config");
        };
        // sqrt bounds squared on the 18-decimal grid
        configs.push((CurveConfig::TwoClp(cfg), np("0.9409"), np("1.0404")));
    }
    #[cfg(feature = "cemm")]
    configs.push((CurveConfig::Cemm(ellipse_config()), np("0.97"), np("1.02")));
    #[cfg(feature = "eclp")]
    configs.push((CurveConfig::Eclp(ellipse_config()), np("0.97"), np("1.02")));

    configs
        .into_iter()
        .map(|(cfg, alpha, beta)| {
            let Ok(curve) = DefaultCurveFactory::create(&cfg) else {
                panic!("valid curve");
            };
            (curve, alpha, beta)
        })
        .collect()
}

#[cfg(feature = "three-clp")]
fn three_clp() -> CurveBox {
    let Ok(cfg) = crate::config::ThreeClpConfig::from_root3_alpha(np("0.99")) else {
        panic!("valid 3CLP config");
    };
    let Ok(curve) = DefaultCurveFactory::create(&CurveConfig::ThreeClp(cfg)) else {
        panic!("valid curve");
    };
    curve
}

/// `value * parts_per_million / 1e6`, rounded down.
fn fraction(value: &Fixed<Np>, parts_per_million: u64) -> Fixed<Np> {
    let Ok(scaled) = value.mul_int(parts_per_million) else {
        panic!("fraction overflow");
    };
    let Ok(v) = scaled.div_int(1_000_000u64, crate::domain::Rounding::Down) else {
        panic!("fraction division");
    };
    v
}

fn relative_slack(value: &Fixed<Np>) -> Fixed<Np> {
    // 1e-9 relative plus one gwei absolute
    let Ok(slack) = fraction(value, 1).div_int(1_000u64, crate::domain::Rounding::Up) else {
        panic!("slack");
    };
    let Ok(v) = slack.checked_add(&Fixed::from_raw(1_000_000_000u64)) else {
        panic!("slack");
    };
    v
}

fn plus(a: &Fixed<Np>, b: &Fixed<Np>) -> Fixed<Np> {
    let Ok(v) = a.checked_add(b) else {
        panic!("add");
    };
    v
}

fn minus(a: &Fixed<Np>, b: &Fixed<Np>) -> Fixed<Np> {
    let Ok(v) = a.checked_sub(b) else {
        panic!("sub");
    };
    v
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Balances in `[1, 1e6]` tokens at full 18-decimal resolution.
fn balance_strategy() -> impl Strategy<Value = Fixed<Np>> {
    (1_000_000_000_000_000_000u128..=1_000_000_000_000_000_000_000_000u128)
        .prop_map(Fixed::from_raw)
}

/// Trade size as parts per million of the input balance, below the 30%
/// default ratio limit.
fn trade_fraction_strategy() -> impl Strategy<Value = u64> {
    1_000u64..=250_000u64
}

fn direction_strategy() -> impl Strategy<Value = bool> {
    any::<bool>()
}

// ---------------------------------------------------------------------------
// Property 1: Swap Monotonicity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_swap_monotonic_two_asset(
        x in balance_strategy(),
        y in balance_strategy(),
        ppm in 1_000u64..=120_000u64,
        first in direction_strategy(),
    ) {
        let Ok(balances) = Balances::pair(x, y) else {
            return Ok(());
        };
        let (token_in, token_out) = TokenIndex::from_asset_in_is_first(first);
        let Ok(balance_in) = balances.get(token_in) else {
            return Ok(());
        };
        let small = fraction(balance_in, ppm);
        let large = fraction(balance_in, ppm * 2);

        for (curve, _, _) in two_asset_curves() {
            let Ok(pair) = curve.invariant_pair(&balances) else {
                continue;
            };
            let Ok(out_small) = curve.calc_out_given_in(
                &balances,
                token_in,
                token_out,
                &small,
                &pair,
            ) else {
                continue;
            };
            let Ok(out_large) = curve.calc_out_given_in(
                &balances,
                token_in,
                token_out,
                &large,
                &pair,
            ) else {
                continue;
            };
            prop_assert!(
                out_small <= out_large,
                "{}: out({}) = {} > out({}) = {}",
                curve.family(), small, out_small, large, out_large
            );
        }
    }

    #[cfg(feature = "three-clp")]
    #[test]
    fn prop_swap_monotonic_three_clp(
        x in balance_strategy(),
        y in balance_strategy(),
        z in balance_strategy(),
        ppm in 1_000u64..=120_000u64,
    ) {
        let curve = three_clp();
        let Ok(balances) = Balances::triple(x.clone(), y, z) else {
            return Ok(());
        };
        let Ok(pair) = curve.invariant_pair(&balances) else {
            return Ok(());
        };
        let (small, large) = (fraction(&x, ppm), fraction(&x, ppm * 2));
        let Ok(out_small) = curve.calc_out_given_in(
            &balances,
            TokenIndex::First,
            TokenIndex::Third,
            &small,
            &pair,
        ) else {
            return Ok(());
        };
        let Ok(out_large) = curve.calc_out_given_in(
            &balances,
            TokenIndex::First,
            TokenIndex::Third,
            &large,
            &pair,
        ) else {
            return Ok(());
        };
        prop_assert!(out_small <= out_large);
    }
}

// ---------------------------------------------------------------------------
// Property 2: Round Trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_never_profits(
        x in balance_strategy(),
        y in balance_strategy(),
        ppm in trade_fraction_strategy(),
        first in direction_strategy(),
    ) {
        let Ok(balances) = Balances::pair(x, y) else {
            return Ok(());
        };
        let (token_in, token_out) = TokenIndex::from_asset_in_is_first(first);
        let Ok(balance_in) = balances.get(token_in) else {
            return Ok(());
        };
        let amount = fraction(balance_in, ppm);

        for (curve, _, _) in two_asset_curves() {
            let Ok(pair) = curve.invariant_pair(&balances) else {
                continue;
            };
            let Ok(out) = curve.calc_out_given_in(
                &balances,
                token_in,
                token_out,
                &amount,
                &pair,
            ) else {
                continue;
            };
            if out.is_zero() {
                continue;
            }
            let Ok(back) = curve.calc_in_given_out(
                &balances,
                token_in,
                token_out,
                &out,
                &pair,
            ) else {
                continue;
            };
            prop_assert!(
                back <= plus(&amount, &relative_slack(&amount)),
                "{}: paid {} for {} but {} buys it back",
                curve.family(), amount, out, back
            );
        }
    }

    #[test]
    fn prop_sell_back_returns_no_more(
        x in balance_strategy(),
        y in balance_strategy(),
        ppm in trade_fraction_strategy(),
    ) {
        let Ok(balances) = Balances::pair(x.clone(), y.clone()) else {
            return Ok(());
        };
        let amount = fraction(&x, ppm);

        for (curve, _, _) in two_asset_curves() {
            let Ok(pair) = curve.invariant_pair(&balances) else {
                continue;
            };
            let Ok(out) = curve.calc_out_given_in(
                &balances,
                TokenIndex::First,
                TokenIndex::Second,
                &amount,
                &pair,
            ) else {
                continue;
            };
            let Ok(after) = Balances::pair(plus(&x, &amount), minus(&y, &out)) else {
                continue;
            };
            let Ok(pair_after) = curve.invariant_pair(&after) else {
                continue;
            };
            let Ok(back) = curve.calc_out_given_in(
                &after,
                TokenIndex::Second,
                TokenIndex::First,
                &out,
                &pair_after,
            ) else {
                continue;
            };
            prop_assert!(
                back <= plus(&amount, &relative_slack(&amount)),
                "{}: round trip turned {} into {}",
                curve.family(), amount, back
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: Price Bounds
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_spot_price_within_range(
        x in balance_strategy(),
        y in balance_strategy(),
    ) {
        let Ok(balances) = Balances::pair(x, y) else {
            return Ok(());
        };
        for (curve, alpha, beta) in two_asset_curves() {
            let Ok(pair) = curve.invariant_pair(&balances) else {
                continue;
            };
            let Ok(px) = curve.spot_price(
                &balances,
                TokenIndex::First,
                TokenIndex::Second,
                &pair,
            ) else {
                continue;
            };
            prop_assert!(
                px >= minus(&alpha, &relative_slack(&alpha)),
                "{}: price {} below {}", curve.family(), px, alpha
            );
            prop_assert!(
                px <= plus(&beta, &relative_slack(&beta)),
                "{}: price {} above {}", curve.family(), px, beta
            );
        }
    }

    #[cfg(feature = "three-clp")]
    #[test]
    fn prop_three_clp_price_within_range(
        x in balance_strategy(),
        y in balance_strategy(),
        z in balance_strategy(),
    ) {
        let curve = three_clp();
        let Ok(balances) = Balances::triple(x, y, z) else {
            return Ok(());
        };
        let Ok(pair) = curve.invariant_pair(&balances) else {
            return Ok(());
        };
        // alpha = 0.99³
        let alpha = np("0.970299");
        let Ok(inverse) = Fixed::<Np>::one().div_up(&alpha) else {
            return Ok(());
        };
        for (base, quote) in [
            (TokenIndex::First, TokenIndex::Second),
            (TokenIndex::Second, TokenIndex::Third),
            (TokenIndex::Third, TokenIndex::First),
        ] {
            let Ok(px) = curve.spot_price(&balances, base, quote, &pair) else {
                continue;
            };
            prop_assert!(px >= minus(&alpha, &relative_slack(&alpha)));
            prop_assert!(px <= plus(&inverse, &relative_slack(&inverse)));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Boundary Feasibility
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_balances_below_ceiling(
        x in balance_strategy(),
        y in balance_strategy(),
    ) {
        let Ok(balances) = Balances::pair(x.clone(), y.clone()) else {
            return Ok(());
        };
        for (curve, _, _) in two_asset_curves() {
            let Ok(pair) = curve.invariant_pair(&balances) else {
                continue;
            };
            for (token, balance) in [(TokenIndex::First, &x), (TokenIndex::Second, &y)] {
                let Ok(ceiling) = curve.max_balance(token, &pair) else {
                    continue;
                };
                prop_assert!(
                    balance <= &plus(&ceiling, &relative_slack(&ceiling)),
                    "{}: balance {} above ceiling {}", curve.family(), balance, ceiling
                );
            }
        }
    }

    #[test]
    fn prop_output_never_drains_pool(
        x in balance_strategy(),
        y in balance_strategy(),
        ppm in trade_fraction_strategy(),
        first in direction_strategy(),
    ) {
        let Ok(balances) = Balances::pair(x, y) else {
            return Ok(());
        };
        let (token_in, token_out) = TokenIndex::from_asset_in_is_first(first);
        let (Ok(balance_in), Ok(balance_out)) = (balances.get(token_in), balances.get(token_out))
        else {
            return Ok(());
        };
        let amount = fraction(balance_in, ppm);
        for (curve, _, _) in two_asset_curves() {
            let Ok(pair) = curve.invariant_pair(&balances) else {
                continue;
            };
            let Ok(out) = curve.calc_out_given_in(
                &balances,
                token_in,
                token_out,
                &amount,
                &pair,
            ) else {
                continue;
            };
            prop_assert!(!out.is_negative());
            prop_assert!(&out < balance_out, "{}: pays {} of {}", curve.family(), out, balance_out);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: Invariant Non-Decrease
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_trade_never_shrinks_invariant(
        x in balance_strategy(),
        y in balance_strategy(),
        ppm in trade_fraction_strategy(),
    ) {
        let Ok(balances) = Balances::pair(x.clone(), y.clone()) else {
            return Ok(());
        };
        let amount = fraction(&y, ppm);
        for (curve, _, _) in two_asset_curves() {
            let Ok(before) = curve.invariant_pair(&balances) else {
                continue;
            };
            let Ok(out) = curve.calc_out_given_in(
                &balances,
                TokenIndex::Second,
                TokenIndex::First,
                &amount,
                &before,
            ) else {
                continue;
            };
            let Ok(after_balances) = Balances::pair(minus(&x, &out), plus(&y, &amount)) else {
                continue;
            };
            let Ok(after) = curve.invariant_pair(&after_balances) else {
                continue;
            };
            prop_assert!(
                after.over() >= before.under(),
                "{}: invariant fell from {} to {}", curve.family(), before.under(), after.over()
            );
        }
    }

    #[cfg(feature = "three-clp")]
    #[test]
    fn prop_three_clp_trade_never_shrinks_invariant(
        x in balance_strategy(),
        y in balance_strategy(),
        z in balance_strategy(),
        ppm in trade_fraction_strategy(),
    ) {
        let curve = three_clp();
        let Ok(balances) = Balances::triple(x.clone(), y.clone(), z.clone()) else {
            return Ok(());
        };
        let Ok(before) = curve.invariant_pair(&balances) else {
            return Ok(());
        };
        let amount = fraction(&z, ppm);
        let Ok(out) = curve.calc_out_given_in(
            &balances,
            TokenIndex::Third,
            TokenIndex::Second,
            &amount,
            &before,
        ) else {
            return Ok(());
        };
        let Ok(after_balances) = Balances::triple(x, minus(&y, &out), plus(&z, &amount)) else {
            return Ok(());
        };
        let Ok(after) = curve.invariant_pair(&after_balances) else {
            return Ok(());
        };
        prop_assert!(after.over() >= before.under());
    }
}

// ---------------------------------------------------------------------------
// Property 6: Newton Exit Safety
// ---------------------------------------------------------------------------

#[cfg(feature = "three-clp")]
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_cubic_solver_respects_budget(
        x in balance_strategy(),
        y in balance_strategy(),
        z in balance_strategy(),
        budget in 1u32..=12u32,
        root in 1u64..=999_000u64,
    ) {
        let root3_alpha = Fixed::<Np>::from_raw(u128::from(root) * 1_000_000_000_000u128);
        let Ok(newton) = NewtonConfig::new(budget, Fixed::ulp()) else {
            return Ok(());
        };
        let Ok(solution) = crate::curves::three_clp::solve_cubic(
            &[x, y, z],
            &root3_alpha,
            &newton,
        ) else {
            return Ok(());
        };
        prop_assert!(solution.outcome.iterations() <= budget);
        prop_assert!(!solution.invariant.is_negative());
        let certified = solution.outcome.is_converged();
        prop_assert_eq!(solution.into_certified().is_ok(), certified);
    }
}
