//! Integration tests exercising the full system from config to trade.
//!
//! These tests verify end-to-end flows through the public API: factory
//! dispatch, invariant brackets against the 100-decimal reference, swap
//! outputs against the exact curve, and liquidity bookkeeping.
//!
//! These tests require all curve features to be enabled.

#![cfg(all(
    feature = "two-clp",
    feature = "three-clp",
    feature = "cemm",
    feature = "eclp",
))]
#![allow(clippy::panic)]

use clp_math::config::{
    CurveConfig, EllipseConfig, EllipseParams, SwapLimits, ThreeClpConfig, TwoClpConfig,
};
use clp_math::curves::CurveBox;
use clp_math::domain::{Balances, InvariantPair, SwapKind, TokenIndex};
use clp_math::error::ClpError;
use clp_math::factory::DefaultCurveFactory;
use clp_math::liquidity;
use clp_math::math::{Fixed, Np, Wide};
use clp_math::reference::{self, EllipseReference};
use clp_math::traits::InvariantCurve;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

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

fn lift(v: &Fixed<Np>) -> Fixed<Wide> {
    let Ok(w) = reference::lift(v) else {
        panic!("lift");
    };
    w
}

fn balances(values: &[&str]) -> Balances {
    let Ok(b) = Balances::from_decimals(values) else {
        panic!("valid balances");
    };
    b
}

fn brackets(pair: &InvariantPair, exact: &Fixed<Wide>) -> bool {
    &lift(pair.under()) <= exact && exact <= &lift(pair.over())
}

fn gap(a: &Fixed<Wide>, b: &Fixed<Wide>) -> Fixed<Wide> {
    let Ok(d) = a.checked_sub(b) else {
        panic!("sub");
    };
    d.abs()
}

// ---------------------------------------------------------------------------
// Config builders for each family
// ---------------------------------------------------------------------------

fn two_clp_config() -> CurveConfig {
    let Ok(cfg) = TwoClpConfig::from_bounds(np("0.97"), np("1.02")) else {
        panic!("valid 2CLP config");
    };
    CurveConfig::TwoClp(cfg)
}

fn three_clp_config() -> CurveConfig {
    let Ok(cfg) = ThreeClpConfig::from_root3_alpha(np("0.99")) else {
        panic!("valid 3CLP config");
    };
    CurveConfig::ThreeClp(cfg)
}

fn ellipse_params() -> EllipseParams {
    let c = np("0.707106781186547524");
    let Ok(params) = EllipseParams::new(np("0.97"), np("1.02"), c.clone(), c, np("2")) else {
        panic!("valid params");
    };
    params
}

fn ellipse_config() -> EllipseConfig {
    let Ok(cfg) = EllipseConfig::new(ellipse_params(), SwapLimits::default()) else {
        panic!("valid ellipse config");
    };
    cfg
}

fn create(config: &CurveConfig) -> CurveBox {
    let Ok(curve) = DefaultCurveFactory::create(config) else {
        panic!("factory failed for {config}");
    };
    curve
}

// ---------------------------------------------------------------------------
// Factory round trip
// ---------------------------------------------------------------------------

#[test]
fn factory_builds_every_family() {
    init_tracing();
    let configs = [
        two_clp_config(),
        three_clp_config(),
        CurveConfig::Cemm(ellipse_config()),
        CurveConfig::Eclp(ellipse_config()),
    ];
    for config in &configs {
        let curve = create(config);
        assert_eq!(curve.family(), config.to_string());
        assert_eq!(curve.num_tokens(), config.num_tokens());
        assert_eq!(curve.swap_limits(), &SwapLimits::default());
    }
}

#[test]
fn invalid_config_never_reaches_a_curve() {
    assert!(matches!(
        EllipseParams::new(np("0.97"), np("1.02"), np("0.6"), np("0.6"), np("2")),
        Err(ClpError::ParameterValidation(_))
    ));
    assert!(matches!(
        TwoClpConfig::from_bounds(np("1.02"), np("0.97")),
        Err(ClpError::ParameterValidation(_))
    ));
}

// ---------------------------------------------------------------------------
// Invariant sense checks against the reference
// ---------------------------------------------------------------------------

#[test]
fn two_clp_bracket_contains_exact_root() {
    let curve = create(&two_clp_config());
    let state = balances(&["100", "200"]);
    let Ok(pair) = curve.invariant_pair(&state) else {
        panic!("pair");
    };
    let CurveConfig::TwoClp(cfg) = two_clp_config() else {
        panic!("2CLP config");
    };
    let Ok(exact) = reference::two_clp_invariant(&state, cfg.params()) else {
        panic!("reference");
    };
    assert!(brackets(&pair, &exact), "{} not in [{}, {}]", exact, pair.under(), pair.over());
    assert!(gap(&exact, &wide("6046.279513490840875146896120940607")) < wide("1e-29"));
}

#[test]
fn three_clp_bracket_contains_exact_root() {
    let curve = create(&three_clp_config());
    let state = balances(&["100", "200", "300"]);
    let Ok(pair) = curve.invariant_pair(&state) else {
        panic!("pair");
    };
    let CurveConfig::ThreeClp(cfg) = three_clp_config() else {
        panic!("3CLP config");
    };
    let Ok(exact) = reference::three_clp_invariant(&state, cfg.params()) else {
        panic!("reference");
    };
    assert!(brackets(&pair, &exact));
}

#[test]
fn ellipse_brackets_contain_exact_invariant() {
    let Ok(exact_model) = EllipseReference::new(&ellipse_params()) else {
        panic!("reference");
    };
    let state = balances(&["100", "100"]);
    let Ok(exact) = exact_model.invariant(&state) else {
        panic!("reference invariant");
    };
    assert!(gap(&exact, &wide("2832.68176643519511")) < wide("1e-14"));

    for config in [CurveConfig::Cemm(ellipse_config()), CurveConfig::Eclp(ellipse_config())] {
        let curve = create(&config);
        let Ok(pair) = curve.invariant_pair(&state) else {
            panic!("pair");
        };
        assert!(
            brackets(&pair, &exact),
            "{config}: {} not in [{}, {}]",
            exact,
            pair.under(),
            pair.over(),
        );
    }

    let Ok(eclp) = create(&CurveConfig::Eclp(ellipse_config())).calculate_invariant(&state) else {
        panic!("ECLP invariant");
    };
    assert_eq!(eclp, np("2832.681766435195111515"));
}

#[test]
fn derived_params_match_reference_boundaries() {
    let Ok(exact_model) = EllipseReference::new(&ellipse_params()) else {
        panic!("reference");
    };
    let derived = ellipse_config().derived().clone();
    // the engine derives from the unnormalized rotation
    let tolerance = wide("1e-17");
    for (engine, exact) in [
        (derived.tau_alpha().x(), exact_model.tau_alpha().x()),
        (derived.tau_alpha().y(), exact_model.tau_alpha().y()),
        (derived.tau_beta().x(), exact_model.tau_beta().x()),
        (derived.tau_beta().y(), exact_model.tau_beta().y()),
    ] {
        let Ok(lifted) = engine.rescale::<Wide>(clp_math::domain::Rounding::Down) else {
            panic!("rescale");
        };
        assert!(gap(&lifted, exact) < tolerance);
    }
}

// ---------------------------------------------------------------------------
// Swaps against the exact curve
// ---------------------------------------------------------------------------

#[test]
fn two_clp_trade_never_beats_exact_curve() {
    let curve = create(&two_clp_config());
    let state = balances(&["100", "200"]);
    let Ok(pair) = curve.invariant_pair(&state) else {
        panic!("pair");
    };
    let Ok(out) = curve.solve_swap(
        SwapKind::GivenIn,
        &state,
        TokenIndex::First,
        TokenIndex::Second,
        &np("10"),
        &pair,
    ) else {
        panic!("swap");
    };
    let exact = wide("10.044993958486500528734419771057");
    assert!(lift(&out) <= exact);
    assert!(gap(&lift(&out), &exact) < wide("1e-15"));
}

#[test]
fn three_clp_trade_never_beats_exact_curve() {
    let curve = create(&three_clp_config());
    let state = balances(&["100", "200", "300"]);
    let Ok(pair) = curve.invariant_pair(&state) else {
        panic!("pair");
    };
    let Ok(out) = curve.calc_out_given_in(
        &state,
        TokenIndex::First,
        TokenIndex::Third,
        &np("10"),
        &pair,
    ) else {
        panic!("swap");
    };
    let exact = wide("10.095508649329539902026858101219");
    assert!(lift(&out) <= exact);
    assert!(gap(&lift(&out), &exact) < wide("1e-12"));
}

#[test]
fn eclp_trade_never_beats_exact_curve() {
    let curve = create(&CurveConfig::Eclp(ellipse_config()));
    let state = balances(&["100", "100"]);
    let Ok(pair) = curve.invariant_pair(&state) else {
        panic!("pair");
    };
    let Ok(out) = curve.calc_out_given_in(
        &state,
        TokenIndex::First,
        TokenIndex::Second,
        &np("10"),
        &pair,
    ) else {
        panic!("swap");
    };

    let Ok(exact_model) = EllipseReference::new(&ellipse_params()) else {
        panic!("reference");
    };
    let Ok(r) = exact_model.invariant(&state) else {
        panic!("reference invariant");
    };
    let Ok(y_after) = exact_model.y_for_x(&wide("110"), &r) else {
        panic!("reference y");
    };
    let Ok(exact) = wide("100").checked_sub(&y_after) else {
        panic!("sub");
    };
    assert!(lift(&out) <= exact, "paid {out}, exact {exact}");
    assert!(gap(&lift(&out), &exact) < wide("1e-12"));
}

#[test]
fn ratio_limit_rejects_every_family() {
    let cases = [
        (two_clp_config(), balances(&["100", "200"])),
        (CurveConfig::Cemm(ellipse_config()), balances(&["100", "100"])),
        (CurveConfig::Eclp(ellipse_config()), balances(&["100", "100"])),
        (three_clp_config(), balances(&["100", "200", "300"])),
    ];
    for (config, state) in cases {
        let curve = create(&config);
        let Ok(pair) = curve.invariant_pair(&state) else {
            panic!("pair");
        };
        let result = curve.calc_out_given_in(
            &state,
            TokenIndex::First,
            TokenIndex::Second,
            &np("31"),
            &pair,
        );
        let Err(err) = result else {
            panic!("{config}: 31% trade accepted");
        };
        assert!(matches!(err, ClpError::RatioLimitExceeded { .. }), "{config}: {err}");
        assert!(err.is_recoverable());
    }
}

// ---------------------------------------------------------------------------
// Full lifecycle: join, trade, fees
// ---------------------------------------------------------------------------

#[test]
fn join_trade_and_collect_fees() {
    init_tracing();
    let curve = create(&two_clp_config());
    let state = balances(&["100", "200"]);
    let Ok(pair) = curve.invariant_pair(&state) else {
        panic!("pair");
    };
    let supply = np("1000");

    // 1% join
    let Ok(amounts) = liquidity::calc_all_tokens_in_given_exact_bpt_out(
        &state,
        &np("10"),
        &supply,
    ) else {
        panic!("join amounts");
    };
    assert_eq!(amounts, vec![np("1"), np("2")]);
    let Ok(joined) = liquidity::liquidity_invariant_update(
        pair.under(),
        &np("10"),
        &supply,
        true,
    ) else {
        panic!("join");
    };
    let Ok(after_join) = Balances::pair(np("101"), np("202")) else {
        panic!("balances");
    };
    let Ok(recomputed) = curve.invariant_pair(&after_join) else {
        panic!("recomputed");
    };
    assert!(gap(&lift(&joined), &lift(recomputed.under())) < wide("1e-12"));

    // the pool keeps rounding dust, so the invariant cannot fall
    let Ok(out) = curve.calc_out_given_in(
        &after_join,
        TokenIndex::Second,
        TokenIndex::First,
        &np("20"),
        &recomputed,
    ) else {
        panic!("swap");
    };
    let Ok(x_after) = np("101").checked_sub(&out) else {
        panic!("sub");
    };
    let Ok(after_trade) = Balances::pair(x_after, np("222")) else {
        panic!("balances");
    };
    let Ok(traded) = curve.invariant_pair(&after_trade) else {
        panic!("traded");
    };
    assert!(traded.over() >= recomputed.under());

    // fees on 1% growth
    let Ok(grown) = pair.under().mul_down(&np("1.01")) else {
        panic!("grown");
    };
    let Ok(fees) = liquidity::calc_protocol_fees(
        pair.under(),
        &grown,
        &supply,
        &np("0.5"),
        &np("0.5"),
    ) else {
        panic!("fees");
    };
    assert!(fees.gyro.is_positive());
    let Ok(split) = fees.other.checked_sub(&fees.gyro) else {
        panic!("split");
    };
    assert!(!split.is_negative() && split <= Fixed::ulp());
}

#[test]
fn ellipse_share_update_stays_within_certified_error() {
    let supply = np("1000");
    let state = balances(&["100", "100"]);
    let cases = [
        (np("10"), true, balances(&["101", "101"])),
        (np("10"), false, balances(&["99", "99"])),
    ];
    for config in [CurveConfig::Cemm(ellipse_config()), CurveConfig::Eclp(ellipse_config())] {
        let curve = create(&config);
        let Ok(pair) = curve.invariant_pair(&state) else {
            panic!("pair");
        };
        for (shares, is_increase, scaled) in &cases {
            let Ok(updated) =
                liquidity::liquidity_invariant_update(pair.under(), shares, &supply, *is_increase)
            else {
                panic!("update");
            };
            let Ok(fresh) = curve.calculate_invariant_with_error(scaled) else {
                panic!("fresh");
            };
            let Ok(overstatement) = updated.checked_sub(fresh.invariant()) else {
                panic!("sub");
            };
            assert!(
                &overstatement <= fresh.error(),
                "{config}: update {updated} overstates {fresh}"
            );
        }
    }
}
