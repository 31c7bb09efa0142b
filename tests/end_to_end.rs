//! End-to-end scenarios from the testable-properties table (spec §8):
//! for each input expression, differentiate with respect to `x`,
//! numerically approximate the derivative at a sample point, and check
//! the rewrite log is non-empty.

use std::f64::consts::{E, PI};

use symd::common::source::Source;
use symd::compiler::approximate::approximate;
use symd::compiler::differentiate::differentiate;
use symd::compiler::simplify::simplify;
use symd::compiler::trace::RewriteLog;
use symd::parse;

fn derivative_at(expr: &str, value: f64) -> f64 {
    let source = Source::source(expr);
    let tree = parse(&source).expect("parse should succeed");
    let simplified = simplify(tree, false).expect("simplify should succeed");
    let mut log = RewriteLog::new();
    let derivative = differentiate(&simplified, 'x', &mut log).expect("differentiate should succeed");
    assert!(!log.steps.is_empty(), "differentiating a non-constant expression should log steps");
    approximate(&derivative, 'x', value).expect("approximate should succeed")
}

#[test]
fn scenario_1_power_rule() {
    assert!((derivative_at("x^3", 2.0) - 12.0).abs() < 1e-6);
}

#[test]
fn scenario_2_sine() {
    assert!((derivative_at("sin(x)", 0.0) - 1.0).abs() < 1e-6);
}

#[test]
fn scenario_3_x_ln_x_minus_x() {
    assert!((derivative_at("x*ln(x) - x", E) - 1.0).abs() < 1e-6);
}

#[test]
fn scenario_4_exp_over_x() {
    assert!(derivative_at("exp(x)/x", 1.0).abs() < 1e-6);
}

#[test]
fn scenario_5_ln_of_exp_minus_constant() {
    assert!((derivative_at("ln(exp(x)-4) - x", 2.0) - 1.181).abs() < 1e-3);
}

#[test]
fn scenario_6_sin_of_cos() {
    assert!((derivative_at("sin(cos(x))", PI / 2.0) - (-1.0)).abs() < 1e-6);
}

/// Spec §8 law 2: `simplify(simplify(t)) == simplify(t)`.
#[test]
fn simplification_reaches_a_fixpoint() {
    use symd::compiler::tree::trees_equal;

    let source = Source::source("0*x + 1*y - (y - y) + x^1");
    let tree = parse(&source).unwrap();
    let once = simplify(tree, false).unwrap();
    let twice = simplify(once.clone(), false).unwrap();
    assert!(trees_equal(&once, &twice));
}

/// Spec §8 law 3: simplifying before approximating doesn't change the
/// numeric result (within tolerance), for a point where both are defined.
#[test]
fn simplify_then_approximate_agrees_with_approximate_directly() {
    let source = Source::source("2*x + 3*x - x^1");
    let tree = parse(&source).unwrap();
    let direct = approximate(&tree, 'x', 7.0).unwrap();
    let simplified = simplify(tree, false).unwrap();
    let via_simplified = approximate(&simplified, 'x', 7.0).unwrap();
    assert!((direct - via_simplified).abs() < 1e-6);
}

/// Spec §8 law 4: the symbolic derivative agrees with a numeric
/// central-difference approximation at a handful of sample points.
#[test]
fn symbolic_derivative_matches_central_difference() {
    let source = Source::source("x^3 - 2*x^2 + sin(x)");
    let tree = parse(&source).unwrap();
    let simplified = simplify(tree.clone(), false).unwrap();
    let mut log = RewriteLog::new();
    let derivative = differentiate(&simplified, 'x', &mut log).unwrap();

    for &point in &[-2.0, -0.5, 0.3, 1.0, 2.5] {
        let symbolic = approximate(&derivative, 'x', point).unwrap();
        let h = 1e-5;
        let plus = approximate(&tree, 'x', point + h).unwrap();
        let minus = approximate(&tree, 'x', point - h).unwrap();
        let central_difference = (plus - minus) / (2.0 * h);
        assert!(
            (symbolic - central_difference).abs() < 1e-3,
            "at x={}: symbolic={} central_difference={}",
            point,
            symbolic,
            central_difference
        );
    }
}

/// Spec §8 law 6: cloning a tree never aliases; mutating a clone never
/// changes the original.
#[test]
fn clone_never_aliases_the_original() {
    use symd::compiler::tree::{trees_equal, Expr, ExprKind};

    let source = Source::source("x + 1");
    let original = parse(&source).unwrap();
    let mut clone = original.clone();
    if let ExprKind::Operator { right, .. } = &mut clone.kind {
        **right = Expr::number(symd::common::number::Number::Int(99));
    }
    assert!(!trees_equal(&original, &clone));
    assert!(trees_equal(&original, &original.clone()));
}

#[test]
fn a_differentiation_variable_other_than_x_is_honored() {
    let source = Source::source("t^2 + 3*t");
    let tree = parse(&source).unwrap();
    let simplified = simplify(tree, false).unwrap();
    let mut log = RewriteLog::new();
    let derivative = differentiate(&simplified, 't', &mut log).unwrap();
    let result = approximate(&derivative, 't', 4.0).unwrap();
    assert!((result - 11.0).abs() < 1e-6);
}

#[test]
fn out_of_domain_evaluation_is_a_reported_error() {
    let source = Source::source("sqrt(x)");
    let tree = parse(&source).unwrap();
    assert!(approximate(&tree, 'x', -9.0).is_err());
}
