//! Symbolic differentiation (spec §4.7): recursive post-order, memoized
//! on each node's cached derivative, with the rewrite log recorded as a
//! side effect of each rule application (spec §4.9).

use std::rc::Rc;

use crate::common::number::Number;
use crate::compiler::functions;
use crate::compiler::simplify::simplify;
use crate::compiler::symbols::OPERATORS;
use crate::compiler::syntax::Syntax;
use crate::compiler::trace::{RewriteLog, Step};
use crate::compiler::tree::{normalize, Expr, ExprKind};

fn op(lexeme: &str, left: Expr, right: Expr) -> Expr {
    Expr::operator(lexeme, OPERATORS[lexeme], left, right)
}

fn num(n: i64) -> Expr {
    Expr::number(Number::Int(n))
}

/// Differentiates `expr` with respect to `var`, simplifying the result
/// once before returning it (spec §4.7 step 6). `log` records one step
/// per rule application encountered along the way.
pub fn differentiate(expr: &Expr, var: char, log: &mut RewriteLog) -> Result<Rc<Expr>, Syntax> {
    if let Some(cached) = expr.cached_derivative() {
        return Ok(cached);
    }

    let raw = if !expr.contains_variable(var) {
        num(0)
    } else {
        match &expr.kind {
            ExprKind::Variable { .. } => num(1),
            ExprKind::Number(_) => num(0),
            ExprKind::Call { name, subscript, arg } => {
                let arg_derivative = differentiate(arg, var, log)?;
                let result = functions::derivative(name, *subscript, arg, &arg_derivative)?;
                log.push(Step::chain_rule(expr, &arg_derivative, &result));
                result
            }
            ExprKind::Operator { lexeme, left, right, .. } => {
                differentiate_operator(lexeme, expr, left, right, var, log)?
            }
        }
    };

    let simplified = normalize(raw);
    let simplified = simplify(simplified, false)?;
    let derivative = Rc::new(simplified);
    expr.cache_derivative(Rc::clone(&derivative));
    Ok(derivative)
}

fn differentiate_operator(
    lexeme: &str,
    node: &Expr,
    left: &Expr,
    right: &Expr,
    var: char,
    log: &mut RewriteLog,
) -> Result<Expr, Syntax> {
    let left_d = differentiate(left, var, log)?;
    let right_d = differentiate(right, var, log)?;

    let result = match lexeme {
        "+" => op("+", (*left_d).clone(), (*right_d).clone()),
        "-" => op("-", (*left_d).clone(), (*right_d).clone()),
        "*" => product_rule(left, right, &left_d, &right_d),
        "/" => quotient_rule(left, right, &left_d, &right_d),
        "^" => power_rule(left, right, &left_d, &right_d, var),
        other => return Err(Syntax::error_no_note(&format!("unknown operator '{}'", other))),
    };

    let step = match lexeme {
        "+" => Step::addition(node, &left_d, &right_d, &result),
        "-" => Step::subtraction(node, &left_d, &right_d, &result),
        "*" => Step::product(node, left, right, &left_d, &right_d, &result),
        "/" => Step::quotient(node, left, right, &left_d, &right_d, &result),
        "^" => Step::power(node, left, right, &left_d, &right_d, &result),
        _ => unreachable!(),
    };
    log.push(step);

    Ok(result)
}

/// Product rule (spec §4.7 step 5): three sub-cases so a side that does
/// not depend on the variable never contributes a spurious zero term.
fn product_rule(left: &Expr, right: &Expr, left_d: &Expr, right_d: &Expr) -> Expr {
    let left_is_zero = left_d.as_number().map_or(false, |n| n.is_zero());
    let right_is_zero = right_d.as_number().map_or(false, |n| n.is_zero());

    if right_is_zero {
        op("*", left_d.clone(), right.clone())
    } else if left_is_zero {
        op("*", left.clone(), right_d.clone())
    } else {
        let u_dv = op("*", left.clone(), right_d.clone());
        let v_du = op("*", right.clone(), left_d.clone());
        op("+", v_du, u_dv)
    }
}

/// Quotient rule: `(v*u' - u*v') / v^2` (spec §4.7 step 5).
fn quotient_rule(left: &Expr, right: &Expr, left_d: &Expr, right_d: &Expr) -> Expr {
    let numerator = op(
        "-",
        op("*", right.clone(), left_d.clone()),
        op("*", left.clone(), right_d.clone()),
    );
    let denominator = op("^", right.clone(), num(2));
    op("/", numerator, denominator)
}

/// Power rule (spec §4.7 step 5, §9 open question 3: the full sum, not
/// the source's partial form):
/// - base depends on `var`, exponent constant: `a * u^(a-1) * u'`
/// - base constant, exponent depends on `var`: `a^u * ln(a) * u'`
/// - both depend on `var`: `u^v * (v'*ln(u) + u'*v/u)`
fn power_rule(base: &Expr, exponent: &Expr, base_d: &Expr, exponent_d: &Expr, var: char) -> Expr {
    let base_depends = base.contains_variable(var);
    let exponent_depends = exponent.contains_variable(var);

    if exponent_depends && !base_depends {
        let power = op("^", base.clone(), exponent.clone());
        op("*", op("*", power, call_ln(base.clone())), exponent_d.clone())
    } else if base_depends && !exponent_depends {
        let reduced_power = op("^", base.clone(), op("-", exponent.clone(), num(1)));
        op("*", op("*", exponent.clone(), reduced_power), base_d.clone())
    } else {
        let power = op("^", base.clone(), exponent.clone());
        let term_a = op("*", exponent_d.clone(), call_ln(base.clone()));
        let term_b = op("/", op("*", base_d.clone(), exponent.clone()), base.clone());
        op("*", power, op("+", term_a, term_b))
    }
}

fn call_ln(arg: Expr) -> Expr {
    Expr::call("ln", None, arg)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;
    use crate::compiler::lex::lex;
    use crate::compiler::shunt::parse;
    use crate::compiler::approximate::approximate;

    fn derivative_at(src: &str, value: f64) -> f64 {
        let tokens = lex(&Source::source(src)).unwrap();
        let tree = parse(tokens).unwrap();
        let simplified = simplify(tree, false).unwrap();
        let mut log = RewriteLog::new();
        let derivative = differentiate(&simplified, 'x', &mut log).unwrap();
        approximate(&derivative, 'x', value).unwrap()
    }

    #[test]
    fn power_rule_x_cubed() {
        assert!((derivative_at("x^3", 2.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn sin_derivative_is_cos() {
        assert!((derivative_at("sin(x)", 0.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn x_ln_x_minus_x_derivative_is_ln_x() {
        assert!((derivative_at("x*ln(x)-x", std::f64::consts::E) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn exp_over_x_derivative_is_zero_at_one() {
        assert!(derivative_at("exp(x)/x", 1.0).abs() < 1e-9);
    }

    #[test]
    fn log_composition() {
        let value = derivative_at("ln(exp(x)-4)-x", 2.0);
        assert!((value - 1.181).abs() < 1e-3);
    }

    #[test]
    fn nested_trig_derivative() {
        let value = derivative_at("sin(cos(x))", std::f64::consts::FRAC_PI_2);
        assert!((value - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn derivative_of_constant_is_zero() {
        let tokens = lex(&Source::source("5")).unwrap();
        let tree = parse(tokens).unwrap();
        let mut log = RewriteLog::new();
        let derivative = differentiate(&tree, 'x', &mut log).unwrap();
        assert_eq!(derivative.as_number(), Some(Number::Int(0)));
    }

    #[test]
    fn produces_a_nonempty_log() {
        let tokens = lex(&Source::source("x^2+sin(x)")).unwrap();
        let tree = parse(tokens).unwrap();
        let mut log = RewriteLog::new();
        differentiate(&tree, 'x', &mut log).unwrap();
        assert!(!log.steps.is_empty());
    }
}
