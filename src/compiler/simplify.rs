//! Arithmetic evaluation and algebraic identity rewriting (spec §4.5).
//!
//! The simplifier is a fixpoint: `simplify` re-applies one bottom-up pass
//! (`pass`) until it produces a tree structurally equal to its input
//! (spec §8 law 2). `float_simplification` is threaded through explicitly
//! rather than read from a process-wide toggle (spec §9 design note:
//! "keep `floatSimplification` as configuration threaded into the
//! simplifier as an argument"); `crate::Arithmetic` offers a scoped guard
//! around a process-wide default for callers (like the CLI) who want one.

use crate::common::number::Number;
use crate::compiler::functions;
use crate::compiler::symbols::OPERATORS;
use crate::compiler::syntax::Syntax;
use crate::compiler::tree::{normalize, trees_equal, Expr, ExprKind};

/// Runs `pass` to a fixpoint (spec §4.5, §8 law 2).
pub fn simplify(expr: Expr, float_simplification: bool) -> Result<Expr, Syntax> {
    let mut current = normalize(expr);
    loop {
        let next = pass(current.clone(), float_simplification)?;
        if trees_equal(&current, &next) {
            return Ok(next);
        }
        current = next;
    }
}

fn op(lexeme: &str, left: Expr, right: Expr) -> Expr {
    Expr::operator(lexeme, OPERATORS[lexeme], left, right)
}

fn num(n: i64) -> Expr {
    Expr::number(Number::Int(n))
}

/// One bottom-up rewrite pass: simplify both children first, then apply
/// this node's own rewrite rules (spec §4.5: "applied bottom-up").
fn pass(expr: Expr, floats: bool) -> Result<Expr, Syntax> {
    match expr.kind {
        ExprKind::Number(_) | ExprKind::Variable { .. } => Ok(expr),
        ExprKind::Call { name, subscript, arg } => {
            let arg = pass(*arg, floats)?;
            simplify_call(name, subscript, arg, floats)
        }
        ExprKind::Operator { lexeme, meta, left, right } => {
            let left = pass(*left, floats)?;
            let right = pass(*right, floats)?;
            let (left, right) = canonicalize_order(meta.commutative, left, right);
            simplify_operator(&lexeme, meta, left, right, floats)
        }
    }
}

/// "Before descending, if the operator is commutative and the right
/// child has lower precedence than the left, swap them" (spec §4.5).
/// Precedence for a non-operator leaf/call is treated as maximal (an atom
/// binds tighter than any operator), so this only ever reorders pairs of
/// operator subtrees.
fn canonicalize_order(commutative: bool, left: Expr, right: Expr) -> (Expr, Expr) {
    if !commutative {
        return (left, right);
    }
    if node_precedence(&right) < node_precedence(&left) {
        (right, left)
    } else {
        (left, right)
    }
}

fn node_precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Operator { meta, .. } => meta.precedence,
        _ => u8::MAX,
    }
}

fn simplify_call(name: String, subscript: Option<i64>, arg: Expr, floats: bool) -> Result<Expr, Syntax> {
    if let Some(value) = arg.as_number() {
        let result = functions::evaluate(&name, subscript, value.as_f64())?;
        if result.fract() == 0.0 || floats {
            return Ok(Expr::number(Number::from_f64(result)));
        }
    }
    Ok(Expr::call(name, subscript, arg))
}

fn simplify_operator(
    lexeme: &str,
    meta: crate::compiler::token::OpMeta,
    left: Expr,
    right: Expr,
    floats: bool,
) -> Result<Expr, Syntax> {
    match lexeme {
        "^" => simplify_power(left, right, floats),
        "*" => simplify_times(left, right, floats),
        "/" => simplify_divide(left, right, floats),
        "+" => simplify_plus(left, right, floats),
        "-" => simplify_minus(left, right, floats),
        _ => Ok(Expr::operator(lexeme, meta, left, right)),
    }
}

/// `Nl op Nr` evaluated arithmetically (spec §4.5 "numeric semantics").
/// `0/0` and `0^0` are fatal; a literal non-zero `x/0` is fatal.
fn eval_numeric(lexeme: &str, l: Number, r: Number, floats: bool) -> Result<Option<Number>, Syntax> {
    if lexeme == "/" && r.is_zero() {
        if l.is_zero() {
            return Err(Syntax::error_no_note("0/0 is undefined"));
        }
        return Err(Syntax::error_no_note("division by zero"));
    }
    if lexeme == "^" && l.is_zero() && r.is_zero() {
        return Err(Syntax::error_no_note("0^0 is undefined"));
    }

    if lexeme == "/" {
        if let (Number::Int(a), Number::Int(b)) = (l, r) {
            if a % b == 0 {
                return Ok(Some(Number::Int(a / b)));
            }
        }
    }

    let raw = match lexeme {
        "+" => l.as_f64() + r.as_f64(),
        "-" => l.as_f64() - r.as_f64(),
        "*" => l.as_f64() * r.as_f64(),
        "/" => l.as_f64() / r.as_f64(),
        "^" => l.as_f64().powf(r.as_f64()),
        _ => unreachable!("eval_numeric only called for arithmetic operators"),
    };
    let value = Number::from_f64(raw);
    match value {
        Number::Int(_) => Ok(Some(value)),
        Number::Float(_) if floats => Ok(Some(value)),
        Number::Float(_) => Ok(None),
    }
}

fn simplify_power(left: Expr, right: Expr, floats: bool) -> Result<Expr, Syntax> {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        if let Some(value) = eval_numeric("^", l, r, floats)? {
            return Ok(Expr::number(value));
        }
    }
    if let Some(l) = left.as_number() {
        if l.is_zero() {
            return Ok(num(0));
        }
        if l.is_one() {
            return Ok(num(1));
        }
    }
    if let Some(r) = right.as_number() {
        if r.is_zero() {
            return Ok(num(1));
        }
        if r.is_one() {
            return Ok(left);
        }
    }
    Ok(op("^", left, right))
}

fn simplify_times(left: Expr, right: Expr, floats: bool) -> Result<Expr, Syntax> {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        if let Some(value) = eval_numeric("*", l, r, floats)? {
            return Ok(Expr::number(value));
        }
    }
    if let Some(l) = left.as_number() {
        if l.is_zero() {
            return Ok(num(0));
        }
        if l.is_one() {
            return Ok(right);
        }
    }
    if let Some(r) = right.as_number() {
        if r.is_zero() {
            return Ok(num(0));
        }
        if r.is_one() {
            return Ok(left);
        }
    }

    // x * x -> x^2
    if trees_equal(&left, &right) {
        return Ok(op("^", left, num(2)));
    }
    // x^a * x -> x^(a+1)
    if let Some((base, exponent)) = as_power(&left) {
        if trees_equal(base, &right) {
            return Ok(op("^", right, op("+", exponent.clone(), num(1))));
        }
    }
    // x * x^a -> x^(a+1)
    if let Some((base, exponent)) = as_power(&right) {
        if trees_equal(base, &left) {
            return Ok(op("^", left, op("+", exponent.clone(), num(1))));
        }
    }
    // x^a * x^b -> x^(a+b)
    if let (Some((lb, le)), Some((rb, re))) = (as_power(&left), as_power(&right)) {
        if trees_equal(lb, rb) {
            return Ok(op("^", lb.clone(), op("+", le.clone(), re.clone())));
        }
    }

    Ok(op("*", left, right))
}

fn simplify_divide(left: Expr, right: Expr, floats: bool) -> Result<Expr, Syntax> {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        if let Some(value) = eval_numeric("/", l, r, floats)? {
            return Ok(Expr::number(value));
        }
    }
    if let Some(l) = left.as_number() {
        if l.is_zero() {
            return Ok(num(0));
        }
    }
    if let Some(r) = right.as_number() {
        if r.is_one() {
            return Ok(left);
        }
    }
    Ok(op("/", left, right))
}

fn simplify_plus(left: Expr, right: Expr, floats: bool) -> Result<Expr, Syntax> {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        if let Some(value) = eval_numeric("+", l, r, floats)? {
            return Ok(Expr::number(value));
        }
    }
    if let Some(l) = left.as_number() {
        if l.is_zero() {
            return Ok(right);
        }
    }
    if let Some(r) = right.as_number() {
        if r.is_zero() {
            return Ok(left);
        }
    }

    if trees_equal(&left, &right) {
        return Ok(op("*", num(2), left));
    }
    // (x*a) + x -> x*(a+1);  (a*x) + x -> x*(a+1)
    if let Some((coeff, term)) = like_term_coefficient(&left, &right) {
        return Ok(op("*", term, op("+", coeff, num(1))));
    }
    // x + (x*a) -> x*(a+1);  x + (a*x) -> x*(a+1)
    if let Some((coeff, term)) = like_term_coefficient(&right, &left) {
        return Ok(op("*", term, op("+", coeff, num(1))));
    }

    Ok(op("+", left, right))
}

fn simplify_minus(left: Expr, right: Expr, floats: bool) -> Result<Expr, Syntax> {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        if let Some(value) = eval_numeric("-", l, r, floats)? {
            return Ok(Expr::number(value));
        }
    }
    if let Some(l) = left.as_number() {
        if l.is_zero() {
            let mut negated = right;
            negated.negated = !negated.negated;
            return Ok(normalize(negated));
        }
    }
    if let Some(r) = right.as_number() {
        if r.is_zero() {
            return Ok(left);
        }
    }
    if trees_equal(&left, &right) {
        return Ok(num(0));
    }
    // (x*a) - x -> x*(a-1);  (a*x) - x -> x*(a-1)
    if let Some((coeff, term)) = like_term_coefficient(&left, &right) {
        return Ok(op("*", term, op("-", coeff, num(1))));
    }
    // x - (x*a) -> x*(1-a);  x - (a*x) -> x*(1-a)
    if let Some((coeff, term)) = like_term_coefficient(&right, &left) {
        return Ok(op("*", term, op("-", num(1), coeff)));
    }
    Ok(op("-", left, right))
}

/// If `product` is `term*coeff` or `coeff*term` and `term` structurally
/// matches `candidate_term`, returns `(coeff, term)` — the shared shape
/// behind the `(x*a)+x`, `(a*x)+x`, and their `-` counterparts (spec §4.5).
fn like_term_coefficient<'a>(product: &'a Expr, candidate_term: &Expr) -> Option<(Expr, Expr)> {
    let (lexeme, left, right) = product.as_operator()?;
    if lexeme != "*" {
        return None;
    }
    if trees_equal(left, candidate_term) {
        return Some((right.clone(), left.clone()));
    }
    if trees_equal(right, candidate_term) {
        return Some((left.clone(), right.clone()));
    }
    None
}

fn as_power(expr: &Expr) -> Option<(&Expr, &Expr)> {
    match expr.as_operator() {
        Some(("^", base, exponent)) => Some((base, exponent)),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;
    use crate::compiler::lex::lex;
    use crate::compiler::shunt::parse;

    fn simplify_str(src: &str) -> Expr {
        let tokens = lex(&Source::source(src)).unwrap();
        let tree = parse(tokens).unwrap();
        simplify(tree, false).unwrap()
    }

    #[test]
    fn constant_folding() {
        let expr = simplify_str("2+3*4");
        assert_eq!(expr.as_number(), Some(Number::Int(14)));
    }

    #[test]
    fn zero_times_x_is_zero() {
        let expr = simplify_str("0*x");
        assert_eq!(expr.as_number(), Some(Number::Int(0)));
    }

    #[test]
    fn x_plus_x_is_2x() {
        let expr = simplify_str("x+x");
        assert!(expr.is_operator("*"));
    }

    #[test]
    fn x_times_x_is_x_squared() {
        let expr = simplify_str("x*x");
        assert!(expr.is_operator("^"));
    }

    #[test]
    fn like_term_folding() {
        let expr = simplify_str("3*x+x");
        assert!(expr.is_operator("*"));
    }

    #[test]
    fn fixpoint_is_idempotent() {
        let once = simplify_str("x+0*y+1*z");
        let twice = simplify(once.clone(), false).unwrap();
        assert!(trees_equal(&once, &twice));
    }

    #[test]
    fn even_integer_division_stays_integer_without_floats() {
        let expr = simplify_str("10/5");
        assert_eq!(expr.as_number(), Some(Number::Int(2)));
    }

    #[test]
    fn uneven_integer_division_rejected_without_floats() {
        let expr = simplify_str("1/3");
        assert!(expr.is_operator("/"));
    }

    #[test]
    fn irrational_power_rejected_without_floats() {
        let expr = simplify_str("2^0.5");
        assert!(expr.is_operator("^"));
    }

    #[test]
    fn irrational_power_kept_with_floats() {
        let tokens = lex(&Source::source("2^0.5")).unwrap();
        let tree = parse(tokens).unwrap();
        let simplified = simplify(tree, true).unwrap();
        match simplified.as_number() {
            Some(Number::Float(f)) => assert!((f - std::f64::consts::SQRT_2).abs() < 1e-9),
            other => panic!("expected a float, got {:?}", other),
        }
    }

    #[test]
    fn x_minus_three_x_is_negative_two_x() {
        let expr = simplify_str("x-3*x");
        assert!(expr.is_operator("*"));
    }

    #[test]
    fn uneven_integer_division_kept_with_floats() {
        let tokens = lex(&Source::source("1/4")).unwrap();
        let tree = parse(tokens).unwrap();
        let simplified = simplify(tree, true).unwrap();
        assert_eq!(simplified.as_number(), Some(Number::Float(0.25)));
    }

    #[test]
    fn zero_over_zero_is_an_error() {
        let tokens = lex(&Source::source("0/0")).unwrap();
        let tree = parse(tokens).unwrap();
        assert!(simplify(tree, false).is_err());
    }

    #[test]
    fn zero_to_zero_is_an_error() {
        let tokens = lex(&Source::source("0^0")).unwrap();
        let tree = parse(tokens).unwrap();
        assert!(simplify(tree, false).is_err());
    }
}
