//! Numeric approximation (spec §4.8): evaluates a tree at a binding of
//! the differentiation variable to a literal real value, substituting
//! every other free variable with `1.0` (spec §9 open question 1 — kept
//! as specified, this is the source's own behavior, not a bug fix).

use crate::common::number::Number;
use crate::compiler::simplify::simplify;
use crate::compiler::syntax::Syntax;
use crate::compiler::tree::{Expr, ExprKind};

/// Substitutes `var` with `value` (and every other free variable with
/// `1.0`), then runs the simplifier with floats forced on. Fails if the
/// root does not reduce all the way to a literal.
pub fn approximate(expr: &Expr, var: char, value: f64) -> Result<f64, Syntax> {
    let _guard = crate::arithmetic::scoped(true);
    let substituted = substitute(expr, var, value);
    let simplified = simplify(substituted, crate::arithmetic::float_simplification())?;
    simplified
        .as_number()
        .map(Number::as_f64)
        .ok_or_else(|| Syntax::error_no_note("expression did not reduce to a number"))
}

fn substitute(expr: &Expr, var: char, value: f64) -> Expr {
    let literal = |v: f64| Expr::number(Number::from_f64(v));
    match &expr.kind {
        ExprKind::Number(n) => {
            let mut clone = Expr::number(*n);
            clone.negated = expr.negated;
            clone
        }
        ExprKind::Variable { name, .. } => {
            let mut result = if *name == var { literal(value) } else { literal(1.0) };
            result.negated = expr.negated;
            result
        }
        ExprKind::Call { name, subscript, arg } => {
            let mut result = Expr::call(name.clone(), *subscript, substitute(arg, var, value));
            result.negated = expr.negated;
            result
        }
        ExprKind::Operator { lexeme, meta, left, right } => {
            let mut result = Expr::operator(
                lexeme.clone(),
                *meta,
                substitute(left, var, value),
                substitute(right, var, value),
            );
            result.negated = expr.negated;
            result
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;
    use crate::compiler::lex::lex;
    use crate::compiler::shunt::parse;

    fn approximate_str(src: &str, value: f64) -> f64 {
        let tokens = lex(&Source::source(src)).unwrap();
        let tree = parse(tokens).unwrap();
        approximate(&tree, 'x', value).unwrap()
    }

    #[test]
    fn approximates_a_polynomial() {
        assert!((approximate_str("x^2+1", 3.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn other_free_variables_substitute_to_one() {
        assert!((approximate_str("x+y", 2.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn fails_on_domain_error() {
        assert!(approximate_str("ln(x)", -1.0).is_err());
    }

    #[test]
    fn simplify_then_approximate_matches_approximate_directly() {
        let tokens = lex(&Source::source("0*x + x^1")).unwrap();
        let tree = parse(tokens).unwrap();
        let direct = approximate(&tree, 'x', 5.0).unwrap();
        let pre_simplified = simplify(tree.clone(), false).unwrap();
        let via_simplified = approximate(&pre_simplified, 'x', 5.0).unwrap();
        assert!((direct - via_simplified).abs() < 1e-6);
    }
}
