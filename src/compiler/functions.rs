//! The function registry (spec §4.6): for each recognized function name, a
//! symbolic-derivative builder and a numeric evaluator with domain checks.
//!
//! Every derivative form here ends with a chain-rule multiply by the
//! argument's own derivative (`u'`), except `ln`, whose `u'/u` quotient
//! already embeds it, mirroring `function_defs.cpp` in the original source.

use std::f64::consts::PI;

use crate::common::number::Number;
use crate::compiler::symbols::OPERATORS;
use crate::compiler::syntax::Syntax;
use crate::compiler::tree::Expr;

fn op(lexeme: &str, left: Expr, right: Expr) -> Expr {
    Expr::operator(lexeme, OPERATORS[lexeme], left, right)
}

fn num(n: i64) -> Expr {
    Expr::number(Number::Int(n))
}

fn call(name: &str, arg: Expr) -> Expr {
    Expr::call(name, None, arg)
}

/// `u' * derivative_of_surface_form`, the chain-rule multiply every
/// registry entry but `ln`/`log` closes with (spec §4.6).
fn chain(surface: Expr, arg_derivative: &Expr) -> Expr {
    op("*", surface, arg_derivative.clone())
}

/// Builds `d/dx name(arg)` given `arg` (the function's already-built
/// sub-expression) and `arg_derivative` (`u'`, already computed by the
/// differentiator). `subscript` is only consulted for `log`.
pub fn derivative(
    name: &str,
    subscript: Option<i64>,
    arg: &Expr,
    arg_derivative: &Expr,
) -> Result<Expr, Syntax> {
    let surface = match name {
        "sin" => call("cos", arg.clone()),
        "cos" => {
            let mut c = call("sin", arg.clone());
            c.negated = true;
            c
        }
        "tan" => op("^", call("sec", arg.clone()), num(2)),
        "cot" => {
            let mut squared = op("^", call("csc", arg.clone()), num(2));
            squared.negated = true;
            squared
        }
        "sec" => op("*", call("sec", arg.clone()), call("tan", arg.clone())),
        "csc" => {
            let mut product = op("*", call("csc", arg.clone()), call("cot", arg.clone()));
            product.negated = true;
            product
        }
        "exp" => call("exp", arg.clone()),
        "ln" => return Ok(op("/", arg_derivative.clone(), arg.clone())),
        "log" => {
            let base = subscript.ok_or_else(|| {
                Syntax::error_no_note("log requires a numeric base subscript")
            })?;
            let denominator = op("*", call("ln", num(base)), arg.clone());
            return Ok(op("/", arg_derivative.clone(), denominator));
        }
        "sqrt" => {
            let denominator = op("*", num(2), call("sqrt", arg.clone()));
            op("/", num(1), denominator)
        }
        other => return Err(Syntax::error_no_note(&format!("unknown function '{}'", other))),
    };
    Ok(chain(surface, arg_derivative))
}

/// Numerically evaluates `name(arg)` (spec §4.6). `arg` is assumed
/// already reduced to a plain real number by the caller (the simplifier's
/// function-evaluation rule, or the approximator).
pub fn evaluate(name: &str, subscript: Option<i64>, arg: f64) -> Result<f64, Syntax> {
    match name {
        "sin" => Ok(arg.sin()),
        "cos" => Ok(arg.cos()),
        "tan" => {
            if is_near_odd_multiple_of_half_pi(arg) {
                return Err(Syntax::error_no_note("tan is undefined at odd multiples of pi/2"));
            }
            Ok(arg.tan())
        }
        "cot" => {
            let s = arg.sin();
            if s == 0.0 {
                return Err(Syntax::error_no_note("cot is undefined where sin(u) = 0"));
            }
            Ok(arg.cos() / s)
        }
        "sec" => {
            let c = arg.cos();
            if c == 0.0 {
                return Err(Syntax::error_no_note("sec is undefined where cos(u) = 0"));
            }
            Ok(1.0 / c)
        }
        "csc" => {
            let s = arg.sin();
            if s == 0.0 {
                return Err(Syntax::error_no_note("csc is undefined where sin(u) = 0"));
            }
            Ok(1.0 / s)
        }
        "exp" => {
            let result = arg.exp();
            if result.is_infinite() {
                return Err(Syntax::error_no_note("exp overflowed"));
            }
            Ok(result)
        }
        "ln" => {
            if arg <= 0.0 {
                return Err(Syntax::error_no_note("ln requires a positive argument"));
            }
            Ok(arg.ln())
        }
        "log" => {
            let base = subscript.ok_or_else(|| {
                Syntax::error_no_note("log requires a numeric base subscript")
            })? as f64;
            if base <= 0.0 || base == 1.0 {
                return Err(Syntax::error_no_note("log base must be positive and not equal to 1"));
            }
            if arg <= 0.0 {
                return Err(Syntax::error_no_note("log requires a positive argument"));
            }
            Ok(arg.ln() / base.ln())
        }
        "sqrt" => {
            if arg < 0.0 {
                return Err(Syntax::error_no_note("sqrt requires a non-negative argument"));
            }
            Ok(arg.sqrt())
        }
        other => Err(Syntax::error_no_note(&format!("unknown function '{}'", other))),
    }
}

fn is_near_odd_multiple_of_half_pi(arg: f64) -> bool {
    let half_pi = PI / 2.0;
    let k = (arg / half_pi).round();
    k.rem_euclid(2.0) == 1.0 && (arg - k * half_pi).abs() < 1e-9
}

/// Whether `name` is a recognized function (used by the tokenizer's
/// symbol table construction and by validation elsewhere).
pub fn is_known(name: &str) -> bool {
    matches!(
        name,
        "sin" | "cos" | "tan" | "cot" | "csc" | "sec" | "exp" | "ln" | "log" | "sqrt"
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sin_evaluates() {
        assert!((evaluate("sin", None, 0.0).unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn ln_rejects_nonpositive() {
        assert!(evaluate("ln", None, -1.0).is_err());
        assert!(evaluate("ln", None, 0.0).is_err());
    }

    #[test]
    fn sqrt_rejects_negative() {
        assert!(evaluate("sqrt", None, -4.0).is_err());
    }

    #[test]
    fn log_base_requires_subscript() {
        assert!(evaluate("log", None, 10.0).is_err());
        assert!((evaluate("log", Some(10), 100.0).unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn tan_rejects_near_pi_over_2() {
        assert!(evaluate("tan", None, PI / 2.0).is_err());
    }
}
