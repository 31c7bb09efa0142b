//! # symd
//! A symbolic differentiation engine for single-variable real-valued
//! expressions written in conventional mathematical notation, e.g.
//! `ln(exp(x) - 2*(2*x+3)/(5*x^2+x+4))`.
//!
//! ## Pipeline
//! Source text flows through five stages, each independently re-entrant
//! over distinct trees (no stage keeps state between calls):
//!
//! ```text
//! text --lex--> tokens --shunt--> postfix --build_tree--> Expr
//!   Expr --simplify--> Expr --differentiate--> Expr --format--> text/LaTeX
//! ```
//!
//! `compiler::lex`, `compiler::shunt`, and `compiler::tree` implement the
//! first three stages; `compiler::simplify` and `compiler::differentiate`
//! the algebraic core; `compiler::approximate` partial-evaluates a tree at
//! a variable binding by reusing the simplifier; `compiler::trace` records
//! the rewrite steps differentiation applies and `compiler::format`
//! renders a tree back to text or LaTeX.

pub mod arithmetic;
pub mod common;
pub mod compiler;

use std::rc::Rc;

use common::source::Source;
use compiler::syntax::Syntax;
use compiler::tree::Expr;

/// Lexes and parses `source` straight through to an expression tree
/// (the composition of §4.1's tokenizer and §4.2's shunting-yard +
/// tree builder).
pub fn parse(source: &Rc<Source>) -> Result<Expr, Syntax> {
    let tokens = compiler::lex::lex(source)?;
    compiler::shunt::parse(tokens)
}

/// Validates that `name` tokenizes to a single bare variable, as spec
/// §4.7's differentiation-variable precondition requires ("a fresh
/// tokenize pass").
pub fn parse_variable(name: &str) -> Result<char, Syntax> {
    let source = Source::source(name);
    let tokens = compiler::lex::lex(&source)?;
    match tokens.as_slice() {
        [tok] => match &tok.kind {
            compiler::token::Kind::Variable { subscript: None } if !tok.negated => {
                Ok(tok.lexeme.chars().next().unwrap())
            }
            _ => Err(Syntax::error_no_note(&format!(
                "'{}' is not a valid differentiation variable",
                name
            ))),
        },
        _ => Err(Syntax::error_no_note(&format!(
            "'{}' is not a single variable token",
            name
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_variable_accepts_single_letter() {
        assert_eq!(parse_variable("x").unwrap(), 'x');
    }

    #[test]
    fn parse_variable_rejects_expressions() {
        assert!(parse_variable("x+1").is_err());
    }

    #[test]
    fn parse_variable_rejects_subscripted_names() {
        assert!(parse_variable("x_1").is_err());
    }
}
