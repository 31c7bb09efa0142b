//! Infix-to-postfix conversion and tree construction (spec §4.2).
//!
//! The lexer front-loads function-argument capture (every `Function`
//! token already owns its fully-scoped `arg`/`exponent` token streams by
//! the time this stage runs, with the delimiting parens consumed away).
//! That means a `Function` token never sits adjacent to its own parens
//! in the flat stream here, so — unlike the textbook algorithm, which
//! keeps functions on the operator stack and pops them on a matching
//! close-paren — a `Function` token behaves exactly like a `Number` or
//! `Variable`: a complete atom that goes straight to output. Its argument
//! (and exponent, if any) are converted to postfix recursively first.

use crate::compiler::{
    symbols,
    syntax::Syntax,
    token::{Assoc, Kind, OpMeta, Token},
    tree::Expr,
};

/// Converts an infix token stream to postfix (spec §4.2).
pub fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, Syntax> {
    let mut output = Vec::new();
    let mut stack: Vec<Token> = Vec::new();

    for tok in tokens {
        match &tok.kind {
            Kind::Number(_) | Kind::Variable { .. } => output.push(tok),
            Kind::Function(_) => output.push(postfix_function_arg(tok)?),
            Kind::Operator(meta) => {
                let meta = *meta;
                while let Some(top) = stack.last() {
                    if top.is_left_paren() {
                        break;
                    }
                    let top_prec = top.op_meta().map(|m| m.precedence).unwrap_or(0);
                    if top_prec > meta.precedence || (top_prec == meta.precedence && meta.assoc == Assoc::Left) {
                        output.push(stack.pop().unwrap());
                    } else {
                        break;
                    }
                }
                stack.push(tok);
            }
            Kind::LeftParen => stack.push(tok),
            Kind::RightParen => {
                loop {
                    match stack.pop() {
                        Some(t) if t.is_left_paren() => break,
                        Some(t) => output.push(t),
                        None => {
                            return Err(Syntax::error("mismatched parentheses", &tok.span));
                        }
                    }
                }
            }
            Kind::Underscore => {
                return Err(Syntax::error("unexpected '_'", &tok.span));
            }
        }
    }

    while let Some(t) = stack.pop() {
        if t.is_left_paren() {
            return Err(Syntax::error("mismatched parentheses", &t.span));
        }
        output.push(t);
    }

    Ok(output)
}

fn postfix_function_arg(mut tok: Token) -> Result<Token, Syntax> {
    if let Kind::Function(ref mut meta) = tok.kind {
        meta.arg = to_postfix(std::mem::take(&mut meta.arg))?;
        if let Some(exponent) = meta.exponent.take() {
            meta.exponent = Some(to_postfix(exponent)?);
        }
    }
    Ok(tok)
}

/// Builds an expression tree from a postfix token stream (spec §4.2).
/// Function exponents captured at the lexer stage are re-expanded here
/// into a standalone `^` operator sitting above the call (spec §3.1).
pub fn build_tree(postfix: &[Token]) -> Result<Expr, Syntax> {
    let mut stack: Vec<Expr> = Vec::new();

    for tok in postfix {
        match &tok.kind {
            Kind::Number(n) => {
                let value = if tok.negated { n.negate() } else { *n };
                stack.push(Expr::number(value));
            }
            Kind::Variable { subscript } => {
                let name = tok.lexeme.chars().next().expect("variable lexeme is non-empty");
                let mut expr = Expr::variable(name, subscript.clone());
                expr.negated = tok.negated;
                stack.push(expr);
            }
            Kind::Function(meta) => {
                let arg = build_tree(&meta.arg)?;
                let call = Expr::call(meta.name.clone(), meta.subscript, arg);
                let mut result = match &meta.exponent {
                    Some(exponent) => {
                        let exponent = build_tree(exponent)?;
                        Expr::operator("^", caret_meta(), call, exponent)
                    }
                    None => call,
                };
                result.negated = tok.negated;
                stack.push(result);
            }
            Kind::Operator(meta) => {
                let right = stack.pop().ok_or_else(|| missing_operand(tok))?;
                let left = stack.pop().ok_or_else(|| missing_operand(tok))?;
                stack.push(Expr::operator(tok.lexeme.clone(), *meta, left, right));
            }
            Kind::LeftParen | Kind::RightParen | Kind::Underscore => {
                return Err(Syntax::error("malformed postfix stream", &tok.span));
            }
        }
    }

    match stack.len() {
        1 => Ok(stack.pop().unwrap()),
        0 => Err(Syntax::error_no_note("empty expression")),
        _ => Err(Syntax::error_no_note("expression has leftover operands")),
    }
}

fn missing_operand(tok: &Token) -> Syntax {
    Syntax::error(&format!("operator '{}' is missing an operand", tok.lexeme), &tok.span)
}

fn caret_meta() -> OpMeta {
    symbols::OPERATORS["^"]
}

/// Lexes and parses `source` straight through to an expression tree.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, Syntax> {
    let postfix = to_postfix(tokens)?;
    build_tree(&postfix)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;
    use crate::compiler::lex::lex;
    use crate::compiler::tree::ExprKind;

    fn parse_str(src: &str) -> Expr {
        let tokens = lex(&Source::source(src)).expect("lex should succeed");
        parse(tokens).expect("parse should succeed")
    }

    #[test]
    fn precedence_is_respected() {
        let expr = parse_str("2+3*4");
        // root should be '+' since '*' binds tighter
        assert!(expr.is_operator("+"));
    }

    #[test]
    fn right_associative_power() {
        let expr = parse_str("2^3^2");
        // 2^(3^2): right child of the root is itself a '^'
        if let ExprKind::Operator { right, .. } = &expr.kind {
            assert!(right.is_operator("^"));
        } else {
            panic!("expected an operator node");
        }
    }

    #[test]
    fn parens_override_precedence() {
        let expr = parse_str("(2+3)*4");
        assert!(expr.is_operator("*"));
    }

    #[test]
    fn function_exponent_wraps_the_call() {
        let expr = parse_str("sin^2(x)");
        assert!(expr.is_operator("^"));
    }

    #[test]
    fn mismatched_parens_is_an_error() {
        let tokens = lex(&Source::source("(2+3")).expect("lex should succeed");
        assert!(parse(tokens).is_err());
    }
}
