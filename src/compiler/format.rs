//! Pretty-printing an expression tree back to source-like text or LaTeX
//! (spec §6.3). Both are a straightforward recursive tree walk; the
//! choice of converter is injected wherever a rendering is needed (the
//! rewrite log, the CLI's final `output` field) rather than hard-coded,
//! mirroring `text_converter.cpp`/`latex_converter.cpp` in the original
//! source, which are two implementations behind one function-pointer
//! seam (`Logger::converter`).

use crate::common::number::Number;
use crate::compiler::tree::{Expr, ExprKind};

/// Which notation a tree should be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    LaTeX,
}

/// Renders `expr` in the given `mode` (spec §6.3).
pub fn render(expr: &Expr, mode: Mode) -> String {
    match mode {
        Mode::Text => render_text(expr),
        Mode::LaTeX => render_latex(expr),
    }
}

/// Plain-text rendering: operators spell themselves, functions render as
/// `name(arg)`, `exp(x)` renders as `e^(x)`, and operator operands that
/// are themselves lower-precedence operators are parenthesized.
fn render_text(expr: &Expr) -> String {
    let body = match &expr.kind {
        ExprKind::Number(n) => format_number(*n),
        ExprKind::Variable { name, subscript } => match subscript {
            Some(sub) => format!("{}_{}", name, sub),
            None => name.to_string(),
        },
        ExprKind::Call { name, subscript, arg } => {
            let arg_text = render_text(arg);
            match name.as_str() {
                "exp" => format!("e^({})", arg_text),
                "log" => match subscript {
                    Some(base) => format!("log_{}({})", base, arg_text),
                    None => format!("log({})", arg_text),
                },
                other => format!("{}({})", other, arg_text),
            }
        }
        ExprKind::Operator { lexeme, left, right, meta } => {
            let left_text = wrap_if_lower_precedence(left, meta.precedence, &Mode::Text);
            let right_text = wrap_if_lower_precedence(right, meta.precedence, &Mode::Text);
            format!("{}{}{}", left_text, lexeme, right_text)
        }
    };
    if expr.negated {
        format!("-{}", maybe_paren(&body, needs_paren_for_negation(expr), Mode::Text))
    } else {
        body
    }
}

fn needs_paren_for_negation(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Operator { .. })
}

fn wrap_if_lower_precedence(child: &Expr, parent_precedence: u8, mode: &Mode) -> String {
    let text = match mode {
        Mode::Text => render_text(child),
        Mode::LaTeX => render_latex(child),
    };
    let child_precedence = match &child.kind {
        ExprKind::Operator { meta, .. } => meta.precedence,
        _ => u8::MAX,
    };
    let needs_parens = child_precedence < parent_precedence || child.negated;
    maybe_paren(&text, needs_parens, *mode)
}

fn maybe_paren(text: &str, needed: bool, mode: Mode) -> String {
    if !needed {
        return text.to_string();
    }
    match mode {
        Mode::Text => format!("({})", text),
        Mode::LaTeX => format!("\\left({}\\right)", text),
    }
}

fn format_number(n: Number) -> String {
    match n {
        Number::Int(i) => i.to_string(),
        Number::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.1}", f)
            } else {
                f.to_string()
            }
        }
    }
}

/// LaTeX rendering: `\cdot` for multiplication, `\dfrac{}{}` for division,
/// `a^{b}` for powers, `\sin`/`\cos`/.../`\ln`/`\sqrt{}` for the known
/// functions, arguments wrapped in `\left( \right)`.
fn render_latex(expr: &Expr) -> String {
    let body = match &expr.kind {
        ExprKind::Number(n) => format_number(*n),
        ExprKind::Variable { name, subscript } => match subscript {
            Some(sub) => format!("{}_{{{}}}", name, sub),
            None => name.to_string(),
        },
        ExprKind::Call { name, subscript, arg } => {
            let arg_text = render_latex(arg);
            match name.as_str() {
                "exp" => format!("e^{{{}}}", arg_text),
                "sqrt" => format!("\\sqrt{{{}}}", arg_text),
                "ln" => format!("\\ln\\left({}\\right)", arg_text),
                "log" => match subscript {
                    Some(base) => format!("\\log_{{{}}}\\left({}\\right)", base, arg_text),
                    None => format!("\\log\\left({}\\right)", arg_text),
                },
                other => format!("\\{}\\left({}\\right)", other, arg_text),
            }
        }
        ExprKind::Operator { lexeme, left, right, meta } => match lexeme.as_str() {
            "/" => format!("\\dfrac{{{}}}{{{}}}", render_latex(left), render_latex(right)),
            "^" => {
                let base = wrap_if_lower_precedence(left, meta.precedence, &Mode::LaTeX);
                format!("{}^{{{}}}", base, render_latex(right))
            }
            "*" => {
                let left_text = wrap_if_lower_precedence(left, meta.precedence, &Mode::LaTeX);
                let right_text = wrap_if_lower_precedence(right, meta.precedence, &Mode::LaTeX);
                format!("{}\\cdot {}", left_text, right_text)
            }
            _ => {
                let left_text = wrap_if_lower_precedence(left, meta.precedence, &Mode::LaTeX);
                let right_text = wrap_if_lower_precedence(right, meta.precedence, &Mode::LaTeX);
                format!("{}{}{}", left_text, lexeme, right_text)
            }
        },
    };
    if expr.negated {
        format!("-{}", maybe_paren(&body, needs_paren_for_negation(expr), Mode::LaTeX))
    } else {
        body
    }
}
