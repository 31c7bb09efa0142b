//! Turns source text into a flat, fully-attached token stream (spec §4.1).
//!
//! Lexing runs in two stages. The first walks the raw characters once,
//! producing numbers, operators, parens, underscores, and an alphabetic run
//! segmented against the function-name trie into `Function`/`Variable`
//! atoms. The second stage is a fixed sequence of post-passes over that
//! flat stream: variable subscript attachment, unary sign collapsing, the
//! Euler rewrite, function argument/exponent/subscript attachment, and
//! finally implicit multiplication insertion.

use std::{collections::HashMap, rc::Rc};

use crate::common::{number::Number, source::Source, span::Span};
use crate::compiler::{
    symbols::{self, FUNCTION_NAMES, OPERATORS},
    syntax::Syntax,
    token::{Kind, Token, TokenClass},
};

/// Lexes `source` into a fully post-processed token stream, ready for the
/// shunting-yard converter.
pub fn lex(source: &Rc<Source>) -> Result<Vec<Token>, Syntax> {
    let raw = scan(source)?;
    let subscripted = attach_variable_subscripts(raw)?;
    let unary = collapse_unary_signs(subscripted)?;
    let euler = rewrite_euler(unary)?;
    let attached = attach_functions(euler)?;
    insert_implicit_multiplication(attached)
}

/// A minimal multi-way trie over the known function names, used to
/// segment a run of letters into the longest matching symbols (spec §4.1:
/// "the buffer is matched ... to find the longest prefix that forms a
/// known symbol").
struct Trie {
    children: HashMap<char, Trie>,
    word: bool,
}

impl Trie {
    fn build<'a>(words: impl Iterator<Item = &'a str>) -> Trie {
        let mut root = Trie { children: HashMap::new(), word: false };
        for word in words {
            let mut node = &mut root;
            for ch in word.chars() {
                node = node.children.entry(ch).or_insert_with(|| Trie { children: HashMap::new(), word: false });
            }
            node.word = true;
        }
        root
    }

    /// Returns the length of the longest prefix of `chars` that is a
    /// complete word in the trie, or `None` if no such prefix exists.
    fn longest_match(&self, chars: &[char]) -> Option<usize> {
        let mut node = self;
        let mut best = None;
        for (idx, ch) in chars.iter().enumerate() {
            match node.children.get(ch) {
                Some(next) => {
                    node = next;
                    if node.word {
                        best = Some(idx + 1);
                    }
                }
                None => break,
            }
        }
        best
    }
}

fn function_trie() -> Trie {
    Trie::build(FUNCTION_NAMES.iter().copied())
}

/// First stage: a single left-to-right walk over the source characters.
fn scan(source: &Rc<Source>) -> Result<Vec<Token>, Syntax> {
    let trie = function_trie();
    let chars: Vec<char> = source.contents.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() {
            let (number, lexeme, len) = scan_number(&chars[i..], source, i)?;
            tokens.push(Token::number(lexeme, number, Span::new(source, i, len)));
            i += len;
        } else if c.is_alphabetic() {
            let start = i;
            let mut end = i;
            while end < chars.len() && chars[end].is_alphabetic() {
                end += 1;
            }
            let run = &chars[start..end];
            let mut j = 0;
            while j < run.len() {
                if let Some(len) = trie.longest_match(&run[j..]) {
                    let name: String = run[j..j + len].iter().collect();
                    let span = Span::new(source, start + j, len);
                    tokens.push(Token::function(name, span));
                    j += len;
                } else {
                    let span = Span::new(source, start + j, 1);
                    tokens.push(Token::variable(run[j], None, span));
                    j += 1;
                }
            }
            i = end;
        } else if let Some(meta) = OPERATORS.get(c.to_string().as_str()).copied() {
            tokens.push(Token::operator(c.to_string(), meta, Span::new(source, i, 1)));
            i += 1;
        } else if c == '(' {
            tokens.push(Token::left_paren(Span::new(source, i, 1)));
            i += 1;
        } else if c == ')' {
            tokens.push(Token::right_paren(Span::new(source, i, 1)));
            i += 1;
        } else if c == '_' {
            tokens.push(Token::underscore(Span::new(source, i, 1)));
            i += 1;
        } else {
            return Err(Syntax::error(
                &format!("unexpected character '{}'", c),
                &Span::new(source, i, 1),
            ));
        }
    }

    Ok(tokens)
}

/// Scans a single numeric literal (`[0-9]+(\.[0-9]+)?`) starting at
/// `chars[0]`. A second decimal point is a syntax error.
fn scan_number(chars: &[char], source: &Rc<Source>, start: usize) -> Result<(Number, String, usize), Syntax> {
    let mut len = 0;
    let mut seen_dot = false;
    let mut lexeme = String::new();

    while len < chars.len() && chars[len].is_ascii_digit() {
        lexeme.push(chars[len]);
        len += 1;
        if len < chars.len() && chars[len] == '.' {
            if seen_dot {
                return Err(Syntax::error(
                    "a number literal cannot contain two decimal points",
                    &Span::new(source, start, len + 1),
                ));
            }
            seen_dot = true;
            lexeme.push('.');
            len += 1;
        }
    }

    let number = if seen_dot {
        Number::Float(lexeme.parse().map_err(|_| {
            Syntax::error("malformed number literal", &Span::new(source, start, len))
        })?)
    } else {
        Number::Int(lexeme.parse().map_err(|_| {
            Syntax::error("malformed number literal", &Span::new(source, start, len))
        })?)
    };
    Ok((number, lexeme, len))
}

/// Attaches `x_1`-style subscripts directly to the preceding `Variable`
/// token, consuming the `Underscore` and the group that follows it. A
/// standalone group is either a single following token's lexeme, or
/// (mirroring `grab_group`'s convention elsewhere in this pass) the
/// contents of a parenthesized span.
fn attach_variable_subscripts(tokens: Vec<Token>) -> Result<Vec<Token>, Syntax> {
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        let mut tok = tokens[idx].clone();
        idx += 1;
        if matches!(tok.kind, Kind::Variable { .. })
            && idx < tokens.len()
            && tokens[idx].is_underscore()
        {
            let underscore_span = tokens[idx].span.clone();
            idx += 1;
            if idx >= tokens.len() {
                return Err(Syntax::error("expected a subscript after '_'", &underscore_span));
            }
            let (subscript, new_idx) = if tokens[idx].is_left_paren() {
                let (group, new_idx) = grab_group(&tokens, idx)?;
                (render_raw(&group), new_idx)
            } else {
                (tokens[idx].lexeme.clone(), idx + 1)
            };
            idx = new_idx;
            tok.kind = Kind::Variable { subscript: Some(subscript) };
        }
        out.push(tok);
    }
    Ok(out)
}

/// Collapses runs of unary `+`/`-` by parity (spec §4.1). An operator is in
/// unary position when nothing precedes it, or the preceding (already
/// emitted) token is an operator or a left paren.
fn collapse_unary_signs(tokens: Vec<Token>) -> Result<Vec<Token>, Syntax> {
    let mut out: Vec<Token> = Vec::new();
    let mut idx = 0;

    while idx < tokens.len() {
        let is_sign = |t: &Token| t.is_operator_lexeme("+") || t.is_operator_lexeme("-");
        let in_unary_position = out.last().map_or(true, |prev: &Token| {
            prev.is_operator() || prev.is_left_paren()
        });

        if is_sign(&tokens[idx]) && in_unary_position {
            let mut negatives = 0usize;
            let run_start = idx;
            while idx < tokens.len() && is_sign(&tokens[idx]) {
                if tokens[idx].is_operator_lexeme("-") {
                    negatives += 1;
                }
                idx += 1;
            }
            if idx >= tokens.len() {
                return Err(Syntax::error(
                    "expected an operand after a unary sign",
                    &tokens[run_start].span,
                ));
            }
            if tokens[idx].is_operator_lexeme("*") || tokens[idx].is_operator_lexeme("/") {
                return Err(Syntax::error(
                    "a unary sign cannot be followed by '*' or '/'",
                    &tokens[idx].span,
                ));
            }
            if tokens[idx].is_left_paren() {
                // A paren group carries no `negated` field of its own, so a
                // leading sign on one is expressed as an explicit `-1 *`
                // instead of toggling anything; the paren itself is left
                // for the next iteration to push through untouched.
                if negatives % 2 == 1 {
                    out.push(Token::number("-1", Number::Int(-1), Span::empty()));
                    out.push(Token::operator("*", OPERATORS["*"], Span::empty()));
                }
            } else {
                let mut next = tokens[idx].clone();
                idx += 1;
                if negatives % 2 == 1 {
                    next.negated = !next.negated;
                }
                out.push(next);
            }
        } else {
            out.push(tokens[idx].clone());
            idx += 1;
        }
    }

    Ok(out)
}

/// Rewrites a standalone `e` variable into `exp(1)`, or, when followed by
/// `^`, into `exp(<exponent>)` (spec §4.1 / §11: the sign computed by the
/// unary pass above is preserved on the resulting function token).
fn rewrite_euler(tokens: Vec<Token>) -> Result<Vec<Token>, Syntax> {
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        let tok = tokens[idx].clone();
        let is_euler = matches!(&tok.kind, Kind::Variable { subscript: None } if tok.lexeme == "e");
        if !is_euler {
            out.push(tok);
            idx += 1;
            continue;
        }
        let span = tok.span.clone();
        idx += 1;
        let mut function = Token::function("exp", span);
        function.negated = tok.negated;
        if idx < tokens.len() && tokens[idx].is_operator_lexeme("^") {
            idx += 1;
            let (arg, new_idx) = grab_group(&tokens, idx)?;
            idx = new_idx;
            if let Kind::Function(meta) = &mut function.kind {
                meta.arg = arg;
                meta.attached = true;
            }
        } else if let Kind::Function(meta) = &mut function.kind {
            meta.arg = vec![Token::number("1", Number::Int(1), Span::empty())];
            meta.attached = true;
        }
        out.push(function);
    }
    Ok(out)
}

/// Consumes exactly one "atom" starting at `tokens[*idx]`: a plain token,
/// or — when it is an unattached `Function` token — the function together
/// with its subscript, exponent, and argument (spec §4.1).
fn consume_atom(tokens: &[Token], idx: &mut usize) -> Result<Token, Syntax> {
    let mut tok = tokens[*idx].clone();
    *idx += 1;

    if let Kind::Function(ref mut meta) = tok.kind {
        if meta.attached {
            return Ok(tok);
        }

        if *idx < tokens.len() && tokens[*idx].is_underscore() {
            if meta.name != "log" {
                return Err(Syntax::error(
                    "only 'log' may carry a subscript",
                    &tokens[*idx].span,
                ));
            }
            let underscore_span = tokens[*idx].span.clone();
            *idx += 1;
            match tokens.get(*idx).map(|t| &t.kind) {
                Some(Kind::Number(Number::Int(n))) => {
                    meta.subscript = Some(*n);
                    *idx += 1;
                }
                _ => {
                    return Err(Syntax::error(
                        "a 'log' subscript must be a single integer literal",
                        &underscore_span,
                    ))
                }
            }
        }

        if *idx < tokens.len() && tokens[*idx].is_operator_lexeme("^") {
            *idx += 1;
            let (exponent, new_idx) = grab_group(tokens, *idx)?;
            meta.exponent = Some(exponent);
            *idx = new_idx;
        }

        let no_argument_follows = *idx >= tokens.len()
            || tokens[*idx].is_right_paren()
            || (tokens[*idx].is_operator() && !tokens[*idx].is_operator_lexeme("^"));

        if no_argument_follows {
            meta.arg = vec![Token::number("1", Number::Int(1), Span::empty())];
        } else {
            let (arg, new_idx) = grab_group(tokens, *idx)?;
            meta.arg = arg;
            *idx = new_idx;
        }
        meta.attached = true;
    }

    Ok(tok)
}

/// Grabs the token group a function attaches to, following it either as a
/// balanced parenthesized span (contents only, parens excluded) or — with
/// no parens present — exactly one atom, recursively attached if that atom
/// is itself a function (spec §4.1: "sin cos x" is `sin(cos(x))`).
fn grab_group(tokens: &[Token], start: usize) -> Result<(Vec<Token>, usize), Syntax> {
    if start < tokens.len() && tokens[start].is_left_paren() {
        let mut depth = 0i32;
        let mut i = start;
        loop {
            if i >= tokens.len() {
                return Err(Syntax::error(
                    "unbalanced parentheses in function argument",
                    &tokens[start].span,
                ));
            }
            if tokens[i].is_left_paren() {
                depth += 1;
            } else if tokens[i].is_right_paren() {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            i += 1;
        }
        Ok((tokens[start + 1..i].to_vec(), i + 1))
    } else if start < tokens.len() {
        let mut idx = start;
        let atom = consume_atom(tokens, &mut idx)?;
        Ok((vec![atom], idx))
    } else {
        Err(Syntax::error_no_note("expected an expression here"))
    }
}

/// Runs the function-attachment pass over the whole stream.
fn attach_functions(tokens: Vec<Token>) -> Result<Vec<Token>, Syntax> {
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        out.push(consume_atom(&tokens, &mut idx)?);
    }
    Ok(out)
}

/// Inserts implicit `*` tokens between adjacent atoms that require one
/// (spec §3.4), applied to the top-level stream and, recursively, to every
/// function's argument and exponent token streams.
fn insert_implicit_multiplication(tokens: Vec<Token>) -> Result<Vec<Token>, Syntax> {
    let mut out = Vec::with_capacity(tokens.len());
    for (i, tok) in tokens.into_iter().enumerate() {
        let mut tok = tok;
        if let Kind::Function(ref mut meta) = tok.kind {
            meta.arg = insert_implicit_multiplication(std::mem::take(&mut meta.arg))?;
            if let Some(exponent) = meta.exponent.take() {
                meta.exponent = Some(insert_implicit_multiplication(exponent)?);
            }
        }

        if i > 0 {
            let prev_class = out_last_class(&out);
            if let Some(prev_class) = prev_class {
                let this_class = tok.class();
                if symbols::requires_implicit_multiplication(prev_class, this_class) {
                    out.push(implicit_star());
                } else if !symbols::is_legal_adjacency(prev_class, this_class) {
                    return Err(Syntax::error(
                        &format!("'{}' cannot directly follow the previous token", tok.lexeme),
                        &tok.span,
                    ));
                }
            }
        }
        out.push(tok);
    }
    Ok(out)
}

fn out_last_class(out: &[Token]) -> Option<TokenClass> {
    out.last().map(|t| t.class())
}

fn implicit_star() -> Token {
    Token::operator("*", OPERATORS["*"], Span::empty())
}

fn render_raw(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.lexeme.as_str()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn lex_str(src: &str) -> Vec<Token> {
        lex(&Source::source(src)).expect("expected lex to succeed")
    }

    #[test]
    fn simple_sum() {
        let tokens = lex_str("x + 1");
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].is_operator_lexeme("+"));
    }

    #[test]
    fn function_run_segments_greedily() {
        let tokens = lex_str("sincosx");
        // sin( cos( x ) ) once functions attach their arguments.
        assert!(tokens[0].is_function());
        assert_eq!(tokens[0].lexeme, "sin");
    }

    #[test]
    fn implicit_multiplication_between_number_and_variable() {
        let tokens = lex_str("2x");
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].is_operator_lexeme("*"));
    }

    #[test]
    fn unary_minus_toggles_negated() {
        let tokens = lex_str("-5");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].negated);
    }

    #[test]
    fn unary_minus_before_parens_becomes_explicit_multiply() {
        let tokens = lex_str("-(x+1)");
        assert!(matches!(tokens[0].kind, Kind::Number(Number::Int(-1))));
        assert!(tokens[1].is_operator_lexeme("*"));
    }

    #[test]
    fn double_negative_cancels() {
        let tokens = lex_str("--5");
        assert_eq!(tokens.len(), 1);
        assert!(!tokens[0].negated);
    }

    #[test]
    fn euler_rewrite_with_exponent() {
        let tokens = lex_str("e^x");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_function());
        assert_eq!(tokens[0].lexeme, "exp");
    }

    #[test]
    fn log_subscript_attaches() {
        let tokens = lex_str("log_2(x)");
        assert_eq!(tokens.len(), 1);
        if let Kind::Function(meta) = &tokens[0].kind {
            assert_eq!(meta.subscript, Some(2));
        } else {
            panic!("expected a function token");
        }
    }

    #[test]
    fn variable_subscript_attaches() {
        let tokens = lex_str("x_1");
        assert_eq!(tokens.len(), 1);
        if let Kind::Variable { subscript } = &tokens[0].kind {
            assert_eq!(subscript.as_deref(), Some("1"));
        } else {
            panic!("expected a variable token");
        }
    }

    #[test]
    fn second_decimal_point_is_an_error() {
        assert!(lex(&Source::source("1.2.3")).is_err());
    }

    #[test]
    fn unbalanced_parens_in_argument_is_an_error() {
        assert!(lex(&Source::source("sin(x")).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn doesnt_crash(s in "\\PC*") {
            let result = lex(&Source::source(&s));
            format!("{:?}", result);
        }

        #[test]
        fn well_formed_arithmetic_always_lexes(s in "[0-9xy+*/^() ]{1,40}") {
            let _ = lex(&Source::source(&s));
        }
    }
}
