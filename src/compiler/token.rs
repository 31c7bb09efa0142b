use crate::common::{number::Number, span::Span};

/// Associativity of an operator, used by the shunting-yard converter to
/// decide when to pop the operator stack (spec §3.1, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    None,
}

/// Precedence and associativity metadata attached to operator and
/// paren/underscore tokens (spec §3.1). Functions also carry a fixed
/// precedence (2) so the shunting-yard stack can treat them uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpMeta {
    pub precedence: u8,
    pub assoc: Assoc,
    pub commutative: bool,
}

/// Metadata specific to a `Function` token: its subscript (only `log` may
/// carry one), its captured exponent token queue (`sin^2(x)`), and its
/// argument sub-expression in its two forms — a raw linear stream from the
/// lexer, later replaced by a postfix stream by the shunting-yard converter
/// (spec §3.1, §4.2).
#[derive(Debug, Clone)]
pub struct FunctionMeta {
    pub name: String,
    pub subscript: Option<i64>,
    pub exponent: Option<Vec<Token>>,
    pub arg: Vec<Token>,
    /// Set once the function-attachment pass has consumed this function's
    /// subscript/exponent/argument, so a function synthesized fully-formed
    /// (the Euler rewrite's `exp`) is not re-processed.
    pub attached: bool,
}

#[derive(Debug, Clone)]
pub enum Kind {
    Number(Number),
    /// A single-letter variable, optionally subscripted (`x_1`).
    Variable { subscript: Option<String> },
    Operator(OpMeta),
    Function(FunctionMeta),
    LeftParen,
    RightParen,
    Underscore,
}

/// A lexical token: a kind tag, the source lexeme it came from (for
/// diagnostics and pretty-printing), a `negated` flag for tokens that carry
/// a leading unary minus (spec §3.1), and the span it was scanned from.
/// Tokens synthesized by a post-pass (an inserted implicit `*`, a default
/// `1` argument) carry `Span::empty()`.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: Kind,
    pub lexeme: String,
    pub negated: bool,
    pub span: Span,
}

impl Token {
    pub fn number(lexeme: impl Into<String>, value: Number, span: Span) -> Token {
        Token { kind: Kind::Number(value), lexeme: lexeme.into(), negated: false, span }
    }

    pub fn variable(name: char, subscript: Option<String>, span: Span) -> Token {
        Token {
            kind: Kind::Variable { subscript },
            lexeme: name.to_string(),
            negated: false,
            span,
        }
    }

    pub fn operator(lexeme: impl Into<String>, meta: OpMeta, span: Span) -> Token {
        let lexeme = lexeme.into();
        Token { kind: Kind::Operator(meta), lexeme, negated: false, span }
    }

    pub fn left_paren(span: Span) -> Token {
        Token { kind: Kind::LeftParen, lexeme: "(".to_string(), negated: false, span }
    }

    pub fn right_paren(span: Span) -> Token {
        Token { kind: Kind::RightParen, lexeme: ")".to_string(), negated: false, span }
    }

    pub fn underscore(span: Span) -> Token {
        Token { kind: Kind::Underscore, lexeme: "_".to_string(), negated: false, span }
    }

    pub fn function(name: impl Into<String>, span: Span) -> Token {
        let name = name.into();
        Token {
            lexeme: name.clone(),
            kind: Kind::Function(FunctionMeta {
                name,
                subscript: None,
                exponent: None,
                arg: vec![],
                attached: false,
            }),
            negated: false,
            span,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, Kind::Operator(_))
    }

    pub fn is_operator_lexeme(&self, lexeme: &str) -> bool {
        matches!(&self.kind, Kind::Operator(_) if self.lexeme == lexeme)
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, Kind::Function(_))
    }

    pub fn is_left_paren(&self) -> bool {
        matches!(self.kind, Kind::LeftParen)
    }

    pub fn is_right_paren(&self) -> bool {
        matches!(self.kind, Kind::RightParen)
    }

    pub fn is_underscore(&self) -> bool {
        matches!(self.kind, Kind::Underscore)
    }

    pub fn op_meta(&self) -> Option<OpMeta> {
        match self.kind {
            Kind::Operator(meta) => Some(meta),
            _ => None,
        }
    }
}

/// A classification used only by the pairwise adjacency table (spec §3.4):
/// coarser than `Kind`, since implicit multiplication only cares about
/// these four buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Number,
    Variable,
    Function,
    LeftParen,
    RightParen,
    Operator,
    Underscore,
}

impl Token {
    pub fn class(&self) -> TokenClass {
        match &self.kind {
            Kind::Number(_) => TokenClass::Number,
            Kind::Variable { .. } => TokenClass::Variable,
            Kind::Function(_) => TokenClass::Function,
            Kind::LeftParen => TokenClass::LeftParen,
            Kind::RightParen => TokenClass::RightParen,
            Kind::Operator(_) => TokenClass::Operator,
            Kind::Underscore => TokenClass::Underscore,
        }
    }
}

pub type Tokens = Vec<Token>;
