//! The process-wide symbol table and adjacency table (spec §3.2, §3.4).
//! Both are immutable once built and safe to share across re-entrant calls
//! (spec §5); `phf` builds them as compile-time perfect-hash maps, the same
//! pattern used for static lookup tables elsewhere in the example pack.

use phf::{phf_map, phf_set};

use crate::compiler::token::{Assoc, OpMeta, TokenClass};

/// Operators recognized by the tokenizer, with their shunting-yard
/// precedence, associativity, and commutativity (spec §3.2).
pub static OPERATORS: phf::Map<&'static str, OpMeta> = phf_map! {
    "+" => OpMeta { precedence: 10, assoc: Assoc::Left, commutative: true },
    "-" => OpMeta { precedence: 10, assoc: Assoc::Left, commutative: false },
    "*" => OpMeta { precedence: 11, assoc: Assoc::Left, commutative: true },
    "/" => OpMeta { precedence: 11, assoc: Assoc::Left, commutative: false },
    "^" => OpMeta { precedence: 12, assoc: Assoc::Right, commutative: false },
};

/// Function precedence is fixed and uniform (spec §3.2).
pub const FUNCTION_PRECEDENCE: u8 = 2;

/// Bracketing-token precedence, also fixed (spec §3.2).
pub const BRACKET_PRECEDENCE: u8 = 20;

/// Function names the tokenizer will recognize as `Function` tokens.
pub static FUNCTION_NAMES: phf::Set<&'static str> = phf_set! {
    "sin", "cos", "tan", "cot", "csc", "sec", "exp", "ln", "log", "sqrt",
};

/// All symbols the tokenizer's longest-prefix trie must know about:
/// operators, function names, and the three bracketing symbols.
pub fn all_symbols() -> impl Iterator<Item = &'static str> {
    OPERATORS
        .keys()
        .copied()
        .chain(FUNCTION_NAMES.iter().copied())
        .chain(["(", ")", "_"])
}

/// The pairwise adjacency table (spec §3.4): does an implicit `*` belong
/// between two adjacent top-level tokens of these classes?
pub fn requires_implicit_multiplication(left: TokenClass, right: TokenClass) -> bool {
    use TokenClass::*;
    matches!(
        (left, right),
        (Number, Number)
            | (Number, Variable)
            | (Number, Function)
            | (Number, LeftParen)
            | (Variable, Number)
            | (Variable, Variable)
            | (Variable, Function)
            | (Variable, LeftParen)
            | (Function, Number)
            | (Function, Variable)
            | (Function, Function)
            | (RightParen, Number)
            | (RightParen, Variable)
            | (RightParen, Function)
    )
}

/// Whether a pair of adjacent token classes is a legal adjacency at all —
/// either because it's an allowed implicit-multiplication pair, or because
/// it's a legitimate operator/paren juxtaposition that needs no `*`
/// inserted (spec §4.1: "Pairs that are neither an allowed adjacency nor a
/// legal implicit-multiplication pair signal a syntax error").
pub fn is_legal_adjacency(left: TokenClass, right: TokenClass) -> bool {
    use TokenClass::*;
    if requires_implicit_multiplication(left, right) {
        return true;
    }
    match (left, right) {
        // an operator (or open paren) always legally precedes any atom
        (Operator, _) | (LeftParen, _) => true,
        // any atom legally precedes an operator or close paren
        (_, Operator) | (_, RightParen) => true,
        (RightParen, LeftParen) => true,
        (LeftParen, RightParen) => true,
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn number_variable_requires_mult() {
        assert!(requires_implicit_multiplication(TokenClass::Number, TokenClass::Variable));
    }

    #[test]
    fn operator_operator_not_required() {
        assert!(!requires_implicit_multiplication(TokenClass::Operator, TokenClass::Operator));
    }

    #[test]
    fn known_operators_present() {
        assert!(OPERATORS.contains_key("^"));
        assert_eq!(OPERATORS["^"].assoc, Assoc::Right);
    }
}
