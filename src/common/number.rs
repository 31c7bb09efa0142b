use std::fmt::{self, Display, Formatter};

/// A numeric literal, distinguishing integer from double storage so the
/// simplifier can keep exact integer results exact (spec §3.1, §4.5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    pub fn is_one(self) -> bool {
        match self {
            Number::Int(i) => i == 1,
            Number::Float(f) => f == 1.0,
        }
    }

    pub fn negate(self) -> Number {
        match self {
            Number::Int(i) => Number::Int(-i),
            Number::Float(f) => Number::Float(-f),
        }
    }

    /// Demotes a raw double result back to an integer representation
    /// whenever it is exactly integral, mirroring the original
    /// `performOperation`'s `modf` check.
    pub fn from_f64(value: f64) -> Number {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Number::Int(value as i64)
        } else {
            Number::Float(value)
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}
