//! The rewrite log (spec §4.9): one entry per differentiation rule
//! applied, recorded append-only as differentiation proceeds and emitted
//! at the end as a structured trace (spec §6.3).
//!
//! Field names and ordering are taken from `log.cpp`'s
//! `logChainRule`/`logProductRule`/`logQuotientRule`/`logPowerRule`/
//! `logAddition`/`logSubtraction` (spec §11): each step keeps its own
//! operand snapshots rather than re-deriving them later, since a node's
//! cached derivative may change identity across repeated simplification
//! passes.

use serde::Serialize;

use crate::compiler::format::{self, Mode};
use crate::compiler::tree::Expr;

/// One rewrite-rule application, holding the operand subtrees involved so
/// they can be rendered in whichever notation the caller picked.
#[derive(Debug, Clone)]
pub enum Step {
    Chain { function: Expr, u_prime: Expr, derivative: Expr },
    Product { expression: Expr, u: Expr, v: Expr, u_prime: Expr, v_prime: Expr, derivative: Expr },
    Quotient { expression: Expr, u: Expr, v: Expr, u_prime: Expr, v_prime: Expr, derivative: Expr },
    Power {
        expression: Expr,
        base: Expr,
        exponent: Expr,
        base_prime: Expr,
        exponent_prime: Expr,
        derivative: Expr,
    },
    Addition { expression: Expr, left_prime: Expr, right_prime: Expr, derivative: Expr },
    Subtraction { expression: Expr, left_prime: Expr, right_prime: Expr, derivative: Expr },
}

impl Step {
    pub fn chain_rule(function: &Expr, u_prime: &Expr, derivative: &Expr) -> Step {
        Step::Chain { function: function.clone(), u_prime: u_prime.clone(), derivative: derivative.clone() }
    }

    pub fn product(expr: &Expr, u: &Expr, v: &Expr, u_prime: &Expr, v_prime: &Expr, derivative: &Expr) -> Step {
        Step::Product {
            expression: expr.clone(),
            u: u.clone(),
            v: v.clone(),
            u_prime: u_prime.clone(),
            v_prime: v_prime.clone(),
            derivative: derivative.clone(),
        }
    }

    pub fn quotient(expr: &Expr, u: &Expr, v: &Expr, u_prime: &Expr, v_prime: &Expr, derivative: &Expr) -> Step {
        Step::Quotient {
            expression: expr.clone(),
            u: u.clone(),
            v: v.clone(),
            u_prime: u_prime.clone(),
            v_prime: v_prime.clone(),
            derivative: derivative.clone(),
        }
    }

    pub fn power(
        expr: &Expr,
        base: &Expr,
        exponent: &Expr,
        base_prime: &Expr,
        exponent_prime: &Expr,
        derivative: &Expr,
    ) -> Step {
        Step::Power {
            expression: expr.clone(),
            base: base.clone(),
            exponent: exponent.clone(),
            base_prime: base_prime.clone(),
            exponent_prime: exponent_prime.clone(),
            derivative: derivative.clone(),
        }
    }

    pub fn addition(expr: &Expr, left_prime: &Expr, right_prime: &Expr, derivative: &Expr) -> Step {
        Step::Addition {
            expression: expr.clone(),
            left_prime: left_prime.clone(),
            right_prime: right_prime.clone(),
            derivative: derivative.clone(),
        }
    }

    pub fn subtraction(expr: &Expr, left_prime: &Expr, right_prime: &Expr, derivative: &Expr) -> Step {
        Step::Subtraction {
            expression: expr.clone(),
            left_prime: left_prime.clone(),
            right_prime: right_prime.clone(),
            derivative: derivative.clone(),
        }
    }

    /// Renders this step's operand subtrees into the JSON-serializable
    /// shape described in spec §6.3, in `mode` notation.
    pub fn render(&self, mode: Mode) -> RenderedStep {
        let r = |e: &Expr| format::render(e, mode);
        match self {
            Step::Chain { function, u_prime, derivative } => RenderedStep::Chain {
                rule: "chain",
                function: r(function),
                u_prime: r(u_prime),
                derivative: r(derivative),
            },
            Step::Product { expression, u, v, u_prime, v_prime, derivative } => RenderedStep::Product {
                rule: "product",
                expression: r(expression),
                u: r(u),
                v: r(v),
                u_prime: r(u_prime),
                v_prime: r(v_prime),
                derivative: r(derivative),
            },
            Step::Quotient { expression, u, v, u_prime, v_prime, derivative } => RenderedStep::Quotient {
                rule: "quotient",
                expression: r(expression),
                u: r(u),
                v: r(v),
                u_prime: r(u_prime),
                v_prime: r(v_prime),
                derivative: r(derivative),
            },
            Step::Power { expression, base, exponent, base_prime, exponent_prime, derivative } => {
                RenderedStep::Power {
                    rule: "power",
                    expression: r(expression),
                    base: r(base),
                    exponent: r(exponent),
                    base_derivative: r(base_prime),
                    exponent_derivative: r(exponent_prime),
                    derivative: r(derivative),
                }
            }
            Step::Addition { expression, left_prime, right_prime, derivative } => RenderedStep::Addition {
                rule: "addition",
                expression: r(expression),
                left_derivative: r(left_prime),
                right_derivative: r(right_prime),
                derivative: r(derivative),
            },
            Step::Subtraction { expression, left_prime, right_prime, derivative } => RenderedStep::Subtraction {
                rule: "subtraction",
                expression: r(expression),
                left_derivative: r(left_prime),
                right_derivative: r(right_prime),
                derivative: r(derivative),
            },
        }
    }
}

/// The serializable form of a `Step`: plain strings, one variant per rule,
/// with field order matching `log.cpp` exactly (spec §11).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RenderedStep {
    Chain {
        #[serde(rename = "Rule")]
        rule: &'static str,
        #[serde(rename = "Function")]
        function: String,
        #[serde(rename = "u'")]
        u_prime: String,
        #[serde(rename = "derivative")]
        derivative: String,
    },
    Product {
        #[serde(rename = "Rule")]
        rule: &'static str,
        #[serde(rename = "Expression")]
        expression: String,
        #[serde(rename = "u")]
        u: String,
        #[serde(rename = "v")]
        v: String,
        #[serde(rename = "u'")]
        u_prime: String,
        #[serde(rename = "v'")]
        v_prime: String,
        #[serde(rename = "derivative")]
        derivative: String,
    },
    Quotient {
        #[serde(rename = "Rule")]
        rule: &'static str,
        #[serde(rename = "Expression")]
        expression: String,
        #[serde(rename = "u")]
        u: String,
        #[serde(rename = "v")]
        v: String,
        #[serde(rename = "u'")]
        u_prime: String,
        #[serde(rename = "v'")]
        v_prime: String,
        #[serde(rename = "derivative")]
        derivative: String,
    },
    Power {
        #[serde(rename = "Rule")]
        rule: &'static str,
        #[serde(rename = "Expression")]
        expression: String,
        #[serde(rename = "base")]
        base: String,
        #[serde(rename = "exponent")]
        exponent: String,
        #[serde(rename = "base derivative'")]
        base_derivative: String,
        #[serde(rename = "exponent derivative'")]
        exponent_derivative: String,
        #[serde(rename = "derivative")]
        derivative: String,
    },
    Addition {
        #[serde(rename = "Rule")]
        rule: &'static str,
        #[serde(rename = "Expression")]
        expression: String,
        #[serde(rename = "left derivative'")]
        left_derivative: String,
        #[serde(rename = "right derivative'")]
        right_derivative: String,
        #[serde(rename = "derivative")]
        derivative: String,
    },
    Subtraction {
        #[serde(rename = "Rule")]
        rule: &'static str,
        #[serde(rename = "Expression")]
        expression: String,
        #[serde(rename = "left derivative'")]
        left_derivative: String,
        #[serde(rename = "right derivative'")]
        right_derivative: String,
        #[serde(rename = "derivative")]
        derivative: String,
    },
}

/// The append-only log differentiation writes to (spec §4.9).
#[derive(Debug, Clone, Default)]
pub struct RewriteLog {
    pub steps: Vec<Step>,
}

impl RewriteLog {
    pub fn new() -> RewriteLog {
        RewriteLog { steps: Vec::new() }
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }
}

/// An equality-test result (`-t/--test`): the test expression's rendered
/// text paired with whether it is structurally equal to the derivative.
#[derive(Debug, Clone, Serialize)]
pub struct EqualityTest {
    pub expression: String,
    pub equal: bool,
}

/// An approximation result (`-n/--approximate`): the bound value paired
/// with the numeric result.
#[derive(Debug, Clone, Serialize)]
pub struct Approximation {
    pub value: f64,
    pub result: f64,
}

/// The full structured trace emitted on stdout (spec §6.3).
#[derive(Debug, Serialize)]
pub struct Trace {
    pub steps: Vec<RenderedStep>,
    pub input: String,
    pub output: String,
    #[serde(rename = "equality tests", skip_serializing_if = "Option::is_none")]
    pub equality_tests: Option<Vec<EqualityTest>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approximations: Option<Vec<Approximation>>,
    pub mode: String,
}

impl Trace {
    pub fn build(
        log: &RewriteLog,
        input: &str,
        output: &Expr,
        mode: Mode,
        equality_tests: Option<Vec<EqualityTest>>,
        approximations: Option<Vec<Approximation>>,
    ) -> Trace {
        Trace {
            steps: log.steps.iter().map(|s| s.render(mode)).collect(),
            input: input.to_string(),
            output: format::render(output, mode),
            equality_tests,
            approximations,
            mode: match mode {
                Mode::Text => "text".to_string(),
                Mode::LaTeX => "latex".to_string(),
            },
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::number::Number;

    #[test]
    fn chain_step_renders_expected_keys() {
        let function = Expr::call("sin", None, Expr::variable('x', None));
        let u_prime = Expr::number(Number::Int(1));
        let derivative = Expr::call("cos", None, Expr::variable('x', None));
        let step = Step::chain_rule(&function, &u_prime, &derivative);
        let rendered = serde_json::to_value(step.render(Mode::Text)).unwrap();
        assert_eq!(rendered["Rule"], "chain");
        assert_eq!(rendered["Function"], "sin(x)");
    }

    #[test]
    fn trace_serializes_without_optional_fields() {
        let log = RewriteLog::new();
        let output = Expr::number(Number::Int(1));
        let trace = Trace::build(&log, "x", &output, Mode::Text, None, None);
        let json = trace.to_json_pretty().unwrap();
        assert!(!json.contains("equality tests"));
        assert!(json.contains("\"mode\""));
    }
}
