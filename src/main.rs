//! CLI entry point (spec §6.1): parses a function, differentiates it with
//! respect to a variable, and emits the structured rewrite trace as JSON.
//! This is the single place a `Syntax` error is downgraded to a process
//! exit code (spec §7): every engine-level operation otherwise returns
//! `Result` and propagates with `?`.

use clap::Parser;

use symd::common::source::Source;
use symd::compiler::differentiate::differentiate;
use symd::compiler::format::Mode;
use symd::compiler::simplify::simplify;
use symd::compiler::trace::{Approximation, EqualityTest, RewriteLog, Trace};
use symd::compiler::tree::trees_equal;
use symd::{parse, parse_variable};

/// A symbolic differentiation engine for single-variable real expressions.
#[derive(Parser, Debug)]
#[command(name = "symd")]
#[command(about = "Symbolically differentiate a single-variable expression", long_about = None)]
#[command(version)]
struct Cli {
    /// The function to differentiate (a bare positional argument is
    /// equivalent to `--function`).
    #[arg(short = 'f', long = "function")]
    function: Option<String>,

    /// Bare positional form of `--function`.
    positional_function: Option<String>,

    /// The differentiation variable (defaults to `x`).
    #[arg(short = 'v', long = "variable", default_value = "x")]
    variable: String,

    /// An expression to test for structural equality against the
    /// computed derivative.
    #[arg(short = 't', long = "test")]
    test: Option<String>,

    /// A point at which to numerically approximate the derivative.
    #[arg(short = 'n', long = "approximate")]
    approximate: Option<f64>,

    /// Emit the trace in LaTeX instead of plain text.
    #[arg(long = "latex")]
    latex: bool,
}

impl Cli {
    fn function(&self) -> Option<&str> {
        self.function.as_deref().or(self.positional_function.as_deref())
    }
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(json) => {
            println!("{}", json);
            std::process::exit(0);
        }
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String, String> {
    let function = cli.function().ok_or_else(|| "Error: no function given (use -f/--function)".to_string())?;
    let mode = if cli.latex { Mode::LaTeX } else { Mode::Text };

    let source = Source::source(function);
    let parsed = parse(&source).map_err(|e| e.to_string())?;
    let simplified_once = simplify(parsed, false).map_err(|e| e.to_string())?;

    let var = parse_variable(&cli.variable).map_err(|e| e.to_string())?;

    let mut log = RewriteLog::new();
    let derivative = differentiate(&simplified_once, var, &mut log).map_err(|e| e.to_string())?;

    let equality_tests = match &cli.test {
        Some(test_expr) => {
            let test_source = Source::source(test_expr);
            let test_tree = parse(&test_source).map_err(|e| e.to_string())?;
            let test_simplified = simplify(test_tree, false).map_err(|e| e.to_string())?;
            Some(vec![EqualityTest {
                expression: test_expr.clone(),
                equal: trees_equal(&test_simplified, &derivative),
            }])
        }
        None => None,
    };

    let approximations = match cli.approximate {
        Some(value) => {
            let result = symd::compiler::approximate::approximate(&derivative, var, value)
                .map_err(|e| e.to_string())?;
            Some(vec![Approximation { value, result }])
        }
        None => None,
    };

    let trace = Trace::build(&log, function, &derivative, mode, equality_tests, approximations);
    trace.to_json_pretty().map_err(|e| format!("Error: failed to serialize trace: {}", e))
}

#[cfg(test)]
mod test {
    use super::*;

    fn cli(function: &str, variable: &str) -> Cli {
        Cli {
            function: Some(function.to_string()),
            positional_function: None,
            variable: variable.to_string(),
            test: None,
            approximate: None,
            latex: false,
        }
    }

    #[test]
    fn run_produces_valid_json() {
        let args = cli("x^3", "x");
        let json = run(&args).expect("run should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).expect("output should be valid JSON");
        assert_eq!(value["input"], "x^3");
    }

    #[test]
    fn run_reports_an_error_for_bad_input() {
        let args = cli("sin(x", "x");
        assert!(run(&args).is_err());
    }

    #[test]
    fn approximate_flag_adds_approximations() {
        let mut args = cli("x^2", "x");
        args.approximate = Some(3.0);
        let json = run(&args).expect("run should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert!(value["approximations"].is_array());
    }

    #[test]
    fn test_flag_adds_equality_tests() {
        let mut args = cli("x^2", "x");
        args.test = Some("2*x".to_string());
        let json = run(&args).expect("run should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["equality tests"][0]["equal"], true);
    }
}
