//! Exercises the CLI surface (spec §6.1) as a subprocess.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn bare_positional_argument_is_the_function() {
    Command::cargo_bin("symd")
        .unwrap()
        .arg("x^2")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"input\": \"x^2\""));
}

#[test]
fn flag_form_differentiates_with_respect_to_the_given_variable() {
    Command::cargo_bin("symd")
        .unwrap()
        .args(["--function", "t^2", "--variable", "t"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"output\""));
}

#[test]
fn approximate_flag_populates_approximations() {
    Command::cargo_bin("symd")
        .unwrap()
        .args(["-f", "x^2", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"approximations\""));
}

#[test]
fn invalid_expression_exits_nonzero_with_a_message_on_stderr() {
    Command::cargo_bin("symd")
        .unwrap()
        .arg("sin(x")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn missing_function_argument_exits_nonzero() {
    Command::cargo_bin("symd").unwrap().assert().failure().code(1);
}
