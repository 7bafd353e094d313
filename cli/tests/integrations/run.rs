use assert_cmd::Command;
use predicates::prelude::*;

fn calculo() -> Command {
    Command::cargo_bin("calculo").unwrap()
}

#[test]
fn test_cli_sign_study() {
    let mut cmd = calculo();
    cmd.arg("sign").arg("(2-x)/(3-x)").arg("--plain");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("positive:  (-∞, 2) ∪ (3, +∞)"))
        .stdout(predicate::str::contains("negative:  (2, 3)"))
        .stdout(predicate::str::contains("zero:      {2}"))
        .stdout(predicate::str::contains("undefined: {3}"));
}

#[test]
fn test_cli_sign_study_table() {
    let mut cmd = calculo();
    cmd.arg("sign").arg("(2-x)/(3-x)");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Values of x"))
        .stdout(predicate::str::contains("(-∞, 2) ∪ (3, +∞)"));
}

#[test]
fn test_cli_solve() {
    let mut cmd = calculo();
    cmd.arg("solve").arg("x**2 - 4").arg("<=").arg("--plain");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("x**2 - 4 <= 0: [-2, 2]"));
}

#[test]
fn test_cli_solve_rejects_non_inequalities() {
    let mut cmd = calculo();
    cmd.arg("solve").arg("x - 1").arg("!=");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid relation"));
}

#[test]
fn test_cli_limit() {
    let mut cmd = calculo();
    cmd.arg("limit").arg("(x**2 - 4)/(x - 2)").arg("2").arg("--plain");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("lim x→2 (x**2 - 4)/(x - 2) = 4"));
}

#[test]
fn test_cli_limit_at_infinity() {
    let mut cmd = calculo();
    cmd.arg("limit").arg("(3x**2 - x)/(1 - x**2)").arg("oo").arg("--plain");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("= -3"));
}

#[test]
fn test_cli_limit_failure_exits_with_error() {
    let mut cmd = calculo();
    cmd.arg("limit").arg("1/x").arg("0");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("limit failure: limit does not exist"));
}

#[test]
fn test_cli_limit_json() {
    let mut cmd = calculo();
    cmd.arg("limit").arg("(x**2 - 4)/(x - 2)").arg("2").arg("--json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"value\""))
        .stdout(predicate::str::contains("\"value\": \"4\""));
}

#[test]
fn test_cli_derivative() {
    let mut cmd = calculo();
    cmd.arg("derivative").arg("x**3").arg("--plain");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("d/dx x**3 = 3*x**2"));
}

#[test]
fn test_cli_derivative_in_another_variable() {
    let mut cmd = calculo();
    cmd.arg("derivative")
        .arg("t**2")
        .arg("--var")
        .arg("t")
        .arg("--increment")
        .arg("k")
        .arg("--plain");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("= 2*t"));
}

#[test]
fn test_cli_derivative_increment_must_be_fresh() {
    let mut cmd = calculo();
    cmd.arg("derivative").arg("x + h").arg("--plain");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("derivative failure"));
}

#[test]
fn test_cli_continuity_jump() {
    let mut cmd = calculo();
    cmd.arg("continuity")
        .arg("piecewise((2x, x <= 1), 1)")
        .arg("1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("right limit"))
        .stdout(predicate::str::contains("discontinuous (jump)"));
}

#[test]
fn test_cli_continuity_at_infinity_fails() {
    let mut cmd = calculo();
    cmd.arg("continuity").arg("x").arg("oo");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("analysis failure"));
}

#[test]
fn test_cli_parse_error_shows_source() {
    let mut cmd = calculo();
    cmd.arg("sign").arg("sin(x)");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown function 'sin'"))
        .stderr(predicate::str::contains("supported functions: abs, sqrt, piecewise"));
}

#[test]
fn test_cli_invalid_point() {
    let mut cmd = calculo();
    cmd.arg("limit").arg("x").arg("two");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn test_cli_invalid_variable() {
    let mut cmd = calculo();
    cmd.arg("sign").arg("x").arg("--var").arg("xy");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a variable name"));
}

#[test]
fn test_cli_degree_limit() {
    let mut cmd = calculo();
    cmd.arg("sign").arg("x**10").arg("--max-degree").arg("4");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the maximum of 4"));
}
