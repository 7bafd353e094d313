use assert_cmd::Command;
use predicates::prelude::*;

fn menu() -> Command {
    let mut cmd = Command::cargo_bin("calculo").unwrap();
    cmd.arg("menu").arg("--plain");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("calculo").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("calculo"))
        .stdout(predicate::str::contains("menu"))
        .stdout(predicate::str::contains("continuity"));
}

#[test]
fn test_menu_without_input_exits_cleanly() {
    let mut cmd = Command::cargo_bin("calculo").unwrap();

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1. Sign study"))
        .stdout(predicate::str::contains("Goodbye!"));
}

#[test]
fn test_menu_limit() {
    let mut cmd = menu();
    cmd.write_stdin("2\n(x**2 - 4)/(x - 2)\n2\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("lim x→2 (x**2 - 4)/(x - 2) = 4"))
        .stdout(predicate::str::contains("Goodbye!"));
}

#[test]
fn test_menu_sign_study() {
    let mut cmd = menu();
    cmd.write_stdin("1\n(2-x)/(3-x)\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("undefined: {3}"));
}

#[test]
fn test_menu_continues_after_failures() {
    let mut cmd = menu();
    // limit failure, then a parse error, then a derivative
    cmd.write_stdin("2\n1/x\n0\n3\nsin(x)\n3\nx**2\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("limit failure"))
        .stderr(predicate::str::contains("Unknown function 'sin'"))
        .stdout(predicate::str::contains("d/dx x**2 = 2*x"))
        .stdout(predicate::str::contains("Goodbye!"));
}

#[test]
fn test_menu_continuity() {
    let mut cmd = menu();
    cmd.write_stdin("4\nx**2\n1\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("verdict:     continuous"));
}

#[test]
fn test_menu_rejects_unknown_options() {
    let mut cmd = menu();
    cmd.write_stdin("7\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Invalid option '7': enter a number from 1 to 5",
        ));
}
