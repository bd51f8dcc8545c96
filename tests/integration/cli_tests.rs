//! CLI skeleton tests: help, version, and argument validation.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn stagectl() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stagectl"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    stagectl()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Staging environment control"));
}

#[test]
fn help_lists_every_action() {
    stagectl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--stop"))
        .stdout(predicate::str::contains("--upload"))
        .stdout(predicate::str::contains("--start"))
        .stdout(predicate::str::contains("--restart"))
        .stdout(predicate::str::contains("--start-db"))
        .stdout(predicate::str::contains("--stop-all"));
}

#[test]
fn version_flag_shows_version() {
    stagectl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stagectl"));
}

#[test]
fn start_rejects_a_zero_count() {
    stagectl()
        .args(["--start", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn start_requires_a_count() {
    stagectl().arg("--start").assert().code(2);
}

#[test]
fn unknown_flags_are_rejected() {
    stagectl()
        .arg("--destroy-prod")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}
