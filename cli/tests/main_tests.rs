//! # Conch CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `conch` binary: standard flags, startup
//! options and configuration loading failures.
//!

mod common;
use common::{conch_cmd, conch_with_defaults, write_config};
use predicates::prelude::*;

#[test]
fn test_version_flag() {
    conch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    conch_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: conch"))
        .stdout(predicate::str::contains("--context"))
        .stdout(predicate::str::contains("--filter"));
}

#[test]
fn test_empty_input_exits_cleanly() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin("").assert().success();
}

#[test]
fn test_missing_config_file_fails() {
    conch_cmd()
        .arg("--config")
        .arg("/definitely/not/here/conch.toml")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_malformed_config_file_fails() {
    let (_dir, path) = write_config("input_mode = [");
    conch_cmd()
        .arg("--config")
        .arg(path)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse TOML"));
}

#[test]
fn test_unknown_start_context_fails() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.arg("--context")
        .arg("nowhere")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Context 'nowhere' not found."));
}

#[test]
fn test_start_context_and_filter_flags() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.args(["--context", "ops", "--filter", "dangerous"])
        .write_stdin("status\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("context: ops"))
        .stdout(predicate::str::contains("filters: dangerous"));
}

#[test]
fn test_configured_prompt_is_rendered() {
    let (_dir, path) = write_config(
        r#"
        [prompts.""]
        left = "shell>"
        newline = false
        multiline = false
        "#,
    );
    conch_cmd()
        .arg("--config")
        .arg(path)
        .write_stdin("exit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("shell>"));
}

#[test]
fn test_unknown_config_keys_are_tolerated() {
    let (_dir, path) = write_config(
        r#"
        input_mode = "emacs"
        colour_scheme = "dark"
        "#,
    );
    conch_cmd()
        .arg("--config")
        .arg(path)
        .write_stdin("status\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("context: (default)"));
}
