//! # Conch REPL Integration Tests
//!
//! File: cli/tests/repl.rs
//!
//! ## Overview
//!
//! Drives the demo console through piped stdin and checks what each cycle
//! prints. Every line is one read/rebuild/execute cycle, so state changed by
//! a command (context, filters) shows up on the following line.
//!

mod common;
use common::conch_with_defaults;
use predicates::prelude::*;

#[test]
fn test_status_in_default_context() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin("status\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("context: (default)"))
        .stdout(predicate::str::contains("filters: none"));
}

#[test]
fn test_switch_context_and_run_ops_commands() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin("use ops\nstatus\ndrain node-a\ndrain node-b --grace 5\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to context 'ops'"))
        .stdout(predicate::str::contains("context: ops"))
        .stdout(predicate::str::contains("Draining node-a (grace 30s)"))
        .stdout(predicate::str::contains("Draining node-b (grace 5s)"));
}

#[test]
fn test_inherited_option_group_reaches_nested_commands() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin("use ops\ndrain node-c --dry-run\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run] Draining node-c (grace 30s)"));
}

#[test]
fn test_subcommands() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin("use ops\nnodes list\nnodes cordon node-b\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("node-a\n"))
        .stdout(predicate::str::contains("Cordoned node-b"));
}

#[test]
fn test_hidden_commands_are_refused_until_shown() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin(
        "use ops\nhide dangerous\ndrain node-a\nnodes cordon node-a\nshow dangerous\ndrain node-a\nexit\n",
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("Commands tagged 'dangerous' are now hidden"))
    .stderr(predicate::str::contains(
        "Command 'drain' is not available in this context.",
    ))
    .stderr(predicate::str::contains(
        "Command 'cordon' is not available in this context.",
    ))
    .stdout(predicate::str::contains("Commands tagged 'dangerous' are visible again"))
    .stdout(predicate::str::contains("Draining node-a (grace 30s)"));
}

#[test]
fn test_commands_are_scoped_to_their_context() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin("drain node-a\nuse ops\nback\nstatus\nexit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("unrecognized subcommand 'drain'"))
        .stdout(predicate::str::contains("context: (default)"));
}

#[test]
fn test_errors_do_not_end_the_loop() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin("use nowhere\nstatus \"unbalanced\nstatus\nexit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Context 'nowhere' not found."))
        .stderr(predicate::str::contains("Unbalanced quotes"))
        .stdout(predicate::str::contains("context: (default)"));
}

#[test]
fn test_contexts_listing_marks_current() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin("use ops\ncontexts\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("  (default)"))
        .stdout(predicate::str::contains("* ops"));
}

#[test]
fn test_exit_stops_reading_input() {
    let (_dir, mut cmd) = conch_with_defaults();
    cmd.write_stdin("exit\nstatus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("context:").not());
}
