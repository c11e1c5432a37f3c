//! # Conch Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! declares `mod common;` and uses what it needs.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// # Get Conch Command (`conch_cmd`)
///
/// Creates an `assert_cmd::Command` pointing at the compiled `conch` binary.
///
/// ## Panics
/// Panics if the `conch` binary cannot be found via `Command::cargo_bin`.
pub fn conch_cmd() -> Command {
    Command::cargo_bin("conch").expect("Failed to find conch binary for testing")
}

/// Writes `content` as a config file in a fresh temporary directory.
///
/// The returned `TempDir` must be kept alive for as long as the path is used.
pub fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("conch.toml");
    std::fs::write(&path, content).expect("Failed to write config file");
    (dir, path)
}

/// A `conch` command reading an empty config, so a user config file on the
/// test machine does not leak in.
pub fn conch_with_defaults() -> (TempDir, Command) {
    let (dir, path) = write_config("");
    let mut cmd = conch_cmd();
    cmd.arg("--config").arg(path);
    (dir, cmd)
}
