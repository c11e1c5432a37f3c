//! # Conch Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout the console runtime.
//! Nothing in here is fatal to the interactive loop: every variant describes
//! a command, context or line that is unavailable for the current cycle.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `ConsoleError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The error types cover three families:
//! - Declaration errors (a command registered without a data factory)
//! - Generation errors (the parser rejects a node during a rebuild cycle)
//! - Lookup misses and dispatch refusals
//!
//! ## Examples
//!
//! ```rust,ignore
//! match console.execute_line(line) {
//!     Err(e) if e.downcast_ref::<ConsoleError>().map_or(false, |ce| matches!(ce, ConsoleError::CommandUnavailable { .. })) => {
//!         console.log("That command is filtered right now.\n");
//!     }
//!     other => other?,
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for the console runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command '{name}' has no data factory and was not registered.")]
    MissingDataFactory { name: String },

    #[error("Invalid command name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Command '{name}' is already generated under the same parent.")]
    DuplicateCommand { name: String },

    #[error("Conflicting flag definition '{flag}' on command '{command}'.")]
    ConflictingFlag { command: String, flag: String },

    #[error("Invalid option '{flag}' in group '{group}': {reason}")]
    InvalidOption {
        group: String,
        flag: String,
        reason: String,
    },

    #[error("Generated handle from cycle {handle_cycle} used during cycle {current_cycle}.")]
    StaleHandle {
        handle_cycle: u64,
        current_cycle: u64,
    },

    #[error("Context '{name}' not found.")]
    ContextNotFound { name: String },

    #[error("Command '{name}' not found.")]
    CommandNotFound { name: String },

    #[error("Command '{name}' is not available in this context.")]
    CommandUnavailable { name: String },

    #[error("No command given.")]
    NoCommand,

    #[error("Unbalanced quotes in input line: {0}")]
    UnbalancedQuotes(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let missing = ConsoleError::MissingDataFactory {
            name: "drain".into(),
        };
        assert_eq!(
            missing.to_string(),
            "Command 'drain' has no data factory and was not registered."
        );

        let stale = ConsoleError::StaleHandle {
            handle_cycle: 2,
            current_cycle: 5,
        };
        assert_eq!(
            stale.to_string(),
            "Generated handle from cycle 2 used during cycle 5."
        );

        let unavailable = ConsoleError::CommandUnavailable {
            name: "drain".into(),
        };
        assert_eq!(
            unavailable.to_string(),
            "Command 'drain' is not available in this context."
        );
    }

    #[test]
    fn test_error_downcasts_through_anyhow() {
        let err: anyhow::Error = ConsoleError::ContextNotFound { name: "ops".into() }.into();
        assert!(matches!(
            err.downcast_ref::<ConsoleError>(),
            Some(ConsoleError::ContextNotFound { name }) if name == "ops"
        ));
    }
}
