//! # Conch Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by the console runtime:
//! - `config`: Persisted console configuration and its defaults
//! - `error`: Error types and the `Result` alias
//!
//! ```rust,ignore
//! use crate::core::config::{Config, InputMode};
//! use crate::core::error::{ConsoleError, Result};
//! ```
//!
pub mod config;
pub mod error;
