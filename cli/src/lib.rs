//! # Conch Library Root
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! Conch is the runtime core of an interactive console application. It keeps
//! one or more independently configured contexts, each with a persistent
//! tree of commands, and at every read-eval cycle regenerates a fresh clap
//! parser for the current context, hiding the commands whose filter tags are
//! active.
//!
//! ## Architecture
//!
//! - `core`: configuration and error infrastructure
//! - `console`: the registry (`Console`), contexts, command tree, option
//!   groups, completion hooks, the rebuild engine and the shell seam
//!
//! The most used types are re-exported at the crate root.
//!
pub mod console;
pub mod core;

pub use crate::console::command::{
    data_factory, ArgsCommand, CommandGroup, CommandNode, CommandPayload, CommandSpec, DataFactory,
};
pub use crate::console::completion::{CompletionKey, CompletionProvider, CompletionRequest};
pub use crate::console::generated::{GeneratedTree, Handle, ParserOptions, ParserSink};
pub use crate::console::menu::{CycleState, Menu};
pub use crate::console::options::OptionGroup;
pub use crate::console::rebuild::RebuildReport;
pub use crate::console::shell::{Shell, StdioShell};
pub use crate::console::{CommandListing, Console, ConsoleHandle};
pub use crate::core::config::{Config, InputMode, PromptConfig, TokenClass};
pub use crate::core::error::{ConsoleError, Result};
