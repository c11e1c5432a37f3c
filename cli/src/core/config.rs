//! # Conch Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the persisted console configuration: input mode,
//! per-context prompt settings, completion hints and the highlighting style
//! map. The console only ever re-derives its prompt and input-mode fields from
//! this structure; it never fails because a key is missing.
//!
//! ## Architecture
//!
//! - Every field is `#[serde(default)]`, so partial files are valid; unknown
//!   keys are logged with `warn!` and otherwise ignored
//! - `Config::normalized` fills absent highlighting keys and replaces
//!   nonsensical values with built-in defaults
//! - Prompts are looked up per context with `Config::prompt_for`, which
//!   synthesizes a default prompt for contexts without an entry
//!
//! Configuration sources (in order of precedence):
//! 1. A path given explicitly (e.g. the binary's `--config`), `~` expanded
//! 2. User-specific `config.toml` in the platform config directory
//! 3. Default values defined in the code
//!
//! ## Examples
//!
//! ```toml
//! input_mode = "emacs"
//!
//! [prompts.ops]
//! left = "ops"
//! multiline = false
//!
//! [highlighting]
//! command = "\u001b[1;32m"
//! ```
//!
use crate::core::error::{ConsoleError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the configuration file inside the user config directory.
const CONFIG_FILENAME: &str = "config.toml";

const BOLD: &str = "\x1b[1m";
const FOREWHITE: &str = "\x1b[37m";
const HINT_GREY: &str = "\x1b[38;5;248m";

/// Line-editing mode of the shell. Only two values are recognized; any other
/// string in a configuration file is read as `Vim`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputMode {
    #[default]
    Vim,
    Emacs,
}

impl From<String> for InputMode {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("emacs") {
            InputMode::Emacs
        } else {
            InputMode::Vim
        }
    }
}

impl From<InputMode> for String {
    fn from(mode: InputMode) -> Self {
        match mode {
            InputMode::Vim => "vim".to_string(),
            InputMode::Emacs => "emacs".to_string(),
        }
    }
}

/// Semantic token classes that the highlighting map is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Command,
    CommandArgument,
    Option,
    OptionArgument,
    HintText,
}

impl TokenClass {
    pub const ALL: [TokenClass; 5] = [
        TokenClass::Command,
        TokenClass::CommandArgument,
        TokenClass::Option,
        TokenClass::OptionArgument,
        TokenClass::HintText,
    ];

    /// Key of this class in the `highlighting` table.
    pub fn key(self) -> &'static str {
        match self {
            TokenClass::Command => "command",
            TokenClass::CommandArgument => "command-argument",
            TokenClass::Option => "option",
            TokenClass::OptionArgument => "option-argument",
            TokenClass::HintText => "hint-text",
        }
    }

    fn default_style(self) -> &'static str {
        match self {
            TokenClass::Command | TokenClass::Option => BOLD,
            TokenClass::CommandArgument | TokenClass::OptionArgument => FOREWHITE,
            TokenClass::HintText => HINT_GREY,
        }
    }
}

/// Represents the console configuration (prompts, hints, modes, etc).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub input_mode: InputMode,
    pub prompts: HashMap<String, PromptConfig>,
    pub hints: bool,
    pub max_tab_completer_rows: usize,
    pub highlighting: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Vim,
            prompts: HashMap::new(),
            hints: true,
            max_tab_completer_rows: default_max_rows(),
            highlighting: default_highlighting(),
        }
    }
}

/// Prompt settings of a single context.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    pub left: String,
    pub right: String,
    /// Print an empty line before command output.
    pub newline: bool,
    /// Read input on a second line, below the primary prompt.
    pub multiline: bool,
    pub multiline_prompt: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            left: String::new(),
            right: String::new(),
            newline: true,
            multiline: true,
            multiline_prompt: " > ".to_string(),
        }
    }
}

impl PromptConfig {
    /// Newly created contexts get this prompt until a configuration names them.
    pub fn default_for(app: &str, context: &str) -> Self {
        let left = if context.is_empty() {
            app.to_string()
        } else {
            format!("{} ({})", app, context)
        };
        Self {
            left,
            ..Default::default()
        }
    }
}

fn default_max_rows() -> usize {
    50
}

fn default_highlighting() -> HashMap<String, String> {
    TokenClass::ALL
        .iter()
        .map(|class| (class.key().to_string(), class.default_style().to_string()))
        .collect()
}

impl Config {
    /// Substitutes built-in defaults for absent or unusable values.
    pub fn normalized(mut self) -> Self {
        for class in TokenClass::ALL {
            self.highlighting
                .entry(class.key().to_string())
                .or_insert_with(|| class.default_style().to_string());
        }
        if self.max_tab_completer_rows == 0 {
            warn!(
                "max_tab_completer_rows = 0 is not usable, using {}",
                default_max_rows()
            );
            self.max_tab_completer_rows = default_max_rows();
        }
        self
    }

    /// Prompt settings for `context`, or the built-in default prompt.
    pub fn prompt_for(&self, app: &str, context: &str) -> PromptConfig {
        match self.prompts.get(context) {
            Some(prompt) => prompt.clone(),
            None => PromptConfig::default_for(app, context),
        }
    }

    /// Style for a token class. Always present once normalized.
    pub fn highlight(&self, class: TokenClass) -> &str {
        self.highlighting
            .get(class.key())
            .map(String::as_str)
            .unwrap_or_else(|| class.default_style())
    }
}

/// Loads the configuration from `path` if given, otherwise from the user
/// config directory. A missing file yields the defaults.
pub fn load_config(path: Option<&str>) -> Result<Config> {
    let config = match path {
        Some(raw) => {
            let expanded = PathBuf::from(shellexpand::tilde(raw).into_owned());
            debug!("Expanded configuration path: {}", expanded.display());
            if !expanded.is_file() {
                return Err(ConsoleError::Config(format!(
                    "Configuration file '{}' does not exist.",
                    expanded.display()
                ))
                .into());
            }
            info!("Loading configuration from: {}", expanded.display());
            load_config_from_path(&expanded)?
        }
        None => load_user_config()?.unwrap_or_default(),
    };
    let config = config.normalized();
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Conch", "conch") {
        let config_path = proj_dirs.config_dir().join(CONFIG_FILENAME);
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

const CONFIG_KEYS: [&str; 5] = [
    "input_mode",
    "prompts",
    "hints",
    "max_tab_completer_rows",
    "highlighting",
];
const PROMPT_KEYS: [&str; 5] = ["left", "right", "newline", "multiline", "multiline_prompt"];

pub(crate) fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    let table: toml::Table = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))?;
    for key in unknown_keys(&table) {
        warn!("Ignoring unknown configuration key '{}' in {}", key, path.display());
    }
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Dotted paths of keys that no configuration field reads.
fn unknown_keys(table: &toml::Table) -> Vec<String> {
    let mut unknown = Vec::new();
    for (key, value) in table {
        if !CONFIG_KEYS.contains(&key.as_str()) {
            unknown.push(key.clone());
            continue;
        }
        if key != "prompts" {
            continue;
        }
        let Some(prompts) = value.as_table() else {
            continue;
        };
        for (context, prompt) in prompts {
            let Some(prompt) = prompt.as_table() else {
                continue;
            };
            unknown.extend(
                prompt
                    .keys()
                    .filter(|k| !PROMPT_KEYS.contains(&k.as_str()))
                    .map(|k| format!("prompts.{}.{}", context, k)),
            );
        }
    }
    unknown
}
