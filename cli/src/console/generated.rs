//! # Generated Parser Arena
//!
//! File: cli/src/console/generated.rs
//!
//! ## Overview
//!
//! Everything in this module lives for exactly one interactive cycle. A
//! `GeneratedTree` is the parser-side mirror of a context's command tree:
//! one `GeneratedCommand` per persistent `CommandNode`, each holding the
//! payload instance its data factory produced for this cycle and the clap
//! command describing its flags.
//!
//! ## Architecture
//!
//! - Commands are stored in a flat arena and referenced by `Handle`, an
//!   index stamped with the cycle that created it. Persistent nodes keep only
//!   that handle, so a handle from an older cycle is detected instead of
//!   dangling.
//! - `ParserSink` is the seam the rebuild engine writes through: reset, add
//!   command, add option group, mark hidden, mark subcommands optional.
//! - The full `clap::Command` is assembled from the arena on demand, when a
//!   line is dispatched or a completer asks for it.
//!
//! clap asserts (panics) on malformed definitions, so the sink checks names
//! and flag collisions itself and rejects the offending command instead.
//!
use crate::console::command::CommandPayload;
use crate::console::ConsoleHandle;
use crate::core::error::{ConsoleError, Result};
use clap::{Arg, ArgMatches, ColorChoice, Command};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

type SinkResult<T> = std::result::Result<T, ConsoleError>;

/// Reference to a generated command, valid only during the cycle it was
/// created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    cycle: u64,
    index: usize,
}

impl Handle {
    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}

/// Static parser settings applied to every fresh tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Offer a `help` subcommand on commands that have subcommands.
    pub help_subcommand: bool,
    /// Offer `-h`/`--help` on every command.
    pub help_flag: bool,
    pub color: ColorChoice,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            help_subcommand: true,
            help_flag: true,
            color: ColorChoice::Auto,
        }
    }
}

/// The operations the rebuild engine needs from a parser.
pub trait ParserSink {
    /// Drops everything generated so far and starts cycle `cycle`.
    fn reset(&mut self, cycle: u64, options: &ParserOptions);

    /// Registers a command under `parent` (or at the top level).
    fn add_command(
        &mut self,
        parent: Option<Handle>,
        name: &str,
        short: &str,
        long: &str,
        payload: Box<dyn CommandPayload>,
    ) -> SinkResult<Handle>;

    /// Adds flags available to `target` and its descendants, or to every
    /// command when `target` is `None`.
    fn add_option_group(
        &mut self,
        target: Option<Handle>,
        short: &str,
        long: &str,
        flags: Vec<Arg>,
    ) -> SinkResult<()>;

    fn mark_hidden(&mut self, handle: Handle) -> SinkResult<()>;

    fn set_subcommands_optional(&mut self, handle: Handle, optional: bool) -> SinkResult<()>;
}

/// One generated command.
pub struct GeneratedCommand {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
    hidden: bool,
    subcommands_optional: bool,
    option_groups: Vec<String>,
    command: Command,
    payload: Box<dyn CommandPayload>,
}

impl GeneratedCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn subcommands_optional(&self) -> bool {
        self.subcommands_optional
    }

    /// Labels of the option groups attached directly to this command.
    pub fn option_groups(&self) -> &[String] {
        &self.option_groups
    }

    /// The clap command for this node alone, without subcommands.
    pub fn command(&self) -> &Command {
        &self.command
    }
}

impl fmt::Debug for GeneratedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedCommand")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("hidden", &self.hidden)
            .field("subcommands_optional", &self.subcommands_optional)
            .finish_non_exhaustive()
    }
}

/// Arena of the commands generated for one context in one cycle.
#[derive(Debug)]
pub struct GeneratedTree {
    name: String,
    cycle: u64,
    options: ParserOptions,
    global_groups: Vec<String>,
    globals: Vec<Arg>,
    nodes: Vec<GeneratedCommand>,
    roots: Vec<usize>,
}

impl GeneratedTree {
    /// `name` is shown in usage lines.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cycle: 0,
            options: ParserOptions::default(),
            global_groups: Vec::new(),
            globals: Vec::new(),
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, handle: Handle) -> Option<&GeneratedCommand> {
        self.index(handle).ok().map(|i| &self.nodes[i])
    }

    /// Hidden flag of `handle`, `None` if it does not belong to this cycle.
    pub fn is_hidden(&self, handle: Handle) -> Option<bool> {
        self.get(handle).map(|c| c.hidden)
    }

    /// Top-level generated commands, in generation order.
    pub fn commands(&self) -> Vec<Handle> {
        self.roots.iter().map(|&i| self.handle_at(i)).collect()
    }

    pub fn children(&self, handle: Handle) -> Vec<Handle> {
        match self.index(handle) {
            Ok(i) => self.nodes[i]
                .children
                .iter()
                .map(|&c| self.handle_at(c))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Every handle generated this cycle.
    pub fn handles(&self) -> Vec<Handle> {
        (0..self.nodes.len()).map(|i| self.handle_at(i)).collect()
    }

    /// Labels of the option groups every command inherits.
    pub fn global_option_groups(&self) -> &[String] {
        &self.global_groups
    }

    /// Assembles the clap command tree for this cycle.
    pub fn command(&self) -> Command {
        let mut root = Command::new(self.name.clone())
            .no_binary_name(true)
            .subcommand_required(true)
            .color(self.options.color)
            .disable_help_subcommand(!self.options.help_subcommand)
            .disable_help_flag(!self.options.help_flag)
            .args(self.globals.iter().cloned());
        for &index in &self.roots {
            root = root.subcommand(self.build(index));
        }
        root
    }

    fn build(&self, index: usize) -> Command {
        let node = &self.nodes[index];
        let mut cmd = node
            .command
            .clone()
            .hide(node.hidden)
            .disable_help_flag(!self.options.help_flag);
        if !node.children.is_empty() {
            cmd = cmd
                .disable_help_subcommand(!self.options.help_subcommand)
                .subcommand_required(!node.subcommands_optional)
                .arg_required_else_help(!node.subcommands_optional);
            for &child in &node.children {
                cmd = cmd.subcommand(self.build(child));
            }
        }
        cmd
    }

    /// Parses `words` against this cycle's tree and executes the deepest
    /// command named, with the values parsed for it.
    ///
    /// Hidden commands are refused even though clap still recognizes them.
    pub fn dispatch(&mut self, words: &[String], console: &ConsoleHandle) -> Result<()> {
        let matches = self.command().try_get_matches_from(words)?;

        let mut level = &matches;
        let mut siblings: &[usize] = &self.roots;
        let mut target: Option<(usize, &ArgMatches)> = None;
        while let Some((name, sub_matches)) = level.subcommand() {
            let index = siblings
                .iter()
                .copied()
                .find(|&i| self.nodes[i].name == name)
                .ok_or_else(|| ConsoleError::CommandNotFound {
                    name: name.to_string(),
                })?;
            if self.nodes[index].hidden {
                return Err(ConsoleError::CommandUnavailable {
                    name: name.to_string(),
                }
                .into());
            }
            siblings = &self.nodes[index].children;
            target = Some((index, sub_matches));
            level = sub_matches;
        }

        let (index, sub_matches) = target.ok_or(ConsoleError::NoCommand)?;
        debug!(
            "Executing '{}' (cycle {})",
            self.nodes[index].name, self.cycle
        );
        self.nodes[index].payload.execute(sub_matches, console)
    }

    fn handle_at(&self, index: usize) -> Handle {
        Handle {
            cycle: self.cycle,
            index,
        }
    }

    fn index(&self, handle: Handle) -> SinkResult<usize> {
        if handle.cycle != self.cycle || handle.index >= self.nodes.len() {
            return Err(ConsoleError::StaleHandle {
                handle_cycle: handle.cycle,
                current_cycle: self.cycle,
            });
        }
        Ok(handle.index)
    }

    /// Flags visible to a new child of `parent`: globals plus the option
    /// groups of every ancestor.
    fn inherited_flags(&self, parent: Option<usize>) -> Vec<&Arg> {
        let mut flags: Vec<&Arg> = self.globals.iter().collect();
        let mut cursor = parent;
        while let Some(i) = cursor {
            let node = &self.nodes[i];
            flags.extend(
                node.command
                    .get_arguments()
                    .filter(|arg| arg.is_global_set()),
            );
            cursor = node.parent;
        }
        flags
    }

    fn check_flags(&self, command: &str, flags: &[&Arg]) -> SinkResult<()> {
        let mut ids = HashSet::new();
        let mut longs = HashSet::new();
        let mut shorts = HashSet::new();
        if self.options.help_flag {
            ids.insert("help".to_string());
            longs.insert("help".to_string());
            shorts.insert('h');
        }
        for arg in flags {
            let conflict = |flag: String| ConsoleError::ConflictingFlag {
                command: command.to_string(),
                flag,
            };
            if !ids.insert(arg.get_id().to_string()) {
                return Err(conflict(arg.get_id().to_string()));
            }
            if let Some(long) = arg.get_long() {
                if !longs.insert(long.to_string()) {
                    return Err(conflict(format!("--{}", long)));
                }
            }
            if let Some(short) = arg.get_short() {
                if !shorts.insert(short) {
                    return Err(conflict(format!("-{}", short)));
                }
            }
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> SinkResult<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.chars().any(char::is_whitespace) {
        "name contains whitespace"
    } else if name.starts_with('-') {
        "name starts with a dash"
    } else {
        return Ok(());
    };
    Err(ConsoleError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Option group flags become global flags of the command they are attached to.
fn prepare_flags(group: &str, long: &str, flags: Vec<Arg>) -> SinkResult<Vec<Arg>> {
    let heading = if long.is_empty() { group } else { long };
    flags
        .into_iter()
        .map(|arg| {
            if arg.is_positional() || arg.is_required_set() {
                return Err(ConsoleError::InvalidOption {
                    group: group.to_string(),
                    flag: arg.get_id().to_string(),
                    reason: "inherited options must be optional flags".to_string(),
                });
            }
            Ok(arg.global(true).help_heading(heading.to_string()))
        })
        .collect()
}

impl ParserSink for GeneratedTree {
    fn reset(&mut self, cycle: u64, options: &ParserOptions) {
        self.cycle = cycle;
        self.options = options.clone();
        self.global_groups.clear();
        self.globals.clear();
        self.nodes.clear();
        self.roots.clear();
    }

    fn add_command(
        &mut self,
        parent: Option<Handle>,
        name: &str,
        short: &str,
        long: &str,
        payload: Box<dyn CommandPayload>,
    ) -> SinkResult<Handle> {
        let parent = parent.map(|h| self.index(h)).transpose()?;
        validate_name(name)?;
        if self.options.help_subcommand && name == "help" {
            return Err(ConsoleError::InvalidName {
                name: name.to_string(),
                reason: "reserved by the help subcommand".to_string(),
            });
        }

        let siblings = match parent {
            Some(p) => &self.nodes[p].children,
            None => &self.roots,
        };
        if siblings.iter().any(|&i| self.nodes[i].name == name) {
            return Err(ConsoleError::DuplicateCommand {
                name: name.to_string(),
            });
        }

        let mut command = payload.augment(Command::new(name.to_string()));
        if !short.is_empty() {
            command = command.about(short.to_string());
        }
        if !long.is_empty() {
            command = command.long_about(long.to_string());
        }

        let mut flags = self.inherited_flags(parent);
        flags.extend(command.get_arguments());
        self.check_flags(name, &flags)?;

        let index = self.nodes.len();
        self.nodes.push(GeneratedCommand {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            hidden: false,
            subcommands_optional: false,
            option_groups: Vec::new(),
            command,
            payload,
        });
        match parent {
            Some(p) => self.nodes[p].children.push(index),
            None => self.roots.push(index),
        }
        Ok(self.handle_at(index))
    }

    fn add_option_group(
        &mut self,
        target: Option<Handle>,
        short: &str,
        long: &str,
        flags: Vec<Arg>,
    ) -> SinkResult<()> {
        let flags = prepare_flags(short, long, flags)?;
        match target {
            None => {
                let mut all: Vec<&Arg> = self.globals.iter().collect();
                all.extend(flags.iter());
                self.check_flags(&self.name, &all)?;
                self.globals.extend(flags);
                self.global_groups.push(long.to_string());
            }
            Some(handle) => {
                let index = self.index(handle)?;
                let node = &self.nodes[index];
                let mut all = self.inherited_flags(node.parent);
                all.extend(node.command.get_arguments());
                all.extend(flags.iter());
                self.check_flags(&node.name, &all)?;

                let node = &mut self.nodes[index];
                node.command = node.command.clone().args(flags);
                node.option_groups.push(long.to_string());
            }
        }
        Ok(())
    }

    fn mark_hidden(&mut self, handle: Handle) -> SinkResult<()> {
        let index = self.index(handle)?;
        self.nodes[index].hidden = true;
        Ok(())
    }

    fn set_subcommands_optional(&mut self, handle: Handle, optional: bool) -> SinkResult<()> {
        let index = self.index(handle)?;
        self.nodes[index].subcommands_optional = optional;
        Ok(())
    }
}
