//! # Console Contexts
//!
//! File: cli/src/console/menu.rs
//!
//! ## Overview
//!
//! A `Menu` is one isolated context: a command tree rooted at an unnamed
//! root node, the option groups every command of the context inherits, a
//! prompt, an input mode and the parser generated for it in the current
//! cycle. Only one context is current at a time; the others keep their tree
//! untouched until they are switched to.
//!
//! ## Cycle State
//!
//! `Idle -> Rebuilding -> Ready -> Idle`. The generated parser and every
//! handle stored on the tree are only meaningful while the context is
//! `Ready`; dispatching a line consumes that state.
//!
use crate::console::command::{CommandGroup, CommandNode, CommandSpec, DataFactory};
use crate::console::filter::FilterSet;
use crate::console::generated::{GeneratedTree, ParserOptions};
use crate::console::options::OptionGroup;
use crate::console::prompt::Prompt;
use crate::console::rebuild::{rebuild, RebuildReport};
use crate::console::ConsoleHandle;
use crate::core::config::{Config, InputMode};
use crate::core::error::Result;
use tracing::debug;

/// Where a context is in its per-cycle lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Rebuilding,
    Ready,
}

#[derive(Debug)]
pub struct Menu {
    name: String,
    root: CommandNode,
    prompt: Prompt,
    input_mode: InputMode,
    parser: GeneratedTree,
    state: CycleState,
}

impl Menu {
    pub(crate) fn new(app: &str, name: &str, config: &Config) -> Self {
        let display = if name.is_empty() { app } else { name };
        Self {
            name: name.to_string(),
            root: CommandNode::root(name),
            prompt: Prompt::new(config.prompt_for(app, name)),
            input_mode: config.input_mode,
            parser: GeneratedTree::new(display),
            state: CycleState::Idle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// See `CommandNode::add_command`.
    pub fn add_command(
        &mut self,
        name: &str,
        short: &str,
        long: &str,
        group: &str,
        filters: &[&str],
        data: Option<DataFactory>,
    ) -> Option<&mut CommandNode> {
        self.root
            .add_command(name, short, long, group, filters, data)
    }

    pub fn add(&mut self, spec: CommandSpec) -> Option<&mut CommandNode> {
        self.root.add(spec)
    }

    /// Adds flags inherited by every command of this context.
    pub fn add_option_group(&mut self, group: OptionGroup) -> &mut Self {
        self.root.add_option_group(group);
        self
    }

    pub fn option_groups(&self) -> &[OptionGroup] {
        self.root.option_groups()
    }

    pub fn find_command(&self, name: &str) -> Option<&CommandNode> {
        self.root.find_command(name)
    }

    pub fn find_command_mut(&mut self, name: &str) -> Option<&mut CommandNode> {
        self.root.find_command_mut(name)
    }

    pub fn commands(&self) -> Vec<&CommandNode> {
        self.root.commands()
    }

    pub fn command_groups(&self) -> &[CommandGroup] {
        self.root.command_groups()
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut Prompt {
        &mut self.prompt
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// This cycle's generated parser, while the context is `Ready`.
    pub fn generated(&self) -> Option<&GeneratedTree> {
        match self.state {
            CycleState::Ready => Some(&self.parser),
            _ => None,
        }
    }

    /// Whether `node` is hidden in this cycle. `None` if the context is not
    /// `Ready` or the node was not generated this cycle.
    pub fn is_hidden(&self, node: &CommandNode) -> Option<bool> {
        let tree = self.generated()?;
        tree.is_hidden(node.handle()?)
    }

    pub(crate) fn apply_config(&mut self, app: &str, config: &Config) {
        self.prompt.load_from_config(config.prompt_for(app, &self.name));
        self.input_mode = config.input_mode;
    }

    pub(crate) fn rebuild(
        &mut self,
        filters: &FilterSet,
        cycle: u64,
        options: &ParserOptions,
    ) -> RebuildReport {
        self.state = CycleState::Rebuilding;
        let report = rebuild(&mut self.root, filters, &mut self.parser, cycle, options);
        self.state = CycleState::Ready;
        report
    }

    pub(crate) fn dispatch(&mut self, words: &[String], console: &ConsoleHandle) -> Result<()> {
        debug!("Dispatching {:?} in context '{}'", words, self.name);
        let result = self.parser.dispatch(words, console);
        self.state = CycleState::Idle;
        result
    }
}
