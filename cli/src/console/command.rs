//! # Persistent Command Tree
//!
//! File: cli/src/console/command.rs
//!
//! ## Overview
//!
//! `CommandNode` is the long-lived definition of a command: its names and
//! descriptions, display group, filter tags, child commands, option groups
//! and completion hooks. Application code builds this tree once (or grows it
//! at any time); it is never torn down by a rebuild cycle. The only per-cycle
//! state a node carries is the handle of the parser command generated for it
//! during the most recent cycle.
//!
//! ## Architecture
//!
//! - `CommandPayload`: what a data factory produces. It declares its flags on
//!   the generated parser command and executes once parsed.
//! - `ArgsCommand`: shortcut for payloads written as `#[derive(clap::Args)]`
//!   structs; every such type is a `CommandPayload`.
//! - `CommandGroup`: ordered bucket of sibling commands sharing a display
//!   group name. Groups are created the first time a name is seen under a
//!   parent, and keep append order.
//!
//! ## Examples
//!
//! ```rust,ignore
//! #[derive(clap::Args, Debug)]
//! struct Drain {
//!     #[arg(long)]
//!     force: bool,
//! }
//!
//! impl ArgsCommand for Drain {
//!     fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
//!         console.log(&format!("draining (force: {})\n", self.force));
//!         Ok(())
//!     }
//! }
//!
//! let ops = console.add_context("ops");
//! ops.add_command("drain", "Drain the node", "", "admin", &["dangerous"],
//!     Some(data_factory(|| Drain { force: false })));
//! ```
//!
use crate::console::completion::{CompletionHooks, CompletionKey, CompletionProvider};
use crate::console::generated::Handle;
use crate::console::options::OptionGroup;
use crate::console::ConsoleHandle;
use crate::core::error::{ConsoleError, Result};
use clap::{ArgMatches, Args, Command};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A command instance, produced fresh by a data factory on every rebuild.
pub trait CommandPayload: Send {
    /// Declares this command's flags and positionals on its parser command.
    fn augment(&self, cmd: Command) -> Command {
        cmd
    }

    /// Runs the command with the values parsed for it.
    fn execute(&mut self, matches: &ArgMatches, console: &ConsoleHandle) -> Result<()>;
}

/// A payload described by a `#[derive(clap::Args)]` struct.
pub trait ArgsCommand: Args + Send {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()>;
}

impl<T: ArgsCommand> CommandPayload for T {
    fn augment(&self, cmd: Command) -> Command {
        T::augment_args(cmd)
    }

    fn execute(&mut self, matches: &ArgMatches, console: &ConsoleHandle) -> Result<()> {
        *self = T::from_arg_matches(matches)?;
        self.run(console)
    }
}

/// Zero-argument constructor of fresh command instances.
pub type DataFactory = Arc<dyn Fn() -> Box<dyn CommandPayload> + Send + Sync>;

/// Wraps a constructor closure into a `DataFactory`.
pub fn data_factory<P, F>(f: F) -> DataFactory
where
    P: CommandPayload + 'static,
    F: Fn() -> P + Send + Sync + 'static,
{
    Arc::new(move || Box::new(f()) as Box<dyn CommandPayload>)
}

/// A populated command description, for `CommandNode::add`.
#[derive(Clone, Default)]
pub struct CommandSpec {
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    pub group: String,
    pub filters: Vec<String>,
    pub subcommands_optional: bool,
    pub data: Option<DataFactory>,
}

/// Named, ordered bucket of sibling commands.
#[derive(Debug)]
pub struct CommandGroup {
    name: String,
    commands: Vec<CommandNode>,
}

impl CommandGroup {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            commands: Vec::new(),
        }
    }

    /// Group name; `""` is the ungrouped bucket.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut [CommandNode] {
        &mut self.commands
    }
}

/// A persistent command definition and its subtree.
pub struct CommandNode {
    name: String,
    short_description: String,
    long_description: String,
    group: String,
    filters: Vec<String>,
    subcommands_optional: bool,
    data: Option<DataFactory>,
    groups: Vec<CommandGroup>,
    options: Vec<OptionGroup>,
    completions: CompletionHooks,
    pub(crate) handle: Option<Handle>,
}

impl CommandNode {
    /// The root of a context tree. It is never generated itself.
    pub(crate) fn root(name: &str) -> Self {
        Self::from_parts(CommandSpec {
            name: name.to_string(),
            ..Default::default()
        })
    }

    fn from_parts(spec: CommandSpec) -> Self {
        Self {
            name: spec.name,
            short_description: spec.short_description,
            long_description: spec.long_description,
            group: spec.group,
            filters: spec.filters,
            subcommands_optional: spec.subcommands_optional,
            data: spec.data,
            groups: Vec::new(),
            options: Vec::new(),
            completions: CompletionHooks::default(),
            handle: None,
        }
    }

    /// Adds a child command under `group`, creating the group if needed.
    ///
    /// Returns `None` and registers nothing when `data` is absent: a command
    /// without instantiable data is invalid.
    pub fn add_command(
        &mut self,
        name: &str,
        short: &str,
        long: &str,
        group: &str,
        filters: &[&str],
        data: Option<DataFactory>,
    ) -> Option<&mut CommandNode> {
        self.add(CommandSpec {
            name: name.to_string(),
            short_description: short.to_string(),
            long_description: long.to_string(),
            group: group.to_string(),
            filters: filters.iter().map(|f| f.to_string()).collect(),
            subcommands_optional: false,
            data,
        })
    }

    /// Same as `add_command`, from a populated `CommandSpec`.
    pub fn add(&mut self, spec: CommandSpec) -> Option<&mut CommandNode> {
        if spec.data.is_none() {
            let err = ConsoleError::MissingDataFactory { name: spec.name };
            warn!("{}", err);
            return None;
        }
        debug!(
            "Registering command '{}' in group '{}' under '{}'",
            spec.name, spec.group, self.name
        );
        let group = self.command_group_or_insert(&spec.group);
        group.commands.push(CommandNode::from_parts(spec));
        group.commands.last_mut()
    }

    /// Looks up the child group called `name`, appending an empty one if it
    /// has not been seen yet under this node.
    pub fn command_group_or_insert(&mut self, name: &str) -> &mut CommandGroup {
        match self.groups.iter().position(|g| g.name == name) {
            Some(index) => &mut self.groups[index],
            None => {
                self.groups.push(CommandGroup::new(name));
                let last = self.groups.len() - 1;
                &mut self.groups[last]
            }
        }
    }

    /// First direct child called `name`, in group then insertion order.
    pub fn find_command(&self, name: &str) -> Option<&CommandNode> {
        self.groups
            .iter()
            .flat_map(|g| g.commands.iter())
            .find(|c| c.name == name)
    }

    pub fn find_command_mut(&mut self, name: &str) -> Option<&mut CommandNode> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.commands.iter_mut())
            .find(|c| c.name == name)
    }

    /// Direct children, flattened across groups.
    pub fn commands(&self) -> Vec<&CommandNode> {
        self.groups.iter().flat_map(|g| g.commands.iter()).collect()
    }

    pub fn command_groups(&self) -> &[CommandGroup] {
        &self.groups
    }

    pub(crate) fn command_groups_mut(&mut self) -> &mut [CommandGroup] {
        &mut self.groups
    }

    /// Attaches an option group, available to this command and all of its
    /// descendants.
    pub fn add_option_group(&mut self, group: OptionGroup) -> &mut Self {
        self.options.push(group);
        self
    }

    pub fn option_groups(&self) -> &[OptionGroup] {
        &self.options
    }

    pub fn add_argument_completion(
        &mut self,
        position: usize,
        provider: CompletionProvider,
    ) -> &mut Self {
        self.completions
            .insert(CompletionKey::Argument(position), provider);
        self
    }

    pub fn add_option_completion(&mut self, flag: &str, provider: CompletionProvider) -> &mut Self {
        let flag = flag.trim_start_matches('-');
        self.completions
            .insert(CompletionKey::Option(flag.to_string()), provider);
        self
    }

    pub fn completions(&self) -> &CompletionHooks {
        &self.completions
    }

    pub fn set_subcommands_optional(&mut self, optional: bool) -> &mut Self {
        self.subcommands_optional = optional;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn subcommands_optional(&self) -> bool {
        self.subcommands_optional
    }

    /// Handle generated for this node in the most recent cycle, if any.
    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    /// Fresh payload instance, or `None` for a context root.
    pub(crate) fn instantiate(&self) -> Option<Box<dyn CommandPayload>> {
        self.data.as_ref().map(|factory| factory())
    }

    /// Invalidates the generated handles of this whole subtree.
    pub(crate) fn clear_handles(&mut self) {
        self.handle = None;
        for group in &mut self.groups {
            for cmd in &mut group.commands {
                cmd.clear_handles();
            }
        }
    }

    /// Number of commands below this node, at any depth.
    pub fn descendant_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.commands.iter())
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("filters", &self.filters)
            .field("subcommands_optional", &self.subcommands_optional)
            .field("groups", &self.groups)
            .field("options", &self.options)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl CommandPayload for Noop {
        fn execute(&mut self, _matches: &ArgMatches, _console: &ConsoleHandle) -> Result<()> {
            Ok(())
        }
    }

    fn noop() -> Option<DataFactory> {
        Some(data_factory(|| Noop))
    }

    fn names(nodes: &[&CommandNode]) -> Vec<String> {
        nodes.iter().map(|n| n.name().to_string()).collect()
    }

    #[test]
    fn test_commands_keep_call_order() {
        let mut root = CommandNode::root("");
        for name in ["zeta", "alpha", "mid", "beta"] {
            root.add_command(name, "", "", "", &[], noop());
        }
        assert_eq!(
            names(&root.commands()),
            vec!["zeta", "alpha", "mid", "beta"]
        );
    }

    #[test]
    fn test_missing_factory_is_rejected() {
        let mut root = CommandNode::root("");
        root.add_command("status", "", "", "", &[], noop());
        let before = root.descendant_count();

        let rejected = root.add_command("ghost", "", "", "extra", &[], None);
        assert!(rejected.is_none());
        assert_eq!(root.descendant_count(), before);
        assert!(root.find_command("ghost").is_none());
        // The group is not created either.
        assert_eq!(root.command_groups().len(), 1);
    }

    #[test]
    fn test_group_lookup_or_create() {
        let mut root = CommandNode::root("");
        root.command_group_or_insert("admin");
        root.command_group_or_insert("");
        root.command_group_or_insert("admin");

        let groups: Vec<&str> = root.command_groups().iter().map(|g| g.name()).collect();
        assert_eq!(groups, vec!["admin", ""]);
    }

    #[test]
    fn test_adding_to_existing_group_appends() {
        let mut root = CommandNode::root("");
        root.add_command("a", "", "", "g1", &[], noop());
        root.add_command("b", "", "", "g2", &[], noop());
        root.add_command("c", "", "", "g1", &[], noop());

        let groups = root.command_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name(), "g1");
        assert_eq!(
            names(&groups[0].commands().iter().collect::<Vec<_>>()),
            vec!["a", "c"]
        );
        // Flattened order is group order, then node order.
        assert_eq!(names(&root.commands()), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_find_command_direct_children_only() {
        let mut root = CommandNode::root("");
        let parent = root
            .add_command("sessions", "", "", "", &[], noop())
            .expect("command with data is registered");
        parent.add_command("kill", "", "", "", &[], noop());

        assert!(root.find_command("sessions").is_some());
        assert!(root.find_command("kill").is_none());
        assert_eq!(
            root.find_command("sessions")
                .and_then(|s| s.find_command("kill"))
                .map(|c| c.name()),
            Some("kill")
        );
    }

    #[test]
    fn test_find_command_first_match_wins() {
        let mut root = CommandNode::root("");
        root.add_command("dup", "first", "", "g1", &[], noop());
        root.add_command("dup", "second", "", "g2", &[], noop());
        assert_eq!(
            root.find_command("dup").map(|c| c.short_description()),
            Some("first")
        );
    }

    #[test]
    fn test_add_from_command_spec() {
        let mut root = CommandNode::root("");
        let added = root.add(CommandSpec {
            name: "tail".into(),
            short_description: "Follow logs".into(),
            group: "logs".into(),
            filters: vec!["remote".into()],
            subcommands_optional: true,
            data: noop(),
            ..Default::default()
        });
        let added = added.expect("command with data is registered");
        assert_eq!(added.group(), "logs");
        assert_eq!(added.filters(), ["remote"]);
        assert!(added.subcommands_optional());
    }

    #[test]
    fn test_completion_hooks_are_per_node() {
        let mut root = CommandNode::root("");
        let parent = root.add_command("connect", "", "", "", &[], noop()).unwrap();
        parent
            .add_argument_completion(0, CompletionProvider::fixed(["db1", "db2"]))
            .add_option_completion("--format", CompletionProvider::fixed(["json"]));
        let child = parent.add_command("ssh", "", "", "", &[], noop()).unwrap();
        assert!(child.completions().is_empty());

        let parent = root.find_command("connect").unwrap();
        assert_eq!(parent.completions().len(), 2);
        assert!(parent
            .completions()
            .get(&CompletionKey::Option("format".into()))
            .is_some());
    }

    #[test]
    fn test_instantiate_calls_factory_each_time() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut root = CommandNode::root("");
        root.add_command(
            "count",
            "",
            "",
            "",
            &[],
            Some(data_factory(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Noop
            })),
        );
        let node = root.find_command("count").unwrap();
        assert!(node.instantiate().is_some());
        assert!(node.instantiate().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(root.instantiate().is_none());
    }
}
