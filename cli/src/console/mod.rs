//! # Console Registry
//!
//! File: cli/src/console/mod.rs
//!
//! ## Overview
//!
//! `Console` owns every context, knows which one is current, holds the
//! active filter set and runs the interactive loop: each cycle rebuilds the
//! current context's parser from its persistent command tree, reads one
//! line and dispatches it.
//!
//! ## Architecture
//!
//! - The console is a plain value owned by the application's top-level
//!   loop. There is no process-wide instance.
//! - The current-context name, the filter set and the configuration live in
//!   a session behind a read/write lock, shared with `ConsoleHandle`. Handles
//!   are cheap to clone and may be used from other threads or from inside a
//!   running command. Each mutation holds the lock only for its own duration,
//!   and the rebuild engine works on a snapshot taken at the start of a
//!   cycle, so a filter added mid-cycle shows from the next cycle on.
//! - While a command executes, the console is flagged as executing and
//!   `log` appends directly to stdout instead of redrawing the prompt.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let mut console = Console::new("conch");
//! let ops = console.add_context("ops");
//! ops.add_command("status", "Show status", "", "", &[], Some(data_factory(Status::default)));
//! ops.add_command("drain", "Drain node", "", "admin", &["dangerous"], Some(data_factory(Drain::default)));
//!
//! console.switch_context("ops");
//! console.filter("dangerous");
//! console.run(&mut StdioShell::stdio())?;
//! ```
//!
pub mod command;
pub mod completion;
pub mod filter;
pub mod generated;
pub mod menu;
pub mod options;
pub mod prompt;
pub mod rebuild;
pub mod shell;

use crate::core::config::{Config, TokenClass};
use crate::core::error::{ConsoleError, Result};
use command::{CommandNode, CommandSpec, DataFactory};
use filter::FilterSet;
use generated::{GeneratedTree, ParserOptions};
use menu::{CycleState, Menu};
use options::OptionGroup;
use parking_lot::RwLock;
use rebuild::RebuildReport;
use shell::{Notifier, Shell};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// One display group of the current context, for completers and help.
#[derive(Debug)]
pub struct CommandListing<'a> {
    pub group: &'a str,
    pub commands: Vec<&'a CommandNode>,
}

struct Session {
    current: String,
    contexts: Vec<String>,
    filters: FilterSet,
    config: Config,
}

struct Shared {
    app: String,
    session: RwLock<Session>,
    executing: AtomicBool,
    exit: AtomicBool,
    config_reloaded: AtomicBool,
    notifier: RwLock<Option<Notifier>>,
}

/// Thread-safe access to the console's session state.
#[derive(Clone)]
pub struct ConsoleHandle {
    shared: Arc<Shared>,
}

impl ConsoleHandle {
    /// Hides commands tagged `tag` from the next cycle on.
    pub fn filter(&self, tag: &str) {
        if self.shared.session.write().filters.add(tag) {
            info!("Filter '{}' enabled", tag);
        }
    }

    /// Shows commands tagged `tag` again from the next cycle on.
    pub fn unfilter(&self, tag: &str) {
        if self.shared.session.write().filters.remove(tag) {
            info!("Filter '{}' disabled", tag);
        }
    }

    pub fn filters(&self) -> Vec<String> {
        self.shared.session.read().filters.tags().to_vec()
    }

    /// Makes `name` the current context. Unknown names are ignored and
    /// `false` is returned.
    pub fn switch_context(&self, name: &str) -> bool {
        let mut session = self.shared.session.write();
        if !session.contexts.iter().any(|c| c == name) {
            debug!("Ignoring switch to unknown context '{}'", name);
            return false;
        }
        if session.current != name {
            info!("Switching to context '{}'", name);
            session.current = name.to_string();
        }
        true
    }

    pub fn current_context(&self) -> String {
        self.shared.session.read().current.clone()
    }

    /// Context names in creation order.
    pub fn contexts(&self) -> Vec<String> {
        self.shared.session.read().contexts.clone()
    }

    /// Stores a new configuration. The loop applies it at its next cycle.
    pub fn load_config(&self, config: Config) {
        self.shared.session.write().config = config.normalized();
        self.shared.config_reloaded.store(true, Ordering::SeqCst);
        info!("Configuration reloaded");
    }

    pub fn config(&self) -> Config {
        self.shared.session.read().config.clone()
    }

    /// Prints `msg` without disturbing the prompt. While a command runs the
    /// message is simply appended to stdout.
    pub fn log(&self, msg: &str) {
        let notifier = if self.is_executing() {
            None
        } else {
            self.shared.notifier.read().clone()
        };
        match notifier {
            Some(notify) => notify(msg),
            None => {
                let mut out = std::io::stdout();
                if let Err(e) = write!(out, "{}", msg).and_then(|()| out.flush()) {
                    debug!("Failed to write console log to stdout: {}", e);
                }
            }
        }
    }

    pub fn is_executing(&self) -> bool {
        self.shared.executing.load(Ordering::SeqCst)
    }

    /// Ends the interactive loop before its next cycle.
    pub fn request_exit(&self) {
        self.shared.exit.store(true, Ordering::SeqCst);
    }

    pub fn exit_requested(&self) -> bool {
        self.shared.exit.load(Ordering::SeqCst)
    }
}

/// The registry of contexts and driver of the interactive loop.
pub struct Console {
    handle: ConsoleHandle,
    menus: Vec<Menu>,
    parser_options: ParserOptions,
    cycle: u64,
}

impl Console {
    /// A console with a single, current, default context named `""`.
    pub fn new(app: &str) -> Self {
        let config = Config::default();
        let default_menu = Menu::new(app, "", &config);
        let shared = Shared {
            app: app.to_string(),
            session: RwLock::new(Session {
                current: String::new(),
                contexts: vec![String::new()],
                filters: FilterSet::new(),
                config,
            }),
            executing: AtomicBool::new(false),
            exit: AtomicBool::new(false),
            config_reloaded: AtomicBool::new(false),
            notifier: RwLock::new(None),
        };
        Self {
            handle: ConsoleHandle {
                shared: Arc::new(shared),
            },
            menus: vec![default_menu],
            parser_options: ParserOptions::default(),
            cycle: 0,
        }
    }

    pub fn handle(&self) -> ConsoleHandle {
        self.handle.clone()
    }

    pub fn app_name(&self) -> &str {
        &self.handle.shared.app
    }

    /// Returns the context called `name`, creating it if needed.
    pub fn add_context(&mut self, name: &str) -> &mut Menu {
        if let Some(index) = self.menus.iter().position(|m| m.name() == name) {
            return &mut self.menus[index];
        }
        let menu = {
            let mut session = self.handle.shared.session.write();
            session.contexts.push(name.to_string());
            Menu::new(&self.handle.shared.app, name, &session.config)
        };
        info!("Created context '{}'", name);
        self.menus.push(menu);
        let last = self.menus.len() - 1;
        &mut self.menus[last]
    }

    pub fn context(&self, name: &str) -> Option<&Menu> {
        self.menus.iter().find(|m| m.name() == name)
    }

    pub fn context_mut(&mut self, name: &str) -> Option<&mut Menu> {
        self.menus.iter_mut().find(|m| m.name() == name)
    }

    pub fn current_context(&self) -> &Menu {
        &self.menus[self.current_index()]
    }

    pub fn current_context_mut(&mut self) -> &mut Menu {
        let index = self.current_index();
        &mut self.menus[index]
    }

    /// See `ConsoleHandle::switch_context`.
    pub fn switch_context(&mut self, name: &str) -> bool {
        self.handle.switch_context(name)
    }

    pub fn filter(&mut self, tag: &str) {
        self.handle.filter(tag);
    }

    pub fn unfilter(&mut self, tag: &str) {
        self.handle.unfilter(tag);
    }

    pub fn filters(&self) -> Vec<String> {
        self.handle.filters()
    }

    /// Adds a command to the current context.
    pub fn add_command(
        &mut self,
        name: &str,
        short: &str,
        long: &str,
        group: &str,
        filters: &[&str],
        data: Option<DataFactory>,
    ) -> Option<&mut CommandNode> {
        self.current_context_mut()
            .add_command(name, short, long, group, filters, data)
    }

    pub fn add(&mut self, spec: CommandSpec) -> Option<&mut CommandNode> {
        self.current_context_mut().add(spec)
    }

    /// Adds flags inherited by every command of the current context.
    pub fn add_option_group(&mut self, group: OptionGroup) {
        self.current_context_mut().add_option_group(group);
    }

    /// Root-level command of the current context, first match wins.
    pub fn find_command(&self, name: &str) -> Result<&CommandNode> {
        self.current_context().find_command(name).ok_or_else(|| {
            ConsoleError::CommandNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Root-level commands of the current context, grouped, in insertion order.
    pub fn list_commands(&self) -> Vec<CommandListing<'_>> {
        self.current_context()
            .command_groups()
            .iter()
            .map(|g| CommandListing {
                group: g.name(),
                commands: g.commands().iter().collect(),
            })
            .collect()
    }

    /// The current context's parser for this cycle, if it is `Ready`.
    pub fn generated(&self) -> Option<&GeneratedTree> {
        self.current_context().generated()
    }

    pub fn is_hidden(&self, node: &CommandNode) -> Option<bool> {
        self.current_context().is_hidden(node)
    }

    pub fn parser_options(&self) -> &ParserOptions {
        &self.parser_options
    }

    /// Takes effect at the next rebuild.
    pub fn set_parser_options(&mut self, options: ParserOptions) {
        self.parser_options = options;
    }

    /// Stores the configuration and re-derives every context's prompt and
    /// input mode from it.
    pub fn load_config(&mut self, config: Config) {
        self.handle.load_config(config);
        self.apply_config();
    }

    pub fn config(&self) -> Config {
        self.handle.config()
    }

    pub fn highlight(&self, class: TokenClass) -> String {
        self.handle.shared.session.read().config.highlight(class).to_string()
    }

    pub fn log(&self, msg: &str) {
        self.handle.log(msg);
    }

    pub fn is_executing(&self) -> bool {
        self.handle.is_executing()
    }

    /// Regenerates the current context's parser. Runs once per cycle.
    pub fn rebuild(&mut self) -> RebuildReport {
        self.cycle += 1;
        let filters = self.handle.shared.session.read().filters.clone();
        let cycle = self.cycle;
        let options = self.parser_options.clone();
        self.current_context_mut().rebuild(&filters, cycle, &options)
    }

    /// Splits `line` into words and executes it.
    pub fn execute_line(&mut self, line: &str) -> Result<()> {
        let words = shlex::split(line)
            .ok_or_else(|| ConsoleError::UnbalancedQuotes(line.to_string()))?;
        if words.is_empty() {
            return Ok(());
        }
        self.execute(&words)
    }

    /// Executes `words` against the current context, rebuilding first if
    /// this cycle's parser was already consumed.
    pub fn execute(&mut self, words: &[String]) -> Result<()> {
        if self.current_context().state() != CycleState::Ready {
            self.rebuild();
        }
        let index = self.current_index();
        if self.menus[index].prompt().config().newline {
            println!();
        }

        let handle = self.handle.clone();
        handle.shared.executing.store(true, Ordering::SeqCst);
        let result = self.menus[index].dispatch(words, &handle);
        handle.shared.executing.store(false, Ordering::SeqCst);
        result
    }

    /// Runs the interactive loop until end of input or an exit request.
    pub fn run<S: Shell>(&mut self, shell: &mut S) -> Result<()> {
        *self.handle.shared.notifier.write() = shell.notifier();
        info!("Starting console loop in context '{}'", self.handle.current_context());

        let outcome = self.run_cycles(shell);

        *self.handle.shared.notifier.write() = None;
        info!("Console loop finished after {} cycles", self.cycle);
        outcome
    }

    fn run_cycles<S: Shell>(&mut self, shell: &mut S) -> Result<()> {
        while !self.handle.exit_requested() {
            if self.handle.shared.config_reloaded.load(Ordering::SeqCst) {
                self.apply_config();
            }
            self.rebuild();

            let menu = self.current_context();
            shell.set_input_mode(menu.input_mode());
            shell.set_multiline(menu.prompt().config().multiline);
            shell.install_prompt(menu.prompt().renderers());
            shell.refresh_prompt()?;

            let Some(line) = shell.read_line()? else {
                break;
            };
            if let Err(e) = self.execute_line(&line) {
                report_error(e);
            }
        }
        Ok(())
    }

    fn apply_config(&mut self) {
        self.handle
            .shared
            .config_reloaded
            .store(false, Ordering::SeqCst);
        let config = self.handle.shared.session.read().config.clone();
        for menu in &mut self.menus {
            menu.apply_config(&self.handle.shared.app, &config);
        }
        debug!("Applied configuration to {} contexts", self.menus.len());
    }

    fn current_index(&self) -> usize {
        let session = self.handle.shared.session.read();
        self.menus
            .iter()
            .position(|m| m.name() == session.current)
            .unwrap_or(0)
    }
}

/// Parser output (help, usage, bad flags) is printed the way clap formats
/// it; anything else is an execution failure.
fn report_error(err: anyhow::Error) {
    match err.downcast_ref::<clap::Error>() {
        Some(clap_err) => {
            let _ = clap_err.print();
        }
        None => {
            error!("Command execution failed: {:?}", err);
            eprintln!("Error: {}", err);
        }
    }
}
