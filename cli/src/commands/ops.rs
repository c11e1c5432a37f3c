//! Commands of the `ops` context.
//!
//! `drain` is written against `CommandPayload` directly so it can read the
//! inherited `--dry-run` flag next to its own arguments.

use clap::{Arg, ArgAction, ArgMatches, Args, Command};
use conch::{
    data_factory, ArgsCommand, CommandPayload, CompletionProvider, ConsoleHandle, Menu, Result,
};

/// Flags inherited by every command of the `ops` context.
#[derive(Args, Debug, Default)]
pub struct DryRun {
    /// Print what would happen without doing it
    #[arg(long)]
    pub dry_run: bool,
}

const NODES: [&str; 3] = ["node-a", "node-b", "node-c"];

pub fn register(ops: &mut Menu) {
    if let Some(nodes) = ops.add_command(
        "nodes",
        "Inspect cluster nodes",
        "Inspect cluster nodes. A subcommand is required.",
        "",
        &[],
        Some(data_factory(Nodes::default)),
    ) {
        nodes.add_command("list", "List nodes", "", "", &[], Some(data_factory(List::default)));
        if let Some(cordon) = nodes.add_command(
            "cordon",
            "Stop scheduling on a node",
            "",
            "",
            &["dangerous"],
            Some(data_factory(Cordon::default)),
        ) {
            cordon.add_argument_completion(0, CompletionProvider::fixed(NODES));
        }
    }

    if let Some(drain) = ops.add_command(
        "drain",
        "Drain a node",
        "Evict every workload from a node before maintenance.",
        "admin",
        &["dangerous"],
        Some(data_factory(Drain::default)),
    ) {
        drain
            .add_argument_completion(0, CompletionProvider::fixed(NODES))
            .add_option_completion("grace", CompletionProvider::fixed(["0", "30", "300"]));
    }
}

/// `nodes`: only a parent for its subcommands.
#[derive(Args, Debug, Default)]
pub struct Nodes {}

impl ArgsCommand for Nodes {
    fn run(&mut self, _console: &ConsoleHandle) -> Result<()> {
        Ok(())
    }
}

/// `nodes list`
#[derive(Args, Debug, Default)]
pub struct List {}

impl ArgsCommand for List {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
        for node in NODES {
            console.log(&format!("{}\n", node));
        }
        Ok(())
    }
}

/// `nodes cordon <node>`
#[derive(Args, Debug, Default)]
pub struct Cordon {
    pub node: String,
}

impl ArgsCommand for Cordon {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
        console.log(&format!("Cordoned {}\n", self.node));
        Ok(())
    }
}

/// `drain <node> [--grace <secs>]`
#[derive(Debug, Default)]
pub struct Drain {
    node: String,
    grace: u64,
}

impl CommandPayload for Drain {
    fn augment(&self, cmd: Command) -> Command {
        cmd.arg(Arg::new("node").required(true).help("Node to drain"))
            .arg(
                Arg::new("grace")
                    .long("grace")
                    .value_parser(clap::value_parser!(u64))
                    .default_value("30")
                    .action(ArgAction::Set)
                    .help("Seconds to wait for workloads to stop"),
            )
    }

    fn execute(&mut self, matches: &ArgMatches, console: &ConsoleHandle) -> Result<()> {
        self.node = matches.get_one::<String>("node").cloned().unwrap_or_default();
        self.grace = matches.get_one::<u64>("grace").copied().unwrap_or(30);
        let dry_run = matches.get_flag("dry_run");

        let prefix = if dry_run { "[dry-run] " } else { "" };
        console.log(&format!(
            "{}Draining {} (grace {}s)\n",
            prefix, self.node, self.grace
        ));
        Ok(())
    }
}
