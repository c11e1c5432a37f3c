//! # Demo Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! Commands of the demo REPL. They exist to exercise the console runtime
//! end to end: contexts, grouping, filters, subcommands, inherited option
//! groups and completion hooks.
//!
//! ## Contexts
//!
//! - `""` (default): `status`, `contexts`, `use`, `hide`, `show`, `exit`
//! - `ops`: `status`, `nodes list|cordon`, `drain` (group `admin`, filter
//!   tag `dangerous`), `back`, `hide`, `show`, `exit`, plus the inherited
//!   `--dry-run` flag
//!
use conch::{data_factory, Console, Menu, OptionGroup};

/// `use`, `back` and `contexts`.
mod context;
/// `exit`.
mod exit;
/// `hide` and `show`.
mod filter;
/// `nodes` and `drain`, registered in the `ops` context.
mod ops;
/// `status`.
mod status;

/// Registers every demo command on `console`.
pub fn register(console: &mut Console) {
    let handle = console.handle();
    let root = console.add_context("");
    add_status(root);
    root.add_command(
        "contexts",
        "List contexts",
        "",
        "context",
        &[],
        Some(data_factory(context::Contexts::default)),
    );
    if let Some(cmd) = root.add_command(
        "use",
        "Switch to another context",
        "",
        "context",
        &[],
        Some(data_factory(context::Use::default)),
    ) {
        cmd.add_argument_completion(0, context::context_names(handle));
    }
    register_common(root);

    let ops = console.add_context("ops");
    ops.add_option_group(OptionGroup::from_args::<ops::DryRun>("ops", "Operations"));
    add_status(ops);
    ops::register(ops);
    ops.add_command(
        "back",
        "Return to the default context",
        "",
        "context",
        &[],
        Some(data_factory(context::Back::default)),
    );
    register_common(ops);
}

fn add_status(menu: &mut Menu) {
    menu.add_command(
        "status",
        "Show the console state",
        "",
        "",
        &[],
        Some(data_factory(status::Status::default)),
    );
}

/// Commands available in every context.
fn register_common(menu: &mut Menu) {
    menu.add_command(
        "hide",
        "Hide commands carrying a filter tag",
        "",
        "filters",
        &[],
        Some(data_factory(filter::Hide::default)),
    );
    menu.add_command(
        "show",
        "Show commands carrying a filter tag again",
        "",
        "filters",
        &[],
        Some(data_factory(filter::Show::default)),
    );
    menu.add_command(
        "exit",
        "Leave the console",
        "",
        "",
        &[],
        Some(data_factory(exit::Exit::default)),
    );
}
