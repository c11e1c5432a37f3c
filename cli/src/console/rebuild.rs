//! # Rebuild Engine
//!
//! File: cli/src/console/rebuild.rs
//!
//! ## Overview
//!
//! Once per interactive cycle, the current context's parser is thrown away
//! and regenerated from the persistent command tree. Each step below runs to
//! completion before the next one starts:
//!
//! 1. Invalidate every node's handle and reset the sink for the new cycle.
//! 2. Generate the context root's option groups; every command inherits them.
//! 3. Walk the root groups depth-first (group order, then node order). For
//!    each node: instantiate its payload, register it, propagate
//!    `subcommands_optional`, attach its own option groups, store the handle
//!    and recurse with that handle as parent. A node the sink rejects is
//!    reported and skipped with its whole subtree; siblings carry on.
//! 4. Visibility pass over every generated node: those whose filter tags
//!    intersect the active filter set are marked hidden.
//!
//! Nothing here aborts a cycle. The report lists what was left out.
//!
use crate::console::command::{CommandGroup, CommandNode};
use crate::console::filter::FilterSet;
use crate::console::generated::{Handle, ParserOptions, ParserSink};
use crate::core::error::ConsoleError;
use tracing::{debug, error};

/// A node (or option group) left out of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    /// Space separated command path, e.g. `sessions kill`.
    pub path: String,
    pub error: ConsoleError,
}

/// Outcome of one rebuild cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub cycle: u64,
    pub generated: usize,
    pub hidden: usize,
    pub failures: Vec<GenerationFailure>,
}

impl RebuildReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, path: String, error: ConsoleError) {
        error!("Command bind error for '{}': {}", path, error);
        self.failures.push(GenerationFailure { path, error });
    }
}

/// Regenerates `sink` from the tree under `root` for cycle `cycle`.
pub fn rebuild<S: ParserSink>(
    root: &mut CommandNode,
    filters: &FilterSet,
    sink: &mut S,
    cycle: u64,
    options: &ParserOptions,
) -> RebuildReport {
    let mut report = RebuildReport {
        cycle,
        ..Default::default()
    };

    root.clear_handles();
    sink.reset(cycle, options);

    for group in root.option_groups() {
        if let Err(e) = sink.add_option_group(None, group.short(), group.long(), group.generate()) {
            report.fail(format!("[{}]", group.long()), e);
        }
    }

    generate_groups(root.command_groups_mut(), None, "", sink, &mut report);

    hide_filtered(root, filters, sink, &mut report);

    debug!(
        "Rebuild cycle {} for '{}': {} generated, {} hidden, {} failed",
        cycle,
        root.name(),
        report.generated,
        report.hidden,
        report.failures.len()
    );
    report
}

fn generate_groups<S: ParserSink>(
    groups: &mut [CommandGroup],
    parent: Option<Handle>,
    path: &str,
    sink: &mut S,
    report: &mut RebuildReport,
) {
    for group in groups {
        for node in group.commands_mut() {
            generate_node(node, parent, path, sink, report);
        }
    }
}

fn generate_node<S: ParserSink>(
    node: &mut CommandNode,
    parent: Option<Handle>,
    path: &str,
    sink: &mut S,
    report: &mut RebuildReport,
) {
    let path = if path.is_empty() {
        node.name().to_string()
    } else {
        format!("{} {}", path, node.name())
    };
    let Some(payload) = node.instantiate() else {
        return;
    };

    let handle = match sink.add_command(
        parent,
        node.name(),
        node.short_description(),
        node.long_description(),
        payload,
    ) {
        Ok(handle) => handle,
        Err(e) => {
            report.fail(path, e);
            return;
        }
    };

    if let Err(e) = sink.set_subcommands_optional(handle, node.subcommands_optional()) {
        report.fail(path.clone(), e);
    }
    for group in node.option_groups() {
        if let Err(e) =
            sink.add_option_group(Some(handle), group.short(), group.long(), group.generate())
        {
            report.fail(format!("{} [{}]", path, group.long()), e);
        }
    }

    node.handle = Some(handle);
    report.generated += 1;

    generate_groups(node.command_groups_mut(), Some(handle), &path, sink, report);
}

fn hide_filtered<S: ParserSink>(
    node: &CommandNode,
    filters: &FilterSet,
    sink: &mut S,
    report: &mut RebuildReport,
) {
    for child in node.commands() {
        if let Some(handle) = child.handle() {
            if filters.intersects(child.filters()) {
                match sink.mark_hidden(handle) {
                    Ok(()) => report.hidden += 1,
                    Err(e) => report.fail(child.name().to_string(), e),
                }
            }
        }
        hide_filtered(child, filters, sink, report);
    }
}
