//! Option groups: named sets of flags attached to a command and inherited by
//! everything below it.
//!
//! Like command payloads, the flag definitions are produced by a factory on
//! every rebuild cycle and never reused between cycles.

use clap::{Arg, Args, Command};
use std::fmt;
use std::sync::Arc;

/// Produces a fresh set of flag definitions.
pub type OptionFactory = Arc<dyn Fn() -> Vec<Arg> + Send + Sync>;

/// A named set of inheritable flag definitions.
#[derive(Clone)]
pub struct OptionGroup {
    short: String,
    long: String,
    generator: OptionFactory,
}

impl OptionGroup {
    /// `short` labels the group in compact listings, `long` is used as the
    /// help heading of its flags.
    pub fn new<F>(short: &str, long: &str, generator: F) -> Self
    where
        F: Fn() -> Vec<Arg> + Send + Sync + 'static,
    {
        Self {
            short: short.to_string(),
            long: long.to_string(),
            generator: Arc::new(generator),
        }
    }

    /// Builds the group from a `#[derive(clap::Args)]` struct.
    pub fn from_args<T: Args>(short: &str, long: &str) -> Self {
        Self::new(short, long, || {
            T::augment_args(Command::new("options"))
                .get_arguments()
                .cloned()
                .collect()
        })
    }

    pub fn short(&self) -> &str {
        &self.short
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    /// Invokes the factory. Called once per rebuild cycle.
    pub fn generate(&self) -> Vec<Arg> {
        (self.generator)()
    }
}

impl fmt::Debug for OptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionGroup")
            .field("short", &self.short)
            .field("long", &self.long)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(clap::Args, Debug)]
    struct Verbosity {
        /// Print more
        #[arg(long)]
        loud: bool,
        #[arg(long, default_value = "text")]
        format: String,
    }

    #[test]
    fn test_from_args_collects_flags() {
        let group = OptionGroup::from_args::<Verbosity>("out", "Output options");
        let ids: Vec<String> = group
            .generate()
            .iter()
            .map(|arg| arg.get_id().to_string())
            .collect();
        assert_eq!(ids, vec!["loud", "format"]);
        assert_eq!(group.short(), "out");
        assert_eq!(group.long(), "Output options");
    }

    #[test]
    fn test_generate_calls_factory_each_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let group = OptionGroup::new("g", "Global", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            vec![Arg::new("debug").long("debug")]
        });
        group.generate();
        group.generate();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
