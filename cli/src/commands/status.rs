use clap::Args;
use conch::{ArgsCommand, ConsoleHandle, Result};

/// `status`: prints the current context and active filters.
#[derive(Args, Debug, Default)]
pub struct Status {}

impl ArgsCommand for Status {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
        let context = console.current_context();
        let context = if context.is_empty() { "(default)".to_string() } else { context };
        let filters = console.filters();
        let filters = if filters.is_empty() {
            "none".to_string()
        } else {
            filters.join(", ")
        };
        console.log(&format!("context: {}\nfilters: {}\n", context, filters));
        Ok(())
    }
}
