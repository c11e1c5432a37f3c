//! Context navigation commands.

use clap::Args;
use conch::{ArgsCommand, CompletionProvider, ConsoleError, ConsoleHandle, Result};

/// `use <context>`
#[derive(Args, Debug, Default)]
pub struct Use {
    /// Context to switch to
    pub name: String,
}

impl ArgsCommand for Use {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
        if !console.switch_context(&self.name) {
            return Err(ConsoleError::ContextNotFound {
                name: self.name.clone(),
            }
            .into());
        }
        console.log(&format!("Switched to context '{}'\n", self.name));
        Ok(())
    }
}

/// `back`
#[derive(Args, Debug, Default)]
pub struct Back {}

impl ArgsCommand for Back {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
        console.switch_context("");
        Ok(())
    }
}

/// `contexts`
#[derive(Args, Debug, Default)]
pub struct Contexts {}

impl ArgsCommand for Contexts {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
        let current = console.current_context();
        for name in console.contexts() {
            let marker = if name == current { "*" } else { " " };
            let label = if name.is_empty() { "(default)" } else { name.as_str() };
            console.log(&format!("{} {}\n", marker, label));
        }
        Ok(())
    }
}

/// Completes `use` with the contexts known when completion runs.
pub fn context_names(console: ConsoleHandle) -> CompletionProvider {
    CompletionProvider::dynamic(move |_| {
        console
            .contexts()
            .into_iter()
            .filter(|name| !name.is_empty())
            .collect()
    })
}
