//! Filter toggling commands. Changes apply from the next prompt on.

use clap::Args;
use conch::{ArgsCommand, ConsoleHandle, Result};

/// `hide <tag>`
#[derive(Args, Debug, Default)]
pub struct Hide {
    /// Filter tag to enable
    pub tag: String,
}

impl ArgsCommand for Hide {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
        console.filter(&self.tag);
        console.log(&format!("Commands tagged '{}' are now hidden\n", self.tag));
        Ok(())
    }
}

/// `show <tag>`
#[derive(Args, Debug, Default)]
pub struct Show {
    /// Filter tag to disable
    pub tag: String,
}

impl ArgsCommand for Show {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
        console.unfilter(&self.tag);
        console.log(&format!("Commands tagged '{}' are visible again\n", self.tag));
        Ok(())
    }
}
