use clap::Args;
use conch::{ArgsCommand, ConsoleHandle, Result};

/// `exit`
#[derive(Args, Debug, Default)]
pub struct Exit {}

impl ArgsCommand for Exit {
    fn run(&mut self, console: &ConsoleHandle) -> Result<()> {
        console.request_exit();
        Ok(())
    }
}
