//! # Conch Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point of the `conch` demo console. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading the TOML configuration and registering the demo commands
//! - Running the read/rebuild/execute loop on stdin and stdout
//!
//! ## Examples
//!
//! ```bash
//! # Start in the default context
//! conch
//!
//! # Start in the `ops` context with dangerous commands hidden
//! conch --context ops --filter dangerous
//!
//! # Use another configuration file, with debug logs
//! conch -vv --config ~/conch.toml
//! ```
//!
use clap::Parser;
use conch::core::config::load_config;
use conch::{Console, ConsoleError, StdioShell};
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Demo commands registered on the console

/// Command-line arguments of the demo console.
#[derive(Parser, Debug)]
#[command(
    name = "conch",
    about = "Conch: a context-aware command console",
    long_about = "Interactive console with multiple command contexts, filter tags\n\
                  and a command parser regenerated before every prompt.",
    version
)]
struct Cli {
    /// Configuration file to load instead of the user config
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
    /// Context to start in
    #[arg(long, value_name = "NAME")]
    context: Option<String>,
    /// Filter tag active from the first prompt (repeatable)
    #[arg(long = "filter", value_name = "TAG")]
    filters: Vec<String>,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = run(cli) {
        tracing::error!("Console failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    let mut console = Console::new("conch");
    console.load_config(config);
    commands::register(&mut console);

    for tag in &cli.filters {
        console.filter(tag);
    }
    if let Some(name) = cli.context.as_deref() {
        if !console.switch_context(name) {
            return Err(ConsoleError::ContextNotFound {
                name: name.to_string(),
            }
            .into());
        }
    }

    console.run(&mut StdioShell::stdio())
}
