//! Boot CLI - encrypted container secrets kept in S3
//!
//! This is the main entry point for the boot command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            output::error(&format!("{:#}", err));
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = cli.sync.resolve_config()?;

    match cli.command {
        Commands::Push => commands::push::run(config).await.map(|_| 0),
        Commands::Pull => commands::pull::run(config).await.map(|_| 0),
        Commands::Container(args) => commands::container::run(args, config).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Default to info so every cp/save line is shown
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
