//! webpkg CLI - preview and check module web packages

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("webpkg=debug")
    } else {
        EnvFilter::new("webpkg=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, cli.config.as_deref()),
        Commands::Check(args) => commands::check::execute(args, cli.config.as_deref()),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
