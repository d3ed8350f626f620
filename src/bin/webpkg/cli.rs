//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// webpkg - Publish the web packages declared by modules
#[derive(Parser)]
#[command(name = "webpkg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the global and project ones
    #[arg(long, global = true, env = "WEBPKG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish every module under a directory and list the resulting mappings
    Scan(ScanArgs),

    /// Report how each web package capability of one module resolves
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Human,
    /// JSON
    Json,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Directory containing module directories (defaults to current directory)
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Module directory holding a Module.toml (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
