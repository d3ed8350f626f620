//! `webpkg scan` command
//!
//! Publishes every module found under a directory into a scratch service
//! directory and prints the resource mappings that result.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::{OutputFormat, ScanArgs};
use crate::commands::extender_config;
use webpkg::ops::{format_report, scan, ScanOptions};

pub fn execute(args: ScanArgs, config: Option<&Path>) -> Result<()> {
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    let opts = ScanOptions {
        root: root.clone(),
        config: extender_config(config)?,
    };

    let report = scan(&opts).with_context(|| format!("failed to scan {}", root.display()))?;

    match args.format {
        OutputFormat::Human => print!("{}", format_report(&report)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("failed to serialize scan report")?;
            println!("{}", json);
        }
    }

    Ok(())
}
