//! `webpkg check` command
//!
//! Reports what each web package capability of one module resolves to.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::CheckArgs;
use crate::commands::extender_config;
use webpkg::ops::{check, format_check};

pub fn execute(args: CheckArgs, config: Option<&Path>) -> Result<()> {
    let dir = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    let report = check(&dir, &extender_config(config)?)?;
    print!("{}", format_check(&report));

    if report.has_malformed() {
        bail!(
            "{} [{}] declares malformed web package capabilities",
            report.module,
            report.module_id
        );
    }

    Ok(())
}
