//! Command implementations

pub mod check;
pub mod completions;
pub mod scan;

use std::path::Path;

use anyhow::{Context, Result};

use webpkg::util::config::{global_config_path, load_config, project_config_path, Config};
use webpkg::ExtenderConfig;

/// Resolve the extender settings for a command.
///
/// An explicit config file must load; otherwise the global and project
/// files are merged, falling back to defaults.
pub fn extender_config(explicit: Option<&Path>) -> Result<ExtenderConfig> {
    let config = match explicit {
        Some(path) => Config::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to determine current directory")?;
            load_config(global_config_path().as_deref(), &project_config_path(&cwd))
        }
    };
    Ok(config.extender())
}
