//! Per-capability diagnosis of a single module.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::{Module, ModuleId};
use crate::ops::build_package::{BuildOutcome, PackageBuilder};
use crate::sources::DirModule;
use crate::util::config::ExtenderConfig;

/// Outcome for one declared capability.
#[derive(Debug, Clone)]
pub struct CapabilityReport {
    /// Normalized root, if the `root` attribute was readable
    pub root: Option<String>,

    /// What building the capability produced
    pub outcome: BuildOutcome,
}

/// Diagnosis of a module's web package capabilities.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Module id
    pub module_id: ModuleId,

    /// Module symbolic name
    pub module: String,

    /// Whether the module's wiring was available
    pub wired: bool,

    /// One entry per declared capability
    pub capabilities: Vec<CapabilityReport>,
}

impl CheckReport {
    /// Check if any capability is malformed.
    pub fn has_malformed(&self) -> bool {
        self.capabilities.iter().any(|c| c.outcome.is_malformed())
    }

    /// Number of capabilities that would be published.
    pub fn built(&self) -> usize {
        self.capabilities
            .iter()
            .filter(|c| c.outcome.package().is_some())
            .count()
    }
}

/// Inspect every web package capability of the module in `dir`.
pub fn check(dir: &Path, config: &ExtenderConfig) -> Result<CheckReport> {
    let module = DirModule::load(dir)
        .with_context(|| format!("failed to load module from {}", dir.display()))?;
    Ok(check_module(&module, config))
}

/// Inspect every web package capability of a loaded module.
pub fn check_module(module: &dyn Module, config: &ExtenderConfig) -> CheckReport {
    let builder = PackageBuilder::new(config.descriptor.clone());
    let capabilities = builder
        .inspect_all(module, &config.namespace)
        .into_iter()
        .map(|(root, outcome)| CapabilityReport {
            root: root.map(|r| r.as_str().to_string()),
            outcome,
        })
        .collect();

    CheckReport {
        module_id: module.id(),
        module: module.symbolic_name().to_string(),
        wired: module.capabilities(&config.namespace).is_some(),
        capabilities,
    }
}

/// Format a check report for terminal output.
pub fn format_check(report: &CheckReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} [{}]\n", report.module, report.module_id));

    if !report.wired {
        output.push_str("  wiring unavailable, no capabilities\n");
        return output;
    }
    if report.capabilities.is_empty() {
        output.push_str("  no web package capabilities\n");
        return output;
    }

    for cap in &report.capabilities {
        let root = cap.root.as_deref().unwrap_or("?");
        let line = match &cap.outcome {
            BuildOutcome::Built(pkg) => {
                format!("  [OK] {} -> {} ({})", root, pkg.web_root_path(), pkg)
            }
            BuildOutcome::MissingDescriptor { path } => {
                format!("  [--] {}: {} not found", root, path)
            }
            BuildOutcome::Malformed { path, reason } => {
                format!("  [!!] {}: {}: {}", root, path, reason)
            }
        };
        output.push_str(&line);
        output.push('\n');
    }

    output.push_str(&format!(
        "{} of {} capabilities publishable\n",
        report.built(),
        report.capabilities.len()
    ));
    output
}
