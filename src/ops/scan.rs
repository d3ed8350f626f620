//! Preview what a set of modules would publish.
//!
//! `scan` discovers every module under a directory, opens a listener over
//! an in-memory service directory and reports the resulting publications.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::core::{Module, ModuleId, ResourceMapping};
use crate::registry::{InMemoryServiceDirectory, WebPackageListener, PROP_MODULE_NAME};
use crate::sources::discover_modules;
use crate::util::config::ExtenderConfig;

/// Options for a scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory to search for modules
    pub root: PathBuf,

    /// Listener settings
    pub config: ExtenderConfig,
}

/// One published web package.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedPackage {
    /// Owning module id
    pub module_id: Option<ModuleId>,

    /// Owning module symbolic name
    pub module: String,

    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Public alias
    pub alias: String,

    /// Resource root inside the module
    pub path: String,
}

impl PublishedPackage {
    /// The alias-to-root mapping an HTTP publisher would serve.
    pub fn mapping(&self) -> ResourceMapping {
        ResourceMapping::new(&self.alias, &self.path)
    }
}

/// Outcome of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Number of modules discovered
    pub modules: usize,

    /// Number of modules that published at least one package
    pub tracked: usize,

    /// Every publication, ordered by module id then alias
    pub packages: Vec<PublishedPackage>,
}

/// Discover modules and publish their web packages into a scratch directory.
pub fn scan(opts: &ScanOptions) -> Result<ScanReport> {
    let modules = discover_modules(&opts.root)?;
    tracing::debug!(root = %opts.root.display(), modules = modules.len(), "discovered modules");

    let directory = Arc::new(InMemoryServiceDirectory::new());
    let listener = WebPackageListener::new(directory.clone(), opts.config.clone());
    listener.open(modules.iter().map(|m| m as &dyn Module));

    let tracked = listener.tracked_modules().len();

    let mut packages: Vec<PublishedPackage> = directory
        .services()
        .into_iter()
        .map(|svc| {
            let mapping = ResourceMapping::from(svc.package.as_ref());
            PublishedPackage {
                module_id: svc.owner(),
                module: svc
                    .properties
                    .get(PROP_MODULE_NAME)
                    .cloned()
                    .unwrap_or_default(),
                name: svc.package.name().to_string(),
                version: svc.package.version().to_string(),
                alias: mapping.alias().to_string(),
                path: mapping.path().to_string(),
            }
        })
        .collect();
    packages.sort_by(|a, b| (a.module_id, &a.alias).cmp(&(b.module_id, &b.alias)));

    listener.close();

    Ok(ScanReport {
        modules: modules.len(),
        tracked,
        packages,
    })
}

/// Format a scan report for terminal output.
pub fn format_report(report: &ScanReport) -> String {
    let mut output = String::new();

    for pkg in &report.packages {
        let owner = match pkg.module_id {
            Some(id) => format!("{} [{}]", pkg.module, id),
            None => pkg.module.clone(),
        };
        output.push_str(&format!("{}  ({})\n", pkg.mapping(), owner));
    }

    output.push_str(&format!(
        "{} package(s) published by {} of {} module(s)\n",
        report.packages.len(),
        report.tracked,
        report.modules
    ));
    output
}
