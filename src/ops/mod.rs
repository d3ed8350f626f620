//! High-level operations.
//!
//! Package building used by the listener, plus the implementation of
//! the webpkg commands.

pub mod build_package;
pub mod check;
pub mod scan;

pub use build_package::{BuildOutcome, PackageBuilder};
pub use check::{check, check_module, format_check, CapabilityReport, CheckReport};
pub use scan::{format_report, scan, PublishedPackage, ScanOptions, ScanReport};
