//! High-level operations.
//!
//! This module contains the implementation of outpost commands.

pub mod detect;
pub mod package;
pub mod service;

pub use detect::{detect, format_report, DetectReport, FacilityReport, FacilityStatus};
pub use package::{run_package_action, PackageAction, PackageOutcome};
pub use service::{run_service_action, ServiceAction, ServiceOutcome};
