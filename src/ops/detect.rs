//! Capability detection report.
//!
//! `outpost detect` resolves every capability kind against a connection
//! and reports what it found, including kinds with no match. A missing
//! facility is an answer, not a failure, so detection itself only errors
//! when it cannot run at all.
//!
//! ```bash
//! outpost detect          # Human-readable report
//! outpost detect --json   # Machine-readable report
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::core::cancel::CancelToken;
use crate::core::connection::Connection;
use crate::initsystem;
use crate::packagemanager;
use crate::resolver::ResolveError;
use crate::util::GlobalContext;

/// Resolution state of one capability kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityStatus {
    Found,
    NotFound,
    Error,
}

/// What was resolved for one capability kind.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityReport {
    /// Capability kind, e.g. "init system"
    pub kind: &'static str,

    pub status: FacilityStatus,

    /// Facility name when found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,

    /// Extensions the facility supports
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<&'static str>,

    /// Not-found or probe error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FacilityReport {
    fn from_resolution<T: ?Sized>(
        kind: &'static str,
        resolved: Result<Arc<T>, ResolveError>,
        describe: impl Fn(&T) -> (&'static str, Vec<&'static str>),
    ) -> Self {
        match resolved {
            Ok(facility) => {
                let (name, extensions) = describe(facility.as_ref());
                FacilityReport {
                    kind,
                    status: FacilityStatus::Found,
                    name: Some(name),
                    extensions,
                    message: None,
                }
            }
            Err(err) => FacilityReport {
                kind,
                status: if err.is_not_found() {
                    FacilityStatus::NotFound
                } else {
                    FacilityStatus::Error
                },
                name: None,
                extensions: Vec::new(),
                message: Some(err.to_string()),
            },
        }
    }
}

/// Detection results for one target.
#[derive(Debug, Clone, Serialize)]
pub struct DetectReport {
    /// Identity of the target
    pub target: String,

    pub windows: bool,

    pub facilities: Vec<FacilityReport>,

    /// Total time taken
    #[serde(skip)]
    pub duration: Duration,
}

impl DetectReport {
    pub fn found_count(&self) -> usize {
        self.facilities
            .iter()
            .filter(|f| f.status == FacilityStatus::Found)
            .count()
    }
}

/// Resolve every capability kind against `conn`.
pub fn detect(ctx: &GlobalContext, conn: &dyn Connection, cancel: &CancelToken) -> DetectReport {
    let start = Instant::now();

    let services = FacilityReport::from_resolution(
        ctx.services().kind(),
        ctx.services().resolve(conn, cancel),
        |sm| (sm.name(), initsystem::extensions(sm)),
    );
    let packages = FacilityReport::from_resolution(
        ctx.packages().kind(),
        ctx.packages().resolve(conn, cancel),
        |pm| (pm.name(), packagemanager::extensions(pm)),
    );

    DetectReport {
        target: conn.identity().to_string(),
        windows: conn.is_windows(),
        facilities: vec![services, packages],
        duration: start.elapsed(),
    }
}

impl fmt::Display for DetectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Target: {}", self.target)?;
        writeln!(f)?;
        for facility in &self.facilities {
            match (&facility.status, facility.name) {
                (FacilityStatus::Found, Some(name)) => {
                    write!(f, "  [OK] {}: {}", facility.kind, name)?;
                    if !facility.extensions.is_empty() {
                        write!(f, " ({})", facility.extensions.join(", "))?;
                    }
                    writeln!(f)?;
                }
                _ => writeln!(
                    f,
                    "  [--] {}: {}",
                    facility.kind,
                    facility.message.as_deref().unwrap_or("unknown")
                )?,
            }
        }
        Ok(())
    }
}

/// Format the detection report for display.
pub fn format_report(report: &DetectReport, verbose: bool) -> String {
    let mut output = report.to_string();
    if verbose {
        output.push_str(&format!(
            "\nDetected {} of {} in {:.2?}\n",
            report.found_count(),
            report.facilities.len(),
            report.duration
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockConnection, MockProcessOutput};
    use crate::util::config::Config;
    use std::path::PathBuf;

    fn context() -> GlobalContext {
        GlobalContext::with_resolvers(
            PathBuf::from("/"),
            Config::default(),
            initsystem::default_resolver(),
            packagemanager::default_resolver(),
        )
    }

    #[test]
    fn test_detect_mac() {
        let ctx = context();
        let conn = MockConnection::new("mac-1");
        conn.expect(
            "test -f /System/Library/CoreServices/SystemVersion.plist",
            MockProcessOutput::success(""),
        );
        conn.expect("command -v brew", MockProcessOutput::success("/opt/homebrew/bin/brew"));

        let report = detect(&ctx, &conn, &CancelToken::new());
        assert_eq!(report.found_count(), 2);
        assert_eq!(report.facilities[0].name, Some("launchd"));
        assert_eq!(report.facilities[0].extensions, vec!["logs"]);
        assert_eq!(report.facilities[1].name, Some("homebrew"));

        let text = format_report(&report, false);
        assert!(text.contains("[OK] init system: launchd (logs)"));
        assert!(text.contains("[OK] package manager: homebrew (version)"));
    }

    #[test]
    fn test_detect_reports_not_found() {
        let ctx = context();
        let conn = MockConnection::new("bare-1");

        let report = detect(&ctx, &conn, &CancelToken::new());
        assert_eq!(report.found_count(), 0);
        assert_eq!(report.facilities[0].status, FacilityStatus::NotFound);
        assert_eq!(
            report.facilities[0].message.as_deref(),
            Some(initsystem::NOT_FOUND)
        );
        assert_eq!(
            report.facilities[1].message.as_deref(),
            Some(packagemanager::NOT_FOUND)
        );
    }

    #[test]
    fn test_detect_reports_probe_errors() {
        let ctx = context();
        let conn = MockConnection::new("flaky-1");
        conn.set_default(MockProcessOutput::disconnected("connection reset"));

        let report = detect(&ctx, &conn, &CancelToken::new());
        assert_eq!(report.facilities[0].status, FacilityStatus::Error);
        assert_eq!(report.facilities[1].status, FacilityStatus::Error);
    }

    #[test]
    fn test_json_shape() {
        let ctx = context();
        let conn = MockConnection::new("bare-1");
        let report = detect(&ctx, &conn, &CancelToken::new());

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["target"], "bare-1");
        assert_eq!(value["facilities"][0]["kind"], "init system");
        assert_eq!(value["facilities"][0]["status"], "not_found");
        assert!(value["facilities"][0].get("name").is_none());
        assert!(value.get("duration").is_none());
    }
}
