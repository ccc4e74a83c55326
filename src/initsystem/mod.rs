//! Service managers (init systems).
//!
//! Every init system implements the base [`ServiceManager`] trait. Optional
//! behavior lives in separate extension traits which callers reach through
//! the `as_*` accessors; an implementation that does not support an
//! extension returns `None`, and callers must handle that.
//!
//! | Facility    | Logs | Restart | Reload | Env files |
//! |-------------|------|---------|--------|-----------|
//! | systemd     | yes  | yes     | yes    | yes       |
//! | OpenRC      |      | yes     |        | yes       |
//! | Upstart     |      | yes     |        |           |
//! | SysVinit    |      | yes     |        |           |
//! | Windows SCM |      |         |        |           |
//! | runit       |      | yes     |        |           |
//! | launchd     | yes  |         |        |           |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::cancel::CancelToken;
use crate::core::connection::Connection;
use crate::core::error::OperationError;
use crate::resolver::Resolver;
use crate::util::shell;

mod launchd;
mod openrc;
mod runit;
mod systemd;
mod sysvinit;
mod upstart;
mod winscm;

pub use launchd::Launchd;
pub use openrc::OpenRc;
pub use runit::Runit;
pub use systemd::Systemd;
pub use sysvinit::SysVinit;
pub use upstart::Upstart;
pub use winscm::WinScm;

/// Error message when no init system probe matches.
pub const NOT_FOUND: &str = "no supported init system found";

/// Resolver specialized for service managers.
pub type ServiceManagerResolver = Resolver<dyn ServiceManager>;

/// Base contract every init system provides.
pub trait ServiceManager: Send + Sync + fmt::Debug {
    /// Short facility name, e.g. "systemd".
    fn name(&self) -> &'static str;

    fn start_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError>;

    fn stop_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError>;

    fn enable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError>;

    fn disable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError>;

    /// Whether the service is running. Any failure to tell reads as `false`.
    fn service_is_running(&self, conn: &dyn Connection, cancel: &CancelToken, service: &str) -> bool;

    /// Path of the unit/script/plist defining the service.
    fn service_script_path(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError>;

    fn as_log_reader(&self) -> Option<&dyn ServiceLogReader> {
        None
    }

    fn as_restarter(&self) -> Option<&dyn ServiceRestarter> {
        None
    }

    fn as_reloader(&self) -> Option<&dyn ServiceReloader> {
        None
    }

    fn as_environment_manager(&self) -> Option<&dyn ServiceEnvironmentManager> {
        None
    }
}

/// Reads recent log lines of a service.
pub trait ServiceLogReader {
    /// Return at most the last `lines` lines.
    fn service_logs(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
        lines: usize,
    ) -> Result<Vec<String>, OperationError>;
}

/// Restarts a service in one step instead of stop + start.
pub trait ServiceRestarter {
    fn restart_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError>;
}

/// Init systems that must reload their configuration after unit changes.
pub trait ServiceReloader {
    fn daemon_reload(&self, conn: &dyn Connection, cancel: &CancelToken) -> Result<(), OperationError>;
}

/// Init systems with per-service environment files.
pub trait ServiceEnvironmentManager {
    fn service_environment_path(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError>;

    /// Render `env` in the file format this init system reads.
    fn service_environment_content(&self, env: &BTreeMap<String, String>) -> String;
}

/// Names of the extensions `sm` supports, for display.
pub fn extensions(sm: &dyn ServiceManager) -> Vec<&'static str> {
    let mut out = Vec::new();
    if sm.as_log_reader().is_some() {
        out.push("logs");
    }
    if sm.as_restarter().is_some() {
        out.push("restart");
    }
    if sm.as_reloader().is_some() {
        out.push("reload");
    }
    if sm.as_environment_manager().is_some() {
        out.push("environment");
    }
    out
}

/// Restart a service, falling back to stop + start.
pub fn restart_service(
    sm: &dyn ServiceManager,
    conn: &dyn Connection,
    cancel: &CancelToken,
    service: &str,
) -> Result<(), OperationError> {
    match sm.as_restarter() {
        Some(restarter) => restarter.restart_service(conn, cancel, service),
        None => {
            tracing::debug!("{} has no direct restart, using stop + start", sm.name());
            sm.stop_service(conn, cancel, service)?;
            sm.start_service(conn, cancel, service)
        }
    }
}

/// Reload the init system if it needs it. Returns whether a reload ran.
pub fn reload_if_supported(
    sm: &dyn ServiceManager,
    conn: &dyn Connection,
    cancel: &CancelToken,
) -> Result<bool, OperationError> {
    match sm.as_reloader() {
        Some(reloader) => {
            reloader.daemon_reload(conn, cancel)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Keep only the last `lines` entries of command output.
pub(crate) fn tail(output: &str, lines: usize) -> Vec<String> {
    let output = output.trim_end_matches('\n');
    if output.is_empty() {
        return Vec::new();
    }
    let rows: Vec<&str> = output.split('\n').collect();
    let start = rows.len().saturating_sub(lines);
    rows[start..].iter().map(|r| r.to_string()).collect()
}

/// Refuse service names that a tool would take as a flag, or that would
/// step outside the directory the init system keeps its files in.
pub(crate) fn check_service_name(
    facility: &'static str,
    operation: &'static str,
    service: &str,
) -> Result<(), OperationError> {
    shell::check_path_component(service)
        .map_err(|source| OperationError::new(operation, facility, service, source))
}

pub(crate) fn found<T: ServiceManager + 'static>(sm: T) -> Option<Arc<dyn ServiceManager>> {
    Some(Arc::new(sm))
}

/// Build the default init system resolver.
///
/// Probe order: systemd, OpenRC, Upstart, SysVinit, Windows SCM, runit,
/// launchd.
pub fn default_resolver() -> ServiceManagerResolver {
    let mut resolver = ServiceManagerResolver::new("init system", NOT_FOUND);
    systemd::register(&mut resolver);
    openrc::register(&mut resolver);
    upstart::register(&mut resolver);
    sysvinit::register(&mut resolver);
    winscm::register(&mut resolver);
    runit::register(&mut resolver);
    launchd::register(&mut resolver);
    resolver
}
