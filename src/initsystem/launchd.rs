//! launchd, the macOS init system.
//!
//! Only system daemons under `/Library/LaunchDaemons` are handled; per-user
//! agents are out of reach of this adapter.

use crate::core::cancel::CancelToken;
use crate::core::connection::{capture_operation, run_operation, Connection};
use crate::core::error::OperationError;
use crate::resolver::{probe, Probe};
use crate::util::shell::ShellCommand;

use super::{
    check_service_name, found, tail, ServiceLogReader, ServiceManager, ServiceManagerResolver,
};

const FACILITY: &str = "launchd";

/// File present on every macOS install.
const DARWIN_MARKER: &str = "/System/Library/CoreServices/SystemVersion.plist";

#[derive(Debug, Clone, Copy, Default)]
pub struct Launchd;

impl ServiceManager for Launchd {
    fn name(&self) -> &'static str {
        FACILITY
    }

    fn start_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        let cmd = ShellCommand::new("launchctl kickstart").arg(service);
        run_operation(conn, cancel, FACILITY, "start service", service, &cmd)
    }

    fn stop_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        let cmd = ShellCommand::new("launchctl kill").arg(service);
        run_operation(conn, cancel, FACILITY, "stop service", service, &cmd)
    }

    fn enable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        let cmd = ShellCommand::new("launchctl enable").arg(service);
        run_operation(conn, cancel, FACILITY, "enable service", service, &cmd)
    }

    fn disable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        let cmd = ShellCommand::new("launchctl disable").arg(service);
        run_operation(conn, cancel, FACILITY, "disable service", service, &cmd)
    }

    fn service_is_running(&self, conn: &dyn Connection, cancel: &CancelToken, service: &str) -> bool {
        let cmd = ShellCommand::new("launchctl list | grep -q").arg(service);
        conn.exec(cancel, &cmd).is_ok()
    }

    fn service_script_path(
        &self,
        _conn: &dyn Connection,
        _cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError> {
        check_service_name(FACILITY, "locate script of", service)?;
        Ok(format!("/Library/LaunchDaemons/{}.plist", service))
    }

    fn as_log_reader(&self) -> Option<&dyn ServiceLogReader> {
        Some(self)
    }
}

impl ServiceLogReader for Launchd {
    fn service_logs(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
        lines: usize,
    ) -> Result<Vec<String>, OperationError> {
        let predicate = format!("subsystem contains \"{}\"", service.replace('"', "\\\""));
        let cmd = ShellCommand::new("log show --predicate")
            .arg(predicate)
            .raw("--debug --info --last 10m --style syslog");
        let out = capture_operation(conn, cancel, FACILITY, "read logs of", service, &cmd)?;
        Ok(tail(&out, lines))
    }
}

/// Matches when the Darwin version marker exists on a non-Windows target.
pub(super) fn register(resolver: &mut ServiceManagerResolver) {
    resolver.register(Probe::new(FACILITY, |conn, cancel| {
        if conn.is_windows() {
            return Ok(None);
        }
        if !probe::file_exists(conn, cancel, DARWIN_MARKER)? {
            return Ok(None);
        }
        Ok(found(Launchd))
    }));
}
