//! Windows Service Control Manager via `sc.exe`.

use crate::core::cancel::CancelToken;
use crate::core::connection::{capture_operation, run_operation, Connection};
use crate::core::error::OperationError;
use crate::resolver::{probe, Probe};
use crate::util::shell::ShellCommand;

use super::{found, ServiceManager, ServiceManagerResolver};

const FACILITY: &str = "winscm";

#[derive(Debug, Clone, Copy, Default)]
pub struct WinScm;

impl ServiceManager for WinScm {
    fn name(&self) -> &'static str {
        FACILITY
    }

    fn start_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        let cmd = ShellCommand::new("sc.exe start").arg(service);
        run_operation(conn, cancel, FACILITY, "start service", service, &cmd)
    }

    fn stop_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        let cmd = ShellCommand::new("sc.exe stop").arg(service);
        run_operation(conn, cancel, FACILITY, "stop service", service, &cmd)
    }

    fn enable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        let cmd = ShellCommand::new("sc.exe config").arg(service).raw("start=auto");
        run_operation(conn, cancel, FACILITY, "enable service", service, &cmd)
    }

    fn disable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        let cmd = ShellCommand::new("sc.exe config").arg(service).raw("start=demand");
        run_operation(conn, cancel, FACILITY, "disable service", service, &cmd)
    }

    fn service_is_running(&self, conn: &dyn Connection, cancel: &CancelToken, service: &str) -> bool {
        let cmd = ShellCommand::new("sc.exe query").arg(service);
        conn.exec_output(cancel, &cmd)
            .map(|out| out.contains("RUNNING"))
            .unwrap_or(false)
    }

    /// Reads `BINARY_PATH_NAME` from `sc.exe qc`.
    fn service_script_path(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError> {
        let cmd = ShellCommand::new("sc.exe qc").arg(service);
        let out = capture_operation(conn, cancel, FACILITY, "locate binary of", service, &cmd)?;
        Ok(out
            .lines()
            .find_map(|line| {
                let (key, value) = line.split_once(':')?;
                (key.trim() == "BINARY_PATH_NAME").then(|| value.trim().to_string())
            })
            .unwrap_or_default())
    }
}

/// Matches Windows targets where `sc.exe query` answers.
pub(super) fn register(resolver: &mut ServiceManagerResolver) {
    resolver.register(Probe::new(FACILITY, |conn, cancel| {
        if !conn.is_windows() {
            return Ok(None);
        }
        if !probe::succeeds(conn, cancel, &ShellCommand::new("sc.exe query"))? {
            return Ok(None);
        }
        Ok(found(WinScm))
    }));
}
