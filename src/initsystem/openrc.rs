//! OpenRC (Alpine, Gentoo).

use std::collections::BTreeMap;

use crate::core::cancel::CancelToken;
use crate::core::connection::{capture_operation, run_operation, Connection};
use crate::core::error::OperationError;
use crate::resolver::{probe, Probe};
use crate::util::shell::{quote, ShellCommand, ShellFlavor};

use super::{
    check_service_name, found, ServiceEnvironmentManager, ServiceManager, ServiceManagerResolver,
    ServiceRestarter,
};

const FACILITY: &str = "openrc";

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRc;

impl OpenRc {
    fn rc_service(
        conn: &dyn Connection,
        cancel: &CancelToken,
        verb: &'static str,
        operation: &'static str,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, operation, service)?;
        let cmd = ShellCommand::new("rc-service").arg(service).raw(verb);
        run_operation(conn, cancel, FACILITY, operation, service, &cmd)
    }
}

impl ServiceManager for OpenRc {
    fn name(&self) -> &'static str {
        FACILITY
    }

    fn start_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::rc_service(conn, cancel, "start", "start service", service)
    }

    fn stop_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::rc_service(conn, cancel, "stop", "stop service", service)
    }

    fn enable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "enable service", service)?;
        let cmd = ShellCommand::new("rc-update add").arg(service);
        run_operation(conn, cancel, FACILITY, "enable service", service, &cmd)
    }

    fn disable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "disable service", service)?;
        let cmd = ShellCommand::new("rc-update del").arg(service);
        run_operation(conn, cancel, FACILITY, "disable service", service, &cmd)
    }

    fn service_is_running(&self, conn: &dyn Connection, cancel: &CancelToken, service: &str) -> bool {
        let cmd = ShellCommand::new("rc-service").arg(service).raw("status");
        conn.exec(cancel, &cmd).is_ok()
    }

    fn service_script_path(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError> {
        check_service_name(FACILITY, "locate script of", service)?;
        let cmd = ShellCommand::new("rc-service -r").arg(service);
        let out = capture_operation(conn, cancel, FACILITY, "locate script of", service, &cmd)?;
        Ok(out.trim().to_string())
    }

    fn as_restarter(&self) -> Option<&dyn ServiceRestarter> {
        Some(self)
    }

    fn as_environment_manager(&self) -> Option<&dyn ServiceEnvironmentManager> {
        Some(self)
    }
}

impl ServiceRestarter for OpenRc {
    fn restart_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::rc_service(conn, cancel, "restart", "restart service", service)
    }
}

impl ServiceEnvironmentManager for OpenRc {
    fn service_environment_path(
        &self,
        _conn: &dyn Connection,
        _cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError> {
        check_service_name(FACILITY, "locate environment of", service)?;
        Ok(format!("/etc/conf.d/{}", service))
    }

    /// conf.d files are sourced by the init script, so values use shell quoting.
    fn service_environment_content(&self, env: &BTreeMap<String, String>) -> String {
        env.iter()
            .map(|(key, value)| format!("export {}={}\n", key, quote(value, ShellFlavor::Posix)))
            .collect()
    }
}

/// Matches when `openrc-init` or `openrc` is on PATH.
pub(super) fn register(resolver: &mut ServiceManagerResolver) {
    resolver.register(Probe::new(FACILITY, |conn, cancel| {
        if conn.is_windows() {
            return Ok(None);
        }
        if probe::command_exists(conn, cancel, "openrc-init")?
            || probe::command_exists(conn, cancel, "openrc")?
        {
            return Ok(found(OpenRc));
        }
        Ok(None)
    }));
}
