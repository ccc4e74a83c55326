//! systemd.

use std::collections::BTreeMap;

use crate::core::cancel::CancelToken;
use crate::core::connection::{capture_operation, run_operation, Connection};
use crate::core::error::OperationError;
use crate::resolver::{probe, Probe};
use crate::util::shell::ShellCommand;

use super::{
    check_service_name, found, tail, ServiceEnvironmentManager, ServiceLogReader, ServiceManager,
    ServiceManagerResolver, ServiceReloader, ServiceRestarter,
};

const FACILITY: &str = "systemd";

#[derive(Debug, Clone, Copy, Default)]
pub struct Systemd;

impl Systemd {
    fn systemctl(
        conn: &dyn Connection,
        cancel: &CancelToken,
        verb: &'static str,
        operation: &'static str,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, operation, service)?;
        let cmd = ShellCommand::new("systemctl").raw(verb).arg(service);
        run_operation(conn, cancel, FACILITY, operation, service, &cmd)
    }
}

impl ServiceManager for Systemd {
    fn name(&self) -> &'static str {
        FACILITY
    }

    fn start_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::systemctl(conn, cancel, "start", "start service", service)
    }

    fn stop_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::systemctl(conn, cancel, "stop", "stop service", service)
    }

    fn enable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::systemctl(conn, cancel, "enable", "enable service", service)
    }

    fn disable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::systemctl(conn, cancel, "disable", "disable service", service)
    }

    fn service_is_running(&self, conn: &dyn Connection, cancel: &CancelToken, service: &str) -> bool {
        let cmd = ShellCommand::new("systemctl is-active -q").arg(service);
        conn.exec(cancel, &cmd).is_ok()
    }

    fn service_script_path(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError> {
        check_service_name(FACILITY, "locate unit of", service)?;
        let cmd = ShellCommand::new("systemctl show -p FragmentPath").arg(service);
        let out = capture_operation(conn, cancel, FACILITY, "locate unit of", service, &cmd)?;
        Ok(out
            .trim()
            .strip_prefix("FragmentPath=")
            .unwrap_or(out.trim())
            .to_string())
    }

    fn as_log_reader(&self) -> Option<&dyn ServiceLogReader> {
        Some(self)
    }

    fn as_restarter(&self) -> Option<&dyn ServiceRestarter> {
        Some(self)
    }

    fn as_reloader(&self) -> Option<&dyn ServiceReloader> {
        Some(self)
    }

    fn as_environment_manager(&self) -> Option<&dyn ServiceEnvironmentManager> {
        Some(self)
    }
}

impl ServiceLogReader for Systemd {
    fn service_logs(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
        lines: usize,
    ) -> Result<Vec<String>, OperationError> {
        check_service_name(FACILITY, "read logs of", service)?;
        let cmd = ShellCommand::new("journalctl -n")
            .arg(lines.to_string())
            .raw("-u")
            .arg(service)
            .raw("--no-pager");
        let out = capture_operation(conn, cancel, FACILITY, "read logs of", service, &cmd)?;
        Ok(tail(&out, lines))
    }
}

impl ServiceRestarter for Systemd {
    fn restart_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::systemctl(conn, cancel, "restart", "restart service", service)
    }
}

impl ServiceReloader for Systemd {
    fn daemon_reload(&self, conn: &dyn Connection, cancel: &CancelToken) -> Result<(), OperationError> {
        let cmd = ShellCommand::new("systemctl daemon-reload");
        run_operation(conn, cancel, FACILITY, "reload", "daemon", &cmd)
    }
}

impl ServiceEnvironmentManager for Systemd {
    fn service_environment_path(
        &self,
        _conn: &dyn Connection,
        _cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError> {
        check_service_name(FACILITY, "locate environment of", service)?;
        Ok(format!("/etc/systemd/system/{}.service.d/env.conf", service))
    }

    fn service_environment_content(&self, env: &BTreeMap<String, String>) -> String {
        let mut out = String::from("[Service]\n");
        for (key, value) in env {
            let escaped = format!("{}={}", key, value)
                .replace('\\', "\\\\")
                .replace('"', "\\\"");
            out.push_str(&format!("Environment=\"{}\"\n", escaped));
        }
        out
    }
}

/// Matches when `/run/systemd/system` exists and `systemctl` is on PATH.
pub(super) fn register(resolver: &mut ServiceManagerResolver) {
    resolver.register(Probe::new(FACILITY, |conn, cancel| {
        if conn.is_windows() {
            return Ok(None);
        }
        if !probe::dir_exists(conn, cancel, "/run/systemd/system")? {
            return Ok(None);
        }
        if !probe::command_exists(conn, cancel, "systemctl")? {
            return Ok(None);
        }
        Ok(found(Systemd))
    }));
}
