//! Upstart (older Ubuntu releases).

use crate::core::cancel::CancelToken;
use crate::core::connection::{capture_operation, run_operation, Connection};
use crate::core::error::OperationError;
use crate::resolver::{probe, Probe};
use crate::util::shell::ShellCommand;

use super::{check_service_name, found, ServiceManager, ServiceManagerResolver, ServiceRestarter};

const FACILITY: &str = "upstart";

#[derive(Debug, Clone, Copy, Default)]
pub struct Upstart;

fn override_path(service: &str) -> String {
    format!("/etc/init/{}.override", service)
}

impl ServiceManager for Upstart {
    fn name(&self) -> &'static str {
        FACILITY
    }

    fn start_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "start service", service)?;
        let cmd = ShellCommand::new("initctl start").arg(service);
        run_operation(conn, cancel, FACILITY, "start service", service, &cmd)
    }

    fn stop_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "stop service", service)?;
        let cmd = ShellCommand::new("initctl stop").arg(service);
        run_operation(conn, cancel, FACILITY, "stop service", service, &cmd)
    }

    /// Upstart jobs start on boot unless a `manual` override exists.
    fn enable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "enable service", service)?;
        let cmd = ShellCommand::new("rm -f").arg(override_path(service));
        run_operation(conn, cancel, FACILITY, "enable service", service, &cmd)
    }

    fn disable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "disable service", service)?;
        let cmd = ShellCommand::new("echo manual >").arg(override_path(service));
        run_operation(conn, cancel, FACILITY, "disable service", service, &cmd)
    }

    fn service_is_running(&self, conn: &dyn Connection, cancel: &CancelToken, service: &str) -> bool {
        let cmd = ShellCommand::new("initctl status").arg(service);
        conn.exec_output(cancel, &cmd)
            .map(|out| out.contains("start/running"))
            .unwrap_or(false)
    }

    fn service_script_path(
        &self,
        _conn: &dyn Connection,
        _cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError> {
        check_service_name(FACILITY, "locate script of", service)?;
        Ok(format!("/etc/init/{}.conf", service))
    }

    fn as_restarter(&self) -> Option<&dyn ServiceRestarter> {
        Some(self)
    }
}

impl ServiceRestarter for Upstart {
    fn restart_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "restart service", service)?;
        let cmd = ShellCommand::new("initctl restart").arg(service);
        capture_operation(conn, cancel, FACILITY, "restart service", service, &cmd).map(|_| ())
    }
}

/// Matches when `initctl` is on PATH and `/usr/share/upstart` exists.
pub(super) fn register(resolver: &mut ServiceManagerResolver) {
    resolver.register(Probe::new(FACILITY, |conn, cancel| {
        if conn.is_windows() {
            return Ok(None);
        }
        if !probe::command_exists(conn, cancel, "initctl")? {
            return Ok(None);
        }
        if !probe::dir_exists(conn, cancel, "/usr/share/upstart")? {
            return Ok(None);
        }
        Ok(found(Upstart))
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockConnection, MockProcessOutput};

    #[test]
    fn test_status_parsing() {
        let conn = MockConnection::new("trusty-1");
        conn.expect(
            "initctl status ssh",
            MockProcessOutput::success("ssh start/running, process 812\n"),
        );
        conn.expect(
            "initctl status cron",
            MockProcessOutput::success("cron stop/waiting\n"),
        );

        let cancel = CancelToken::new();
        assert!(Upstart.service_is_running(&conn, &cancel, "ssh"));
        assert!(!Upstart.service_is_running(&conn, &cancel, "cron"));
    }

    #[test]
    fn test_disable_writes_override() {
        let conn = MockConnection::new("trusty-1");
        conn.set_default(MockProcessOutput::success(""));

        Upstart
            .disable_service(&conn, &CancelToken::new(), "ssh")
            .unwrap();
        assert_eq!(conn.calls(), vec!["echo manual > /etc/init/ssh.override"]);
    }

    #[test]
    fn test_override_stays_inside_init_dir() {
        let conn = MockConnection::new("trusty-1");
        conn.set_default(MockProcessOutput::success(""));
        let cancel = CancelToken::new();

        let err = Upstart
            .disable_service(&conn, &cancel, "../../tmp/x")
            .unwrap_err();
        assert!(err.to_string().contains("must not contain a path separator"));
        assert!(Upstart.enable_service(&conn, &cancel, "../x").is_err());
        assert!(Upstart
            .service_script_path(&conn, &cancel, "../x")
            .is_err());
        assert!(conn.calls().is_empty());
    }
}
