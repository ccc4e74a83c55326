//! runit (Void Linux, some containers).

use crate::core::cancel::CancelToken;
use crate::core::connection::{run_operation, Connection};
use crate::core::error::OperationError;
use crate::resolver::{probe, Probe};
use crate::util::shell::ShellCommand;

use super::{check_service_name, found, ServiceManager, ServiceManagerResolver, ServiceRestarter};

const FACILITY: &str = "runit";

#[derive(Debug, Clone, Copy, Default)]
pub struct Runit;

impl Runit {
    fn sv(
        conn: &dyn Connection,
        cancel: &CancelToken,
        verb: &'static str,
        operation: &'static str,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, operation, service)?;
        let cmd = ShellCommand::new("sv").raw(verb).arg(service);
        run_operation(conn, cancel, FACILITY, operation, service, &cmd)
    }
}

impl ServiceManager for Runit {
    fn name(&self) -> &'static str {
        FACILITY
    }

    fn start_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::sv(conn, cancel, "start", "start service", service)
    }

    fn stop_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::sv(conn, cancel, "stop", "stop service", service)
    }

    /// A service is enabled when its directory is linked into `/var/service`.
    fn enable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "enable service", service)?;
        let cmd = ShellCommand::new("ln -sf")
            .arg(format!("/etc/sv/{}", service))
            .arg(format!("/var/service/{}", service));
        run_operation(conn, cancel, FACILITY, "enable service", service, &cmd)
    }

    fn disable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "disable service", service)?;
        let cmd = ShellCommand::new("rm -f").arg(format!("/var/service/{}", service));
        run_operation(conn, cancel, FACILITY, "disable service", service, &cmd)
    }

    fn service_is_running(&self, conn: &dyn Connection, cancel: &CancelToken, service: &str) -> bool {
        let cmd = ShellCommand::new("sv status").arg(service);
        conn.exec_output(cancel, &cmd)
            .map(|out| out.starts_with("run:"))
            .unwrap_or(false)
    }

    fn service_script_path(
        &self,
        _conn: &dyn Connection,
        _cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError> {
        check_service_name(FACILITY, "locate script of", service)?;
        Ok(format!("/etc/sv/{}/run", service))
    }

    fn as_restarter(&self) -> Option<&dyn ServiceRestarter> {
        Some(self)
    }
}

impl ServiceRestarter for Runit {
    fn restart_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::sv(conn, cancel, "restart", "restart service", service)
    }
}

/// Matches when `sv` is on PATH and a service directory exists.
pub(super) fn register(resolver: &mut ServiceManagerResolver) {
    resolver.register(Probe::new(FACILITY, |conn, cancel| {
        if conn.is_windows() {
            return Ok(None);
        }
        if !probe::command_exists(conn, cancel, "sv")? {
            return Ok(None);
        }
        if probe::dir_exists(conn, cancel, "/var/service")?
            || probe::dir_exists(conn, cancel, "/etc/service")?
        {
            return Ok(found(Runit));
        }
        Ok(None)
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ExecError;
    use crate::test_support::{MockConnection, MockProcessOutput};

    #[test]
    fn test_enable_links_service_dir() {
        let conn = MockConnection::new("void-1");
        conn.set_default(MockProcessOutput::success(""));

        Runit.enable_service(&conn, &CancelToken::new(), "sshd").unwrap();
        assert_eq!(conn.calls(), vec!["ln -sf /etc/sv/sshd /var/service/sshd"]);
    }

    #[test]
    fn test_link_stays_inside_service_dir() {
        let conn = MockConnection::new("void-1");
        conn.set_default(MockProcessOutput::success(""));
        let cancel = CancelToken::new();

        let err = Runit
            .disable_service(&conn, &cancel, "../../tmp/x")
            .unwrap_err();
        assert_eq!(err.operation, "disable service");
        assert!(matches!(err.source, ExecError::InvalidName { .. }));
        assert!(Runit.enable_service(&conn, &cancel, "..").is_err());
        assert!(Runit.start_service(&conn, &cancel, "-w").is_err());
        assert!(conn.calls().is_empty());
    }

    #[test]
    fn test_status() {
        let conn = MockConnection::new("void-1");
        conn.expect(
            "sv status sshd",
            MockProcessOutput::success("run: sshd: (pid 412) 9001s\n"),
        );
        conn.expect(
            "sv status ntpd",
            MockProcessOutput::success("down: ntpd: 3s, normally up\n"),
        );

        let cancel = CancelToken::new();
        assert!(Runit.service_is_running(&conn, &cancel, "sshd"));
        assert!(!Runit.service_is_running(&conn, &cancel, "ntpd"));
    }
}
