//! SysVinit scripts under `/etc/init.d`.

use crate::core::cancel::CancelToken;
use crate::core::connection::{run_operation, Connection};
use crate::core::error::OperationError;
use crate::resolver::{probe, Probe};
use crate::util::shell::ShellCommand;

use super::{check_service_name, found, ServiceManager, ServiceManagerResolver, ServiceRestarter};

const FACILITY: &str = "sysvinit";

#[derive(Debug, Clone, Copy, Default)]
pub struct SysVinit;

fn script(service: &str) -> String {
    format!("/etc/init.d/{}", service)
}

impl SysVinit {
    fn invoke(
        conn: &dyn Connection,
        cancel: &CancelToken,
        verb: &'static str,
        operation: &'static str,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, operation, service)?;
        let cmd = ShellCommand::new("").arg(script(service)).raw(verb);
        run_operation(conn, cancel, FACILITY, operation, service, &cmd)
    }
}

impl ServiceManager for SysVinit {
    fn name(&self) -> &'static str {
        FACILITY
    }

    fn start_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::invoke(conn, cancel, "start", "start service", service)
    }

    fn stop_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::invoke(conn, cancel, "stop", "stop service", service)
    }

    fn enable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "enable service", service)?;
        let cmd = ShellCommand::new("update-rc.d").arg(service).raw("defaults");
        run_operation(conn, cancel, FACILITY, "enable service", service, &cmd)
    }

    fn disable_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        check_service_name(FACILITY, "disable service", service)?;
        let cmd = ShellCommand::new("update-rc.d -f").arg(service).raw("remove");
        run_operation(conn, cancel, FACILITY, "disable service", service, &cmd)
    }

    fn service_is_running(&self, conn: &dyn Connection, cancel: &CancelToken, service: &str) -> bool {
        if check_service_name(FACILITY, "check service", service).is_err() {
            return false;
        }
        let cmd = ShellCommand::new("").arg(script(service)).raw("status");
        conn.exec(cancel, &cmd).is_ok()
    }

    fn service_script_path(
        &self,
        _conn: &dyn Connection,
        _cancel: &CancelToken,
        service: &str,
    ) -> Result<String, OperationError> {
        check_service_name(FACILITY, "locate script of", service)?;
        Ok(script(service))
    }

    fn as_restarter(&self) -> Option<&dyn ServiceRestarter> {
        Some(self)
    }
}

impl ServiceRestarter for SysVinit {
    fn restart_service(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        service: &str,
    ) -> Result<(), OperationError> {
        Self::invoke(conn, cancel, "restart", "restart service", service)
    }
}

/// Matches when `/etc/init.d` exists and `update-rc.d` is on PATH.
pub(super) fn register(resolver: &mut ServiceManagerResolver) {
    resolver.register(Probe::new(FACILITY, |conn, cancel| {
        if conn.is_windows() {
            return Ok(None);
        }
        if !probe::dir_exists(conn, cancel, "/etc/init.d")? {
            return Ok(None);
        }
        if !probe::command_exists(conn, cancel, "update-rc.d")? {
            return Ok(None);
        }
        Ok(found(SysVinit))
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockConnection, MockProcessOutput};

    #[test]
    fn test_script_invocations() {
        let conn = MockConnection::new("debian-7");
        conn.set_default(MockProcessOutput::success(""));
        let cancel = CancelToken::new();

        SysVinit.start_service(&conn, &cancel, "ssh").unwrap();
        SysVinit.enable_service(&conn, &cancel, "ssh").unwrap();
        SysVinit.disable_service(&conn, &cancel, "ssh").unwrap();
        assert!(SysVinit.service_is_running(&conn, &cancel, "ssh"));

        assert_eq!(
            conn.calls(),
            vec![
                "/etc/init.d/ssh start",
                "update-rc.d ssh defaults",
                "update-rc.d -f ssh remove",
                "/etc/init.d/ssh status",
            ]
        );
    }

    #[test]
    fn test_hostile_name_stays_one_argument() {
        let conn = MockConnection::new("debian-7");
        conn.set_default(MockProcessOutput::success(""));

        SysVinit
            .stop_service(&conn, &CancelToken::new(), "x; reboot")
            .unwrap();
        assert_eq!(conn.calls(), vec!["'/etc/init.d/x; reboot' stop"]);
    }

    #[test]
    fn test_scripts_outside_init_d_are_refused() {
        let conn = MockConnection::new("debian-7");
        conn.set_default(MockProcessOutput::success(""));
        let cancel = CancelToken::new();

        assert!(SysVinit.start_service(&conn, &cancel, "../../tmp/x").is_err());
        assert!(!SysVinit.service_is_running(&conn, &cancel, "../../tmp/x"));
        assert!(SysVinit.enable_service(&conn, &cancel, "-f").is_err());
        assert!(conn.calls().is_empty());
    }
}
