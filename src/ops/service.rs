//! Service operations against the resolved init system.

use anyhow::{Context, Result};

use crate::core::cancel::CancelToken;
use crate::core::connection::Connection;
use crate::initsystem;
use crate::util::shell::check_operand;
use crate::util::GlobalContext;

/// A single service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
    Status,
    Logs { lines: usize },
    Path,
}

/// What a service operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOutcome {
    /// The operation ran; nothing to report.
    Done,
    Running(bool),
    Logs(Vec<String>),
    /// The init system has no log access.
    LogsUnavailable { facility: &'static str },
    Path(String),
}

/// Resolve the init system on `conn` and run `action` for `service`.
pub fn run_service_action(
    ctx: &GlobalContext,
    conn: &dyn Connection,
    cancel: &CancelToken,
    service: &str,
    action: &ServiceAction,
) -> Result<ServiceOutcome> {
    check_operand(service).context("refusing to pass service name to the init system")?;

    let sm = ctx
        .services()
        .resolve(conn, cancel)
        .context("cannot manage services on this target")?;

    tracing::debug!("{:?} `{}` using {}", action, service, sm.name());

    let outcome = match action {
        ServiceAction::Start => {
            sm.start_service(conn, cancel, service)?;
            ServiceOutcome::Done
        }
        ServiceAction::Stop => {
            sm.stop_service(conn, cancel, service)?;
            ServiceOutcome::Done
        }
        ServiceAction::Restart => {
            initsystem::restart_service(sm.as_ref(), conn, cancel, service)?;
            ServiceOutcome::Done
        }
        ServiceAction::Enable => {
            sm.enable_service(conn, cancel, service)?;
            if initsystem::reload_if_supported(sm.as_ref(), conn, cancel)? {
                tracing::debug!("{} configuration reloaded", sm.name());
            }
            ServiceOutcome::Done
        }
        ServiceAction::Disable => {
            sm.disable_service(conn, cancel, service)?;
            ServiceOutcome::Done
        }
        ServiceAction::Status => {
            ServiceOutcome::Running(sm.service_is_running(conn, cancel, service))
        }
        ServiceAction::Logs { lines } => match sm.as_log_reader() {
            Some(reader) => ServiceOutcome::Logs(reader.service_logs(conn, cancel, service, *lines)?),
            None => ServiceOutcome::LogsUnavailable {
                facility: sm.name(),
            },
        },
        ServiceAction::Path => {
            ServiceOutcome::Path(sm.service_script_path(conn, cancel, service)?)
        }
    };

    Ok(outcome)
}
