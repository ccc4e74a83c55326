//! The connection contract consumed by probes and capability implementations.

use std::fmt;
use std::sync::Arc;

use crate::core::cancel::CancelToken;
use crate::core::error::{ExecError, OperationError};
use crate::util::shell::{ShellCommand, ShellFlavor};

/// Opaque identity of a reachable target.
///
/// Two connections with equal identities are the same target as far as
/// capability resolution is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Arc<str>);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        ConnectionId(Arc::from(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something that can run commands on a target.
///
/// Implementations own the transport; callers only ever hand them a
/// [`ShellCommand`], which is rendered with the quoting rules of
/// [`Connection::flavor`].
pub trait Connection: Send + Sync {
    /// Identity used as the resolution cache key.
    fn identity(&self) -> ConnectionId;

    /// Whether the target's shell is the Windows kind.
    fn is_windows(&self) -> bool;

    /// Run a command and capture its standard output.
    fn exec_output(&self, cancel: &CancelToken, cmd: &ShellCommand) -> Result<String, ExecError>;

    /// Run a command, discarding its output.
    fn exec(&self, cancel: &CancelToken, cmd: &ShellCommand) -> Result<(), ExecError> {
        self.exec_output(cancel, cmd).map(|_| ())
    }

    /// Quoting rules for this target.
    fn flavor(&self) -> ShellFlavor {
        if self.is_windows() {
            ShellFlavor::Windows
        } else {
            ShellFlavor::Posix
        }
    }
}

/// Run one capability operation, wrapping failures with what was attempted.
pub fn run_operation(
    conn: &dyn Connection,
    cancel: &CancelToken,
    facility: &'static str,
    operation: &'static str,
    subject: &str,
    cmd: &ShellCommand,
) -> Result<(), OperationError> {
    tracing::debug!(
        "{} {} on {}: {}",
        facility,
        operation,
        conn.identity(),
        cmd.render(conn.flavor())
    );
    conn.exec(cancel, cmd)
        .map_err(|source| OperationError::new(operation, facility, subject, source))
}

/// Like [`run_operation`], returning the command's output.
pub fn capture_operation(
    conn: &dyn Connection,
    cancel: &CancelToken,
    facility: &'static str,
    operation: &'static str,
    subject: &str,
    cmd: &ShellCommand,
) -> Result<String, OperationError> {
    tracing::debug!(
        "{} {} on {}: {}",
        facility,
        operation,
        conn.identity(),
        cmd.render(conn.flavor())
    );
    conn.exec_output(cancel, cmd)
        .map_err(|source| OperationError::new(operation, facility, subject, source))
}
