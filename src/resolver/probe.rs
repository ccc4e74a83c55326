//! Probes and the presence checks they are built from.
//!
//! A probe answers one question about a connection: does this facility
//! apply here? It returns `Ok(Some(_))` with a ready implementation,
//! `Ok(None)` to decline, or `Err(_)` when the connection itself failed.
//! Checks are read-only; a missing file or command is a decline.

use std::fmt;
use std::sync::Arc;

use crate::core::cancel::CancelToken;
use crate::core::connection::Connection;
use crate::core::error::ExecError;
use crate::util::shell::ShellCommand;

/// What a single probe run produced.
pub type ProbeResult<T> = Result<Option<Arc<T>>, ExecError>;

type ProbeFn<T> = dyn Fn(&dyn Connection, &CancelToken) -> ProbeResult<T> + Send + Sync;

/// A named check-and-construct function for one facility.
pub struct Probe<T: ?Sized> {
    name: &'static str,
    check: Box<ProbeFn<T>>,
}

impl<T: ?Sized> Probe<T> {
    pub fn new<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&dyn Connection, &CancelToken) -> ProbeResult<T> + Send + Sync + 'static,
    {
        Probe {
            name,
            check: Box::new(check),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the check against a connection.
    pub fn run(&self, conn: &dyn Connection, cancel: &CancelToken) -> ProbeResult<T> {
        (self.check)(conn, cancel)
    }
}

impl<T: ?Sized> fmt::Debug for Probe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe").field("name", &self.name).finish()
    }
}

/// Run `cmd` and report whether it exited successfully.
///
/// Transport failures are returned as errors rather than `false`.
pub fn succeeds(
    conn: &dyn Connection,
    cancel: &CancelToken,
    cmd: &ShellCommand,
) -> Result<bool, ExecError> {
    match conn.exec(cancel, cmd) {
        Ok(()) => Ok(true),
        Err(err) if !err.is_transport() => {
            tracing::trace!("check `{}` declined: {}", cmd, err);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Whether `name` resolves to an executable on the target's PATH.
pub fn command_exists(
    conn: &dyn Connection,
    cancel: &CancelToken,
    name: &str,
) -> Result<bool, ExecError> {
    let cmd = if conn.is_windows() {
        ShellCommand::new("where").arg(name)
    } else {
        ShellCommand::new("command -v").arg(name)
    };
    succeeds(conn, cancel, &cmd)
}

/// Whether a regular file exists on the target.
pub fn file_exists(
    conn: &dyn Connection,
    cancel: &CancelToken,
    path: &str,
) -> Result<bool, ExecError> {
    let cmd = if conn.is_windows() {
        ShellCommand::new("if exist")
            .arg(path)
            .raw("(exit 0) else (exit 1)")
    } else {
        ShellCommand::new("test -f").arg(path)
    };
    succeeds(conn, cancel, &cmd)
}

/// Whether a directory exists on the target.
pub fn dir_exists(
    conn: &dyn Connection,
    cancel: &CancelToken,
    path: &str,
) -> Result<bool, ExecError> {
    let cmd = if conn.is_windows() {
        ShellCommand::new("if exist")
            .arg(format!("{}\\", path.trim_end_matches('\\')))
            .raw("(exit 0) else (exit 1)")
    } else {
        ShellCommand::new("test -d").arg(path)
    };
    succeeds(conn, cancel, &cmd)
}
