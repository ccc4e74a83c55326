//! Error types shared by connections and capability implementations.

use thiserror::Error;

/// Failure while executing a command on a target.
///
/// `Failed` means the command ran and reported failure; every other variant
/// means the command could not be carried out at all.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("`{command}` exited with status {status}: {stderr}")]
    Failed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connection to {target} lost: {message}")]
    Disconnected { target: String, message: String },

    #[error("`{command}` was cancelled")]
    Cancelled { command: String },

    #[error("`{command}` timed out")]
    TimedOut { command: String },

    /// A value was refused before any command was built from it.
    #[error("invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },
}

impl ExecError {
    /// Whether the command never produced an exit status of its own.
    ///
    /// Probes treat a non-transport failure as "not applicable" and a
    /// transport failure as an error.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ExecError::Failed { .. })
    }

    /// Whether execution stopped because of a cancel or deadline.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ExecError::Cancelled { .. } | ExecError::TimedOut { .. }
        )
    }
}

/// A capability operation failed on the target.
#[derive(Debug, Error)]
#[error("failed to {operation} `{subject}` via {facility}: {source}")]
pub struct OperationError {
    /// Operation name, e.g. "start service"
    pub operation: &'static str,
    /// Facility that ran it, e.g. "systemd"
    pub facility: &'static str,
    /// Service or package the operation targeted
    pub subject: String,
    #[source]
    pub source: ExecError,
}

impl OperationError {
    pub fn new(
        operation: &'static str,
        facility: &'static str,
        subject: impl Into<String>,
        source: ExecError,
    ) -> Self {
        OperationError {
            operation,
            facility,
            subject: subject.into(),
            source,
        }
    }
}
