//! Connection to the machine outpost is running on.

use std::path::PathBuf;

use crate::core::cancel::CancelToken;
use crate::core::connection::{Connection, ConnectionId};
use crate::core::error::ExecError;
use crate::util::process::{find_executable, ProcessBuilder};
use crate::util::shell::{ShellCommand, ShellFlavor};

/// Identity shared by every local connection in a process.
pub const LOCAL_IDENTITY: &str = "local";

/// Runs commands through the host shell (`sh -c` or `cmd /C`).
#[derive(Debug, Clone)]
pub struct LocalConnection {
    shell: PathBuf,
    windows: bool,
}

impl LocalConnection {
    /// Create a connection using the host's default shell.
    pub fn new() -> Self {
        let windows = cfg!(windows);
        let shell = if windows {
            find_executable("cmd").unwrap_or_else(|| PathBuf::from("cmd.exe"))
        } else {
            find_executable("sh").unwrap_or_else(|| PathBuf::from("/bin/sh"))
        };
        LocalConnection { shell, windows }
    }
}

impl Default for LocalConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for LocalConnection {
    fn identity(&self) -> ConnectionId {
        ConnectionId::new(LOCAL_IDENTITY)
    }

    fn is_windows(&self) -> bool {
        self.windows
    }

    fn exec_output(&self, cancel: &CancelToken, cmd: &ShellCommand) -> Result<String, ExecError> {
        let line = cmd.render(self.flavor());
        let switch = match self.flavor() {
            ShellFlavor::Posix => "-c",
            ShellFlavor::Windows => "/C",
        };

        tracing::trace!("local exec: {}", line);
        // The line is already quoted for the target shell.
        let output = ProcessBuilder::new(&self.shell)
            .arg(switch)
            .raw_arg(line.as_str())
            .exec(cancel)?;

        if !output.status.success() {
            return Err(ExecError::Failed {
                command: line,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_local_identity_is_stable() {
        assert_eq!(LocalConnection::new().identity(), LocalConnection::new().identity());
    }

    #[test]
    fn test_exec_output_captures_stdout() {
        let conn = LocalConnection::new();
        let out = conn
            .exec_output(&CancelToken::new(), &ShellCommand::new("echo").arg("hello world"))
            .unwrap();
        assert_eq!(out.trim(), "hello world");
    }

    #[test]
    fn test_quoted_value_is_not_interpreted() {
        let conn = LocalConnection::new();
        let out = conn
            .exec_output(&CancelToken::new(), &ShellCommand::new("echo").arg("$HOME; false"))
            .unwrap();
        assert_eq!(out.trim(), "$HOME; false");
    }

    #[test]
    fn test_nonzero_exit_is_failed() {
        let conn = LocalConnection::new();
        let err = conn
            .exec(&CancelToken::new(), &ShellCommand::new("test -f").arg("/nonexistent/outpost"))
            .unwrap_err();
        assert!(matches!(err, ExecError::Failed { status: 1, .. }));
        assert!(!err.is_transport());
    }
}
