//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use crate::core::cancel::CancelToken;
use crate::core::error::ExecError;

/// How often a running child is checked against its cancel token.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
enum Arg {
    /// Escaped by the standard library when the command line is built.
    Escaped(String),
    /// Appended to the Windows command line exactly as given.
    Raw(String),
}

impl Arg {
    fn as_str(&self) -> &str {
        match self {
            Arg::Escaped(arg) | Arg::Raw(arg) => arg,
        }
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<Arg>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args
            .push(Arg::Escaped(arg.as_ref().to_string_lossy().into_owned()));
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| Arg::Escaped(s.as_ref().to_string_lossy().into_owned())),
        );
        self
    }

    /// Add an argument that bypasses argument escaping on Windows.
    ///
    /// `cmd /C` parses the rest of its command line itself, so a line that
    /// is already quoted for cmd must reach it unchanged. Elsewhere this is
    /// the same as [`ProcessBuilder::arg`].
    pub fn raw_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Raw(arg.into()));
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            match arg {
                Arg::Escaped(arg) => {
                    cmd.arg(arg);
                }
                Arg::Raw(arg) => push_raw(&mut cmd, arg),
            }
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Execute and wait, stopping early if `cancel` fires.
    ///
    /// The child is killed when the token is cancelled or its deadline
    /// passes. A non-zero exit is returned as an `Output`, not an error.
    pub fn exec(&self, cancel: &CancelToken) -> Result<Output, ExecError> {
        let command = self.display_command();
        cancel.check(&command)?;

        let mut child = self
            .build_command()
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    kill(&mut child);
                    return Err(ExecError::Io { command, source });
                }
            }
            if let Err(err) = cancel.check(&command) {
                tracing::debug!("terminating `{}`: {}", command, err);
                kill(&mut child);
                return Err(err);
            }
            thread::sleep(POLL_INTERVAL);
        };

        Ok(Output {
            status,
            stdout: join(stdout),
            stderr: join(stderr),
        })
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|arg| arg.as_str().to_string()));
        parts.join(" ")
    }
}

#[cfg(windows)]
fn push_raw(cmd: &mut Command, arg: &str) {
    use std::os::windows::process::CommandExt;
    cmd.raw_arg(arg);
}

#[cfg(not(windows))]
fn push_raw(cmd: &mut Command, arg: &str) {
    cmd.arg(arg);
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            // A read error just truncates captured output.
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
