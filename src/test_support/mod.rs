//! Test utilities and mocks for outpost unit tests.
//!
//! The central piece is [`MockConnection`], a [`Connection`] whose commands
//! are answered from a list of expectations instead of a real shell. Every
//! rendered command is recorded so tests can assert on exactly what would
//! have been sent to the target.
//!
//! # Example
//!
//! ```rust,ignore
//! use outpost::test_support::{MockConnection, MockProcessOutput};
//!
//! let conn = MockConnection::new("mac-1");
//! conn.expect("test -f /System/Library/CoreServices/SystemVersion.plist", MockProcessOutput::success(""));
//! ```

use std::sync::Mutex;
use std::sync::PoisonError;

use crate::core::cancel::CancelToken;
use crate::core::connection::{Connection, ConnectionId};
use crate::core::error::ExecError;
use crate::util::shell::ShellCommand;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Transport fault to raise instead of producing output.
    pub fault: Option<String>,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            fault: None,
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
            fault: None,
        }
    }

    /// Simulate the connection dropping while the command runs.
    pub fn disconnected(message: impl Into<String>) -> Self {
        MockProcessOutput {
            status: -1,
            stdout: String::new(),
            stderr: String::new(),
            fault: Some(message.into()),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in [`MockConnection`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match using a regex pattern.
    Regex(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
    default_output: Option<MockProcessOutput>,
}

/// Scripted connection for tests.
///
/// Unmatched commands exit with status 127, which probes read as a decline.
#[derive(Debug)]
pub struct MockConnection {
    id: ConnectionId,
    windows: bool,
    state: Mutex<MockState>,
}

impl MockConnection {
    /// Create a POSIX-shell mock target with the given identity.
    pub fn new(id: &str) -> Self {
        MockConnection {
            id: ConnectionId::new(id),
            windows: false,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Make the target report a Windows shell.
    pub fn windows(mut self) -> Self {
        self.windows = true;
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::Exact(cmd.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ))
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&self, expectation: CommandExpectation) -> &Self {
        self.state().expectations.push(expectation);
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&self, output: MockProcessOutput) -> &Self {
        self.state().default_output = Some(output);
        self
    }

    /// Get all commands that were called, rendered for the target shell.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Clear all recorded calls.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<(), String> {
        for (i, exp) in self.state().expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    return Err(format!(
                        "expectation {} was used {} times, expected {}",
                        i, exp.used, expected
                    ));
                }
            }
        }
        Ok(())
    }

    fn respond(&self, line: &str) -> MockProcessOutput {
        let mut state = self.state();
        state.calls.push(line.to_string());

        for exp in &mut state.expectations {
            if exp.pattern.matches(line) && exp.available() {
                exp.used += 1;
                return exp.output.clone();
            }
        }

        state
            .default_output
            .clone()
            .unwrap_or_else(|| MockProcessOutput::failure(127, format!("unexpected command: {line}")))
    }
}

impl Connection for MockConnection {
    fn identity(&self) -> ConnectionId {
        self.id.clone()
    }

    fn is_windows(&self) -> bool {
        self.windows
    }

    fn exec_output(&self, cancel: &CancelToken, cmd: &ShellCommand) -> Result<String, ExecError> {
        let line = cmd.render(self.flavor());
        cancel.check(&line)?;

        let output = self.respond(&line);
        if let Some(message) = output.fault {
            return Err(ExecError::Disconnected {
                target: self.id.to_string(),
                message,
            });
        }
        if output.status != 0 {
            return Err(ExecError::Failed {
                command: line,
                status: output.status,
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }
}

/// Assertion helpers for testing.
pub mod assertions {
    /// Assert that a result is Ok and return the value.
    pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
        match result {
            Ok(v) => v,
            Err(e) => panic!("expected Ok, got Err: {:?}", e),
        }
    }

    /// Assert that a result is Err and return the error.
    pub fn assert_err<T: std::fmt::Debug, E>(result: Result<T, E>) -> E {
        match result {
            Ok(v) => panic!("expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    }

    /// Assert that an error message contains a substring.
    pub fn assert_error_contains<T: std::fmt::Debug, E: std::fmt::Display>(
        result: Result<T, E>,
        substring: &str,
    ) {
        match result {
            Ok(v) => panic!("expected Err containing '{}', got Ok: {:?}", substring, v),
            Err(e) => {
                let msg = e.to_string();
                assert!(
                    msg.contains(substring),
                    "error '{}' does not contain '{}'",
                    msg,
                    substring
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_connection_basic() {
        let conn = MockConnection::new("host-a");
        conn.expect("uname -s", MockProcessOutput::success("Darwin\n"));
        conn.expect_prefix("systemctl", MockProcessOutput::failure(1, "not found"));

        let cancel = CancelToken::new();
        let out = conn.exec_output(&cancel, &ShellCommand::new("uname -s")).unwrap();
        assert_eq!(out, "Darwin\n");

        let err = conn
            .exec(&cancel, &ShellCommand::new("systemctl start").arg("nginx"))
            .unwrap_err();
        assert!(matches!(err, ExecError::Failed { status: 1, .. }));

        assert_eq!(conn.calls(), vec!["uname -s", "systemctl start nginx"]);
    }

    #[test]
    fn test_mock_connection_unexpected_declines() {
        let conn = MockConnection::new("host-a");
        let err = conn
            .exec(&CancelToken::new(), &ShellCommand::new("unknown"))
            .unwrap_err();
        assert!(matches!(err, ExecError::Failed { status: 127, .. }));
    }

    #[test]
    fn test_mock_connection_fault() {
        let conn = MockConnection::new("host-a");
        conn.expect_contains("brew", MockProcessOutput::disconnected("reset"));

        let err = conn
            .exec(&CancelToken::new(), &ShellCommand::new("command -v brew"))
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_mock_connection_times_and_verify() {
        let conn = MockConnection::new("host-a");
        conn.expect_pattern(
            CommandExpectation::new(
                CommandPattern::Regex(r"^apk (add|del) ".to_string()),
                MockProcessOutput::success(""),
            )
            .times(1),
        );

        let cancel = CancelToken::new();
        assert!(conn.verify().is_err());
        conn.exec(&cancel, &ShellCommand::new("apk add").arg("curl"))
            .unwrap();
        assert!(conn.verify().is_ok());
        assert!(conn
            .exec(&cancel, &ShellCommand::new("apk add").arg("jq"))
            .is_err());
    }

    #[test]
    fn test_windows_mock_quotes_for_windows() {
        let conn = MockConnection::new("win-1").windows();
        conn.set_default(MockProcessOutput::success(""));
        conn.exec(&CancelToken::new(), &ShellCommand::new("sc.exe start").arg("My Service"))
            .unwrap();
        assert_eq!(conn.calls(), vec!["sc.exe start \"My Service\""]);
    }

    #[test]
    fn test_assertions() {
        use assertions::*;

        let ok_result: Result<i32, &str> = Ok(42);
        assert_eq!(assert_ok(ok_result), 42);

        let err_result: Result<i32, &str> = Err("error");
        assert_eq!(assert_err(err_result), "error");
    }
}
