//! Cooperative cancellation for command execution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::error::ExecError;

/// Cancellation flag plus an optional deadline.
///
/// Clones share the flag, so cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that never expires unless cancelled.
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// A token that expires `timeout` from now.
    ///
    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        CancelToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Return an error if `command` must not start or continue.
    pub fn check(&self, command: &str) -> Result<(), ExecError> {
        if self.is_cancelled() {
            return Err(ExecError::Cancelled {
                command: command.to_string(),
            });
        }
        if self.is_expired() {
            return Err(ExecError::TimedOut {
                command: command.to_string(),
            });
        }
        Ok(())
    }
}
