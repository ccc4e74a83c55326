//! Resolution error types.

use thiserror::Error;

use crate::core::error::ExecError;

/// Failure to resolve a capability for a connection.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every registered probe declined.
    #[error("{message}")]
    NotFound {
        kind: &'static str,
        message: &'static str,
    },

    /// A probe could not finish its check.
    #[error("{kind} probe `{probe}` failed: {source}")]
    Probe {
        kind: &'static str,
        probe: &'static str,
        #[source]
        source: ExecError,
    },
}

impl ResolveError {
    /// Whether the target simply has no supported facility of this kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }

    /// The capability kind that failed to resolve.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NotFound { kind, .. } | ResolveError::Probe { kind, .. } => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ResolveError::NotFound {
            kind: "init system",
            message: "no supported init system found",
        };
        assert!(err.is_not_found());
        assert_eq!(err.kind(), "init system");
        assert_eq!(err.to_string(), "no supported init system found");
    }

    #[test]
    fn test_probe_error_display() {
        let err = ResolveError::Probe {
            kind: "package manager",
            probe: "apt",
            source: ExecError::Disconnected {
                target: "db-1".to_string(),
                message: "connection reset".to_string(),
            },
        };
        assert!(!err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("apt"));
        assert!(msg.contains("connection reset"));
    }
}
