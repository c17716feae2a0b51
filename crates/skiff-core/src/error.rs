//! Error types for scanning operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the scanning engine.
///
/// Cloneable so a failure stored inside a scanner can be re-raised from
/// every later `wait` call; I/O failures therefore carry the rendered
/// message rather than the live `std::io::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// A blocking wait ran out of time. Never changes scan state.
    #[error("Wait timed out")]
    Timeout,

    /// The scan observed its cancellation flag.
    #[error("Scan cancelled")]
    Cancelled,

    /// Operation not valid in the scanner's current state.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// A requested backend is not available on this system.
    #[error("Backend unavailable: {name}")]
    BackendUnavailable { name: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ScanError {
    /// Create an I/O error with path context, classifying the common kinds.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io {
                path,
                message: source.to_string(),
            },
        }
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a catch-all error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_classification() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, ScanError::NotFound { .. }));

        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::PermissionDenied { .. }));

        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe"),
        );
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err = ScanError::io(
            "/p",
            std::io::Error::new(std::io::ErrorKind::Interrupted, "intr"),
        );
        assert_eq!(err.clone(), err);
    }
}
