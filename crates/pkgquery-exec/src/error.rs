//! Error types for pkgquery-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running an external command
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error during execution
    #[error("I/O error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExecError::Timeout {
            timeout: Duration::from_secs(1),
        };
        assert_eq!(err.to_string(), "command timed out after 1s");

        let err = ExecError::SpawnError("missing".to_string());
        assert_eq!(err.to_string(), "failed to spawn process: missing");
    }
}
