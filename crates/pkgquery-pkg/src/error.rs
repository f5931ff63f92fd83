//! Error types for pkgquery-pkg

use std::time::Duration;

use pkgquery_exec::ExecError;
use thiserror::Error;

/// Errors that can occur during package queries
#[derive(Error, Debug, Clone)]
pub enum PackageError {
    /// Path cannot be passed to a package manager command
    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(String),

    /// Command timed out
    #[error("{manager} query timed out after {timeout:?}")]
    Timeout {
        /// Package manager that was queried
        manager: &'static str,
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Execution error from command executor
    #[error("execution error: {0}")]
    ExecutionError(String),
}

impl PackageError {
    /// Convert an executor error raised while querying `manager`
    pub(crate) fn from_exec(manager: &'static str, err: ExecError) -> Self {
        match err {
            ExecError::Timeout { timeout } => PackageError::Timeout { manager, timeout },
            other => PackageError::ExecutionError(format!("{manager}: {other}")),
        }
    }

    /// Check if error is a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, PackageError::Timeout { .. })
    }
}
