//! Core error types for pkgquery-core

use thiserror::Error;

/// Errors that can occur while setting up the query service
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}
