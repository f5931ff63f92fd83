//! Query service configuration

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::CoreError;

/// Settings for the package query service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Maximum number of cached path lookups
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Maximum number of package manager commands running at the same time
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Upper bound for a single package manager command, in seconds
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

fn default_cache_capacity() -> usize {
    500
}

fn default_max_workers() -> usize {
    4
}

fn default_command_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            max_workers: default_max_workers(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Check that all limits are usable
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` if any limit is zero
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.cache_capacity == 0 {
            return Err(CoreError::ConfigError(
                "cache_capacity must be greater than zero".to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(CoreError::ConfigError(
                "max_workers must be greater than zero".to_string(),
            ));
        }
        if self.max_workers > Semaphore::MAX_PERMITS {
            return Err(CoreError::ConfigError(format!(
                "max_workers must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.command_timeout_secs == 0 {
            return Err(CoreError::ConfigError(
                "command_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Cache capacity as a non-zero count
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` if the capacity is zero
    pub fn cache_capacity(&self) -> Result<NonZeroUsize, CoreError> {
        NonZeroUsize::new(self.cache_capacity).ok_or_else(|| {
            CoreError::ConfigError("cache_capacity must be greater than zero".to_string())
        })
    }

    /// Per-command timeout
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();

        assert_eq!(config.cache_capacity, 500);
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ServiceConfig = toml::from_str("cache_capacity = 10").unwrap();

        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.max_workers, 4);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = ServiceConfig {
            max_workers: 0,
            ..ServiceConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::ConfigError(_))));

        let config = ServiceConfig {
            cache_capacity: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(config.cache_capacity().is_err());
    }
}
