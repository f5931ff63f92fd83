//! Configuration loading and types

use std::path::{Path, PathBuf};

use pkgquery_core::ServiceConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the pkgquery binary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Query service settings
    #[serde(default)]
    pub query: ServiceConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid configuration
    pub fn parse(content: &str) -> eyre::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.query.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, the default paths, or use defaults.
    ///
    /// Also returns the file the configuration came from, if any.
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be loaded
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        if let Ok(path) = std::env::var("PKGQUERY_CONFIG") {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, Some(path)));
        }

        let mut paths = vec![
            PathBuf::from("pkgquery.toml"),
            PathBuf::from("/etc/pkgquery/pkgquery.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("pkgquery/pkgquery.toml"));
        }

        for path in paths {
            if path.exists() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        Ok((Config::default(), None))
    }
}
