//! pacman package manager (Arch/Manjaro)

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use pkgquery_exec::CommandExecutor;
use regex::Regex;
use tracing::{debug, error, instrument, warn};

use crate::command::{QueryRunner, path_arg};
use crate::error::PackageError;
use crate::traits::PackageManagerAdapter;
use crate::types::{PackageManagerKind, PackageRecord};

const PACMAN: &str = "/usr/bin/pacman";
const OWNED_BY: &str = "is owned by ";
const NOT_OWNED: &str = "No package owns";

static PRIMARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(".*is owned by pacman.*").expect("static regex is valid"));

/// pacman adapter
pub struct PacmanAdapter {
    runner: QueryRunner,
}

impl PacmanAdapter {
    /// Create a new pacman adapter
    pub fn new(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self {
            runner: QueryRunner::new(executor, timeout),
        }
    }

    /// Parse `pacman -Qo` output
    ///
    /// Example: `/usr/bin/pacman is owned by pacman 6.0.2-7`. The path may
    /// contain blanks, so everything up to the marker is dropped instead of
    /// counting fields.
    fn parse_owner(output: &str) -> Option<String> {
        let idx = output.rfind(OWNED_BY)?;
        output[idx + OWNED_BY.len()..]
            .split_whitespace()
            .next()
            .map(str::to_string)
    }

    /// Parse `pacman -Q` output (`name version`)
    fn parse_pkg_list(output: &str) -> Vec<PackageRecord> {
        let mut packages = Vec::new();

        for line in output.lines() {
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(' ').collect();
            if let [name, version] = fields.as_slice() {
                packages.push(PackageRecord::new(*name, *version, ""));
            } else {
                error!(manager = "pacman", line, "invalid package list line");
            }
        }

        packages
    }

    /// Parse `pacman -Qlq` output, dropping directories
    fn parse_file_list(output: &str) -> Vec<PathBuf> {
        output
            .lines()
            .filter(|line| line.starts_with('/') && !line.ends_with('/'))
            .map(PathBuf::from)
            .collect()
    }
}

#[async_trait]
impl PackageManagerAdapter for PacmanAdapter {
    fn kind(&self) -> PackageManagerKind {
        PackageManagerKind::Pacman
    }

    async fn is_available(&self) -> bool {
        self.runner.executor().have_command(PACMAN)
    }

    async fn is_primary(&self) -> bool {
        self.runner
            .executor()
            .probe(PACMAN, &["-Qo", PACMAN], &PRIMARY_PATTERN, self.runner.timeout())
            .await
    }

    #[instrument(skip(self))]
    async fn owning_pkg(&self, path: &Path) -> Result<Option<String>, PackageError> {
        let result = self
            .runner
            .run("pacman", PACMAN, &["-Qo", path_arg(path)?])
            .await?;

        if !result.success() || result.combined_output().contains(NOT_OWNED) {
            return Ok(None);
        }

        Ok(Self::parse_owner(&result.stdout))
    }

    #[instrument(skip(self))]
    async fn installed_pkg(&self) -> Result<Vec<PackageRecord>, PackageError> {
        let result = self.runner.run("pacman", PACMAN, &["-Q"]).await?;

        if !result.success() {
            warn!(status = result.status, stderr = %result.stderr.trim(), "pacman -Q failed");
            return Ok(Vec::new());
        }

        let packages = Self::parse_pkg_list(&result.stdout);
        debug!(count = packages.len(), "pacman installed packages");

        Ok(packages)
    }

    #[instrument(skip(self))]
    async fn file_list(&self, pkg: &str) -> Result<Vec<PathBuf>, PackageError> {
        let result = self.runner.run("pacman", PACMAN, &["-Qlq", pkg]).await?;

        if !result.success() {
            return Ok(Vec::new());
        }

        Ok(Self::parse_file_list(&result.stdout))
    }
}
