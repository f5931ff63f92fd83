//! dpkg package manager (Debian/Ubuntu)

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use pkgquery_exec::CommandExecutor;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::command::{QueryRunner, parse_name_arch_version, path_arg};
use crate::error::PackageError;
use crate::traits::PackageManagerAdapter;
use crate::types::{PackageManagerKind, PackageRecord};

const DPKG: &str = "/usr/bin/dpkg";
const DPKG_QUERY: &str = "/usr/bin/dpkg-query";
const SHOW_FORMAT: &str = "--showformat=${Package} ${Architecture} ${Version}\n";
const NOT_OWNED: &str = "no path found matching pattern";

static PRIMARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^dpkg:.*").expect("static regex is valid"));

/// dpkg adapter
pub struct DpkgAdapter {
    runner: QueryRunner,
}

impl DpkgAdapter {
    /// Create a new dpkg adapter
    ///
    /// # Arguments
    /// * `executor` - Command executor for running dpkg
    /// * `timeout` - Upper bound for each dpkg invocation
    pub fn new(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self {
            runner: QueryRunner::new(executor, timeout),
        }
    }

    /// Parse `dpkg -S` output
    ///
    /// Example: `bash: /bin/bash`, or `libc6:amd64: /lib/x86_64-linux-gnu/libc.so.6`
    /// for multiarch packages. Diversion notices may precede the owner line.
    fn parse_owner(output: &str) -> Option<String> {
        output
            .lines()
            .find(|line| !line.is_empty() && !line.starts_with("diversion by "))
            .and_then(|line| line.split_once(':'))
            .map(|(pkg, _)| pkg.trim().to_string())
            .filter(|pkg| !pkg.is_empty())
    }

    /// Parse `dpkg-query --show` output in `name arch version` format
    fn parse_pkg_list(output: &str) -> Vec<PackageRecord> {
        parse_name_arch_version("dpkg", output)
    }
}

#[async_trait]
impl PackageManagerAdapter for DpkgAdapter {
    fn kind(&self) -> PackageManagerKind {
        PackageManagerKind::Dpkg
    }

    async fn is_available(&self) -> bool {
        self.runner.executor().have_command(DPKG)
    }

    async fn is_primary(&self) -> bool {
        self.runner
            .executor()
            .probe(DPKG, &["-S", DPKG], &PRIMARY_PATTERN, self.runner.timeout())
            .await
    }

    #[instrument(skip(self))]
    async fn owning_pkg(&self, path: &Path) -> Result<Option<String>, PackageError> {
        let result = self.runner.run("dpkg", DPKG, &["-S", path_arg(path)?]).await?;

        if !result.success() || result.combined_output().contains(NOT_OWNED) {
            return Ok(None);
        }

        Ok(Self::parse_owner(&result.stdout))
    }

    #[instrument(skip(self))]
    async fn installed_pkg(&self) -> Result<Vec<PackageRecord>, PackageError> {
        let result = self
            .runner
            .run("dpkg", DPKG_QUERY, &["--show", SHOW_FORMAT])
            .await?;

        if !result.success() {
            warn!(status = result.status, stderr = %result.stderr.trim(), "dpkg-query failed");
            return Ok(Vec::new());
        }

        let packages = Self::parse_pkg_list(&result.stdout);
        debug!(count = packages.len(), "dpkg installed packages");

        Ok(packages)
    }

    async fn file_list(&self, pkg: &str) -> Result<Vec<PathBuf>, PackageError> {
        // TODO: list files via `dpkg-query --listfiles`, filtering out directories
        debug!(pkg, "dpkg file list not supported");
        Ok(Vec::new())
    }
}
