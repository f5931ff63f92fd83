//! Shared helpers for running package manager commands

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pkgquery_exec::{CommandExecutor, CommandResult};

use crate::error::PackageError;
use crate::types::PackageRecord;

/// Executor plus the per-call timeout every adapter query is bounded by
#[derive(Clone)]
pub(crate) struct QueryRunner {
    executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
}

impl QueryRunner {
    pub(crate) fn new(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self { executor, timeout }
    }

    pub(crate) fn executor(&self) -> &dyn CommandExecutor {
        self.executor.as_ref()
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a query command for `manager`, mapping executor failures
    pub(crate) async fn run(
        &self,
        manager: &'static str,
        program: &str,
        args: &[&str],
    ) -> Result<CommandResult, PackageError> {
        self.executor
            .run_with_timeout(program, args, self.timeout)
            .await
            .map_err(|e| PackageError::from_exec(manager, e))
    }
}

/// Borrow `path` as a command argument
pub(crate) fn path_arg(path: &Path) -> Result<&str, PackageError> {
    path.to_str()
        .ok_or_else(|| PackageError::InvalidPath(path.display().to_string()))
}

/// Split `name arch version` style listing lines into records.
///
/// Fields are separated by single blanks and empty fields are kept, so a record
/// with an empty architecture is still well-formed. Lines with a different
/// field count are logged and skipped.
pub(crate) fn parse_name_arch_version(
    manager: &'static str,
    output: &str,
) -> Vec<PackageRecord> {
    let mut packages = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(' ').collect();
        if let [name, arch, version] = fields.as_slice() {
            packages.push(PackageRecord::new(*name, *version, *arch));
        } else {
            tracing::error!(manager, line, "invalid package list line");
        }
    }

    packages
}
