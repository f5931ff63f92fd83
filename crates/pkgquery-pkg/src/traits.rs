//! Package manager adapter trait

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::PackageError;
use crate::types::{PackageManagerKind, PackageRecord};

/// Query capabilities of one native package manager.
///
/// `Ok(None)` from [`PackageManagerAdapter::owning_pkg`] means the manager
/// answered and no package owns the path. Errors mean the manager could not be
/// asked at all (spawn failure, timeout, unusable path).
#[async_trait]
pub trait PackageManagerAdapter: Send + Sync {
    /// Which package manager this adapter drives
    fn kind(&self) -> PackageManagerKind;

    /// Name for log output
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// The package manager binary is installed
    async fn is_available(&self) -> bool;

    /// The package manager owns its own binary, i.e. it is the native manager
    /// of the running system
    async fn is_primary(&self) -> bool;

    /// Package owning `path`, if any
    async fn owning_pkg(&self, path: &Path) -> Result<Option<String>, PackageError>;

    /// All installed packages
    async fn installed_pkg(&self) -> Result<Vec<PackageRecord>, PackageError>;

    /// Files installed by package `pkg`
    async fn file_list(&self, pkg: &str) -> Result<Vec<PathBuf>, PackageError>;
}
