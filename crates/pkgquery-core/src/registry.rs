//! Package manager detection and ordering

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pkgquery_exec::CommandExecutor;
use pkgquery_pkg::{DpkgAdapter, PackageManagerAdapter, PacmanAdapter, RpmAdapter};
use tracing::{debug, info, instrument};

/// How a detected package manager relates to the running system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerRole {
    /// Native package manager of the running distribution
    Primary,
    /// Installed alongside the native one, only consulted as a fallback
    Secondary,
}

impl fmt::Display for ManagerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerRole::Primary => write!(f, "primary"),
            ManagerRole::Secondary => write!(f, "secondary"),
        }
    }
}

/// A detected package manager
#[derive(Clone)]
pub struct RegisteredManager {
    /// Adapter driving the package manager
    pub adapter: Arc<dyn PackageManagerAdapter>,
    /// Primary or secondary
    pub role: ManagerRole,
}

/// Detected package managers in query order: all primary managers in detection
/// order, followed by all secondary ones in detection order.
///
/// Built once; never modified afterwards.
#[derive(Clone, Default)]
pub struct ManagerRegistry {
    entries: Vec<RegisteredManager>,
}

impl ManagerRegistry {
    /// Classify `candidates` in the given order.
    ///
    /// Candidates that are neither primary nor available are dropped. Probe
    /// failures simply count as "not primary" / "not available".
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn detect(candidates: Vec<Arc<dyn PackageManagerAdapter>>) -> Self {
        info!("checking available supported package managers");

        let mut primary = Vec::new();
        let mut secondary = Vec::new();

        for adapter in candidates {
            if adapter.is_primary().await {
                info!(manager = adapter.name(), "found primary package manager");
                primary.push(RegisteredManager {
                    adapter,
                    role: ManagerRole::Primary,
                });
            } else if adapter.is_available().await {
                info!(manager = adapter.name(), "found secondary package manager");
                secondary.push(RegisteredManager {
                    adapter,
                    role: ManagerRole::Secondary,
                });
            } else {
                debug!(manager = adapter.name(), "package manager not available");
            }
        }

        primary.append(&mut secondary);
        let registry = Self { entries: primary };

        if registry.is_empty() {
            info!("no supported package manager found");
        } else {
            info!(managers = %registry.names().join(", "), "found package managers");
        }

        registry
    }

    /// Detect dpkg, rpm and pacman on the local system
    pub async fn detect_system(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        let candidates: Vec<Arc<dyn PackageManagerAdapter>> = vec![
            Arc::new(DpkgAdapter::new(executor.clone(), timeout)),
            Arc::new(RpmAdapter::new(executor.clone(), timeout)),
            Arc::new(PacmanAdapter::new(executor, timeout)),
        ];

        Self::detect(candidates).await
    }

    /// Registered managers in query order
    #[must_use]
    pub fn entries(&self) -> &[RegisteredManager] {
        &self.entries
    }

    /// Adapters in query order
    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn PackageManagerAdapter>> {
        self.entries.iter().map(|entry| &entry.adapter)
    }

    /// Names of the registered managers in query order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.adapters().map(|adapter| adapter.name()).collect()
    }

    /// No supported package manager was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of registered managers
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for ManagerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| format!("{} ({})", entry.adapter.name(), entry.role)),
            )
            .finish()
    }
}
