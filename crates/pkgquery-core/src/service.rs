//! `PackageQueryService`: owner lookups across all detected package managers
//!
//! The service is a cheap handle; clones share the registry, the cache and the
//! worker limit. Construct it once at startup and hand clones to consumers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use pkgquery_exec::CommandExecutor;
use pkgquery_pkg::PackageRecord;
use tokio::sync::{OnceCell, Semaphore, SemaphorePermit, oneshot};
use tracing::{debug, instrument, warn};

use crate::cache::{CacheLookup, QueryCache};
use crate::config::ServiceConfig;
use crate::error::CoreError;
use crate::registry::ManagerRegistry;

type InFlight = HashMap<PathBuf, Arc<OnceCell<Option<String>>>>;

/// Query facade over the detected package managers.
///
/// Every query operation is total: failures of individual package managers
/// are logged and treated as "no answer" from that manager.
#[derive(Clone)]
pub struct PackageQueryService {
    registry: Arc<ManagerRegistry>,
    cache: Arc<QueryCache>,
    /// Owner lookups currently being dispatched, one per path
    in_flight: Arc<Mutex<InFlight>>,
    workers: Arc<Semaphore>,
}

impl PackageQueryService {
    /// Create a service over an already detected registry
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` if `config` is invalid
    pub fn new(config: &ServiceConfig, registry: ManagerRegistry) -> Result<Self, CoreError> {
        config.validate()?;

        Ok(Self {
            registry: Arc::new(registry),
            cache: Arc::new(QueryCache::new(config.cache_capacity()?)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            workers: Arc::new(Semaphore::new(config.max_workers)),
        })
    }

    /// Detect the package managers of the local system and create a service
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` if `config` is invalid
    pub async fn detect(
        config: &ServiceConfig,
        executor: Arc<dyn CommandExecutor>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let registry = ManagerRegistry::detect_system(executor, config.command_timeout()).await;
        Self::new(config, registry)
    }

    /// At least one supported package manager was detected
    #[must_use]
    pub fn found_supported_manager(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Detected package managers
    #[must_use]
    pub fn registry(&self) -> &ManagerRegistry {
        &self.registry
    }

    /// Owner lookup cache
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Package owning `path`, or `None` if no package does.
    ///
    /// Answers (including negative ones) are cached. Concurrent calls for the
    /// same path share a single dispatch.
    #[instrument(skip(self))]
    pub async fn owning_package(&self, path: &Path) -> Option<String> {
        if let CacheLookup::Hit(owner) = self.cache.lookup(path) {
            log_owner("cache", path, owner.as_deref());
            return owner;
        }

        let cell = {
            let mut in_flight = lock(&self.in_flight);
            // a dispatch may have finished since the first lookup
            if let CacheLookup::Hit(owner) = self.cache.lookup(path) {
                log_owner("cache", path, owner.as_deref());
                return owner;
            }
            in_flight.entry(path.to_path_buf()).or_default().clone()
        };

        let waiter = InFlightWaiter {
            in_flight: self.in_flight.as_ref(),
            path,
            cell,
        };

        waiter
            .cell
            .get_or_init(|| self.dispatch_owner(path))
            .await
            .clone()
    }

    /// Number of paths whose owner lookup is currently being dispatched
    #[must_use]
    pub fn pending_lookups(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Run [`PackageQueryService::owning_package`] on a tokio task.
    ///
    /// Dropping the returned handle abandons interest in the answer; the lookup
    /// itself keeps running and its result still lands in the cache. Must be
    /// called from within a tokio runtime.
    pub fn spawn_owning_package(&self, path: impl Into<PathBuf>) -> OwnerQuery {
        let path = path.into();
        let service = self.clone();
        let task_path = path.clone();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let owner = service.owning_package(&task_path).await;
            // receiver may be gone, that is fine
            let _ = tx.send(owner);
        });

        OwnerQuery { path, rx }
    }

    /// Installed packages of all detected managers, in registry order.
    ///
    /// Records are not de-duplicated across managers.
    #[instrument(skip(self))]
    pub async fn installed_packages(&self) -> Vec<PackageRecord> {
        let _permit = self.acquire_worker().await;
        let mut packages = Vec::new();

        for adapter in self.registry.adapters() {
            match adapter.installed_pkg().await {
                Ok(mut list) => packages.append(&mut list),
                Err(e) => warn!(manager = adapter.name(), error = %e, "listing installed packages failed"),
            }
        }

        debug!(count = packages.len(), "installed packages");
        packages
    }

    /// Files of package `pkg`: the first non-empty list any manager reports
    #[instrument(skip(self))]
    pub async fn file_list(&self, pkg: &str) -> Vec<PathBuf> {
        let _permit = self.acquire_worker().await;

        for adapter in self.registry.adapters() {
            match adapter.file_list(pkg).await {
                Ok(files) if !files.is_empty() => {
                    debug!(manager = adapter.name(), count = files.len(), "file list");
                    return files;
                }
                Ok(_) => {}
                Err(e) => warn!(manager = adapter.name(), error = %e, "file list query failed"),
            }
        }

        Vec::new()
    }

    /// Query the managers in registry order and cache the answer
    async fn dispatch_owner(&self, path: &Path) -> Option<String> {
        let owner = {
            let _permit = self.acquire_worker().await;
            self.query_managers(path).await
        };

        self.cache.insert(path.to_path_buf(), owner.clone());
        owner
    }

    async fn query_managers(&self, path: &Path) -> Option<String> {
        for adapter in self.registry.adapters() {
            match adapter.owning_pkg(path).await {
                Ok(Some(pkg)) => {
                    log_owner(adapter.name(), path, Some(&pkg));
                    return Some(pkg);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(manager = adapter.name(), path = %path.display(), error = %e, "owner query failed");
                }
            }
        }

        log_owner("all", path, None);
        None
    }

    async fn acquire_worker(&self) -> Option<SemaphorePermit<'_>> {
        // the semaphore is never closed
        self.workers.acquire().await.ok()
    }
}

/// Pending result of [`PackageQueryService::spawn_owning_package`]
#[derive(Debug)]
pub struct OwnerQuery {
    path: PathBuf,
    rx: oneshot::Receiver<Option<String>>,
}

impl OwnerQuery {
    /// Path being looked up
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the owning package
    pub async fn wait(self) -> Option<String> {
        self.rx.await.unwrap_or_default()
    }
}

/// One caller waiting on an in-flight lookup. The last waiter to go away,
/// whether finished or cancelled, removes the entry.
struct InFlightWaiter<'a> {
    in_flight: &'a Mutex<InFlight>,
    path: &'a Path,
    cell: Arc<OnceCell<Option<String>>>,
}

impl Drop for InFlightWaiter<'_> {
    fn drop(&mut self) {
        let mut in_flight = lock(self.in_flight);
        // one reference is held by the map, one by this waiter
        let last_waiter = in_flight.get(self.path).is_some_and(|current| {
            Arc::ptr_eq(current, &self.cell) && Arc::strong_count(current) <= 2
        });
        if last_waiter {
            in_flight.remove(self.path);
        }
    }
}

fn log_owner(found_by: &str, path: &Path, owner: Option<&str>) {
    match owner {
        Some(pkg) => debug!(found_by, pkg, path = %path.display(), "package owns path"),
        None => debug!(found_by, path = %path.display(), "no package owns path"),
    }
}

fn lock(in_flight: &Mutex<InFlight>) -> MutexGuard<'_, InFlight> {
    match in_flight.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
