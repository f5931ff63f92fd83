//! Bounded cache of owner lookups

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Path was queried before; `None` means no package owns it
    Hit(Option<String>),
    /// Path was never queried, or its entry was evicted
    Miss,
}

/// Path to owning package map, evicting the least recently used entry once
/// `capacity` is reached. Negative answers are stored like positive ones.
#[derive(Debug)]
pub struct QueryCache {
    entries: Mutex<LruCache<PathBuf, Option<String>>>,
}

impl QueryCache {
    /// Create an empty cache holding at most `capacity` entries
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up `path`, marking it as recently used on a hit
    pub fn lookup(&self, path: &Path) -> CacheLookup {
        match self.lock().get(path) {
            Some(owner) => CacheLookup::Hit(owner.clone()),
            None => CacheLookup::Miss,
        }
    }

    /// Store the owner of `path` (`None` for "no owner")
    pub fn insert(&self, path: PathBuf, owner: Option<String>) {
        self.lock().put(path, owner);
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of entries
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<PathBuf, Option<String>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> QueryCache {
        QueryCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn test_lookup_and_insert() {
        let cache = cache(4);
        let path = Path::new("/bin/bash");

        assert_eq!(cache.lookup(path), CacheLookup::Miss);

        cache.insert(path.to_path_buf(), Some("bash".to_string()));
        assert_eq!(cache.lookup(path), CacheLookup::Hit(Some("bash".to_string())));
    }

    #[test]
    fn test_negative_entries_are_hits() {
        let cache = cache(4);
        cache.insert(PathBuf::from("/tmp/x"), None);

        assert_eq!(cache.lookup(Path::new("/tmp/x")), CacheLookup::Hit(None));
    }

    #[test]
    fn test_capacity_bound() {
        let cache = cache(3);

        for i in 0..10 {
            cache.insert(PathBuf::from(format!("/usr/bin/tool{i}")), None);
            assert!(cache.len() <= 3);
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.capacity(), 3);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = cache(2);
        cache.insert(PathBuf::from("/a"), Some("a".to_string()));
        cache.insert(PathBuf::from("/b"), Some("b".to_string()));

        // touch /a so /b becomes the eviction candidate
        assert!(matches!(cache.lookup(Path::new("/a")), CacheLookup::Hit(_)));
        cache.insert(PathBuf::from("/c"), Some("c".to_string()));

        assert_eq!(cache.lookup(Path::new("/b")), CacheLookup::Miss);
        assert!(matches!(cache.lookup(Path::new("/a")), CacheLookup::Hit(_)));
        assert!(matches!(cache.lookup(Path::new("/c")), CacheLookup::Hit(_)));
    }

    #[test]
    fn test_reinsert_does_not_grow() {
        let cache = cache(2);
        cache.insert(PathBuf::from("/a"), None);
        cache.insert(PathBuf::from("/a"), Some("a".to_string()));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(Path::new("/a")), CacheLookup::Hit(Some("a".to_string())));
    }
}
