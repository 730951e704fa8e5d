//! Memoization of container lookups.
//!
//! Looking a container up on every operation costs a network round trip, so
//! the manager memoizes successful lookups here. The cache is an explicitly
//! owned object with an explicit eviction API rather than implicit shared
//! state:
//!
//! - only successful lookups populate it; a "not found" answer is never
//!   cached, so repeated probes of a missing container keep round-tripping,
//! - entries are evicted eagerly when a container is deleted or a listing
//!   discovers it has vanished,
//! - a disabled cache stores nothing and every lookup misses.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::storage::Container;

/// Cache of container handles keyed by container id.
#[derive(Debug)]
pub struct ContainerCache {
    enabled: bool,
    entries: Mutex<HashMap<String, Container>>,
}

impl ContainerCache {
    /// Create a cache; when `enabled` is false it never stores anything.
    pub fn new(enabled: bool) -> Self {
        ContainerCache {
            enabled,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Whether caching is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Return the cached handle for `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<Container> {
        if !self.enabled {
            return None;
        }
        self.lock().get(name).cloned()
    }

    /// Remember a successful lookup.
    pub fn insert(&self, container: Container) {
        if !self.enabled {
            return;
        }
        self.lock().insert(container.name.clone(), container);
    }

    /// Drop the entry for `name`, if present.
    pub fn evict(&self, name: &str) {
        self.lock().remove(name);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Container>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = ContainerCache::new(false);
        cache.insert(Container::new("b"));
        assert!(cache.lookup("b").is_none());
    }

    #[test]
    fn insert_lookup_evict() {
        let cache = ContainerCache::new(true);
        assert!(cache.lookup("b").is_none());
        cache.insert(Container::new("b"));
        assert_eq!(cache.lookup("b"), Some(Container::new("b")));
        cache.evict("b");
        assert!(cache.lookup("b").is_none());
    }
}
