//! In-process reference backend.
//!
//! `MemoryStore` implements the full [`ObjectStore`] contract over nested
//! maps, including delimiter-grouped prefix listing with the same one-level
//! semantics real bucket stores provide. It backs the test suites, and the
//! CLI persists its whole state as a JSON snapshot between invocations.
//!
//! Containers can be marked denied with [`MemoryStore::deny`] to exercise
//! the forbidden-container path without a real backend.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use super::error::{
    BackendError, BackendSnafu, BadRequestSnafu, ForbiddenSnafu, NotFoundSnafu, StorageResult,
};
use super::{Container, Listing, ObjectHandle, ObjectStore};
use crate::path;

/// A stored object: payload plus the metadata the handle exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    data: Bytes,
    content_type: Option<String>,
    updated: DateTime<Utc>,
}

/// Snapshot-serializable store state: container id -> key -> record.
#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    containers: BTreeMap<String, BTreeMap<String, Record>>,
}

/// An [`ObjectStore`] living entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    denied: RwLock<HashSet<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a container as access-denied; `get_container` will fail with
    /// [`super::StorageError::Forbidden`] for it from now on.
    pub fn deny(&self, name: &str) {
        self.write_denied().insert(name.to_string());
    }

    /// Serialize the whole store state to a JSON snapshot.
    pub fn snapshot_json(&self) -> StorageResult<String> {
        serde_json::to_string_pretty(&*self.read_state())
            .map_err(BackendError::Encoding)
            .context(BackendSnafu { path: "<snapshot>" })
    }

    /// Rebuild a store from a JSON snapshot produced by
    /// [`MemoryStore::snapshot_json`].
    pub fn from_snapshot_json(snapshot: &str) -> StorageResult<Self> {
        let state: State = serde_json::from_str(snapshot)
            .map_err(BackendError::Encoding)
            .context(BackendSnafu { path: "<snapshot>" })?;
        Ok(MemoryStore {
            state: RwLock::new(state),
            denied: RwLock::new(HashSet::new()),
        })
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn write_denied(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<String>> {
        self.denied.write().unwrap_or_else(|e| e.into_inner())
    }

    fn is_denied(&self, name: &str) -> bool {
        self.denied
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(name)
    }
}

fn handle(container: &str, key: &str, record: &Record) -> ObjectHandle {
    ObjectHandle {
        container: container.to_string(),
        key: key.to_string(),
        size: record.data.len() as u64,
        content_type: record.content_type.clone(),
        updated: record.updated,
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_containers(&self) -> StorageResult<Vec<String>> {
        Ok(self.read_state().containers.keys().cloned().collect())
    }

    async fn get_container(&self, name: &str) -> StorageResult<Container> {
        if name.is_empty() {
            return BadRequestSnafu {
                path: name,
                message: "container name may not be empty",
            }
            .fail();
        }
        if self.is_denied(name) {
            return ForbiddenSnafu { path: name }.fail();
        }
        if self.read_state().containers.contains_key(name) {
            Ok(Container::new(name))
        } else {
            NotFoundSnafu { path: name }.fail()
        }
    }

    async fn create_container(&self, name: &str) -> StorageResult<Container> {
        if name.is_empty() || name.contains(path::DELIMITER) {
            return BadRequestSnafu {
                path: name,
                message: "invalid container name",
            }
            .fail();
        }
        let mut state = self.write_state();
        if state.containers.contains_key(name) {
            return BadRequestSnafu {
                path: name,
                message: "container already exists",
            }
            .fail();
        }
        state.containers.insert(name.to_string(), BTreeMap::new());
        Ok(Container::new(name))
    }

    async fn delete_container(&self, name: &str) -> StorageResult<()> {
        let mut state = self.write_state();
        match state.containers.remove(name) {
            Some(_) => Ok(()),
            None => NotFoundSnafu { path: name }.fail(),
        }
    }

    async fn exists(&self, container: &str, key: &str) -> StorageResult<bool> {
        let state = self.read_state();
        match state.containers.get(container) {
            Some(objects) => Ok(objects.contains_key(key)),
            None => NotFoundSnafu { path: container }.fail(),
        }
    }

    async fn get(&self, container: &str, key: &str) -> StorageResult<Option<ObjectHandle>> {
        let state = self.read_state();
        match state.containers.get(container) {
            Some(objects) => Ok(objects.get(key).map(|r| handle(container, key, r))),
            None => NotFoundSnafu { path: container }.fail(),
        }
    }

    async fn download(&self, container: &str, key: &str) -> StorageResult<Bytes> {
        let state = self.read_state();
        state
            .containers
            .get(container)
            .and_then(|objects| objects.get(key))
            .map(|r| r.data.clone())
            .ok_or_else(|| {
                NotFoundSnafu {
                    path: path::object_path(container, key),
                }
                .build()
            })
    }

    async fn upload(
        &self,
        container: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<ObjectHandle> {
        let mut state = self.write_state();
        let objects = state
            .containers
            .get_mut(container)
            .ok_or_else(|| NotFoundSnafu { path: container }.build())?;
        let record = Record {
            data,
            content_type: content_type.map(str::to_string),
            updated: Utc::now(),
        };
        let result = handle(container, key, &record);
        objects.insert(key.to_string(), record);
        Ok(result)
    }

    async fn delete(&self, container: &str, key: &str) -> StorageResult<()> {
        let mut state = self.write_state();
        let objects = state
            .containers
            .get_mut(container)
            .ok_or_else(|| NotFoundSnafu { path: container }.build())?;
        match objects.remove(key) {
            Some(_) => Ok(()),
            None => NotFoundSnafu {
                path: path::object_path(container, key),
            }
            .fail(),
        }
    }

    async fn delete_batch(&self, container: &str, keys: &[String]) -> StorageResult<()> {
        for key in keys {
            self.delete(container, key).await?;
        }
        Ok(())
    }

    async fn list(
        &self,
        container: &str,
        prefix: &str,
        delimiter: Option<char>,
        max_results: usize,
    ) -> StorageResult<Listing> {
        let state = self.read_state();
        let objects = state
            .containers
            .get(container)
            .ok_or_else(|| NotFoundSnafu { path: container }.build())?;

        let mut listing = Listing::default();
        let mut seen_prefixes = BTreeSet::new();
        for (key, record) in objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            if listing.objects.len() + listing.prefixes.len() >= max_results {
                break;
            }
            let rest = &key[prefix.len()..];
            match delimiter.and_then(|d| rest.find(d)) {
                Some(idx) => {
                    // Full key prefix including the trailing delimiter.
                    let group = &key[..prefix.len() + idx + 1];
                    if seen_prefixes.insert(group.to_string()) {
                        listing.prefixes.push(group.to_string());
                    }
                }
                None => listing.objects.push(handle(container, key, record)),
            }
        }
        Ok(listing)
    }

    async fn rename(
        &self,
        container: &str,
        old_key: &str,
        new_key: &str,
    ) -> StorageResult<ObjectHandle> {
        let mut state = self.write_state();
        let objects = state
            .containers
            .get_mut(container)
            .ok_or_else(|| NotFoundSnafu { path: container }.build())?;
        let record = objects.remove(old_key).ok_or_else(|| {
            NotFoundSnafu {
                path: path::object_path(container, old_key),
            }
            .build()
        })?;
        let result = handle(container, new_key, &record);
        objects.insert(new_key.to_string(), record);
        Ok(result)
    }

    async fn copy(
        &self,
        src_container: &str,
        src_key: &str,
        dst_container: &str,
        dst_key: &str,
    ) -> StorageResult<ObjectHandle> {
        let mut state = self.write_state();
        let record = state
            .containers
            .get(src_container)
            .and_then(|objects| objects.get(src_key))
            .cloned()
            .ok_or_else(|| {
                NotFoundSnafu {
                    path: path::object_path(src_container, src_key),
                }
                .build()
            })?;
        let objects = state
            .containers
            .get_mut(dst_container)
            .ok_or_else(|| NotFoundSnafu { path: dst_container }.build())?;
        let record = Record {
            updated: Utc::now(),
            ..record
        };
        let result = handle(dst_container, dst_key, &record);
        objects.insert(dst_key.to_string(), record);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    async fn store_with(objects: &[(&str, &str)]) -> StorageResult<MemoryStore> {
        let store = MemoryStore::new();
        store.create_container("bucket").await?;
        for (key, body) in objects {
            store
                .upload("bucket", key, Bytes::copy_from_slice(body.as_bytes()), None)
                .await?;
        }
        Ok(store)
    }

    #[tokio::test]
    async fn listing_groups_one_level_deep() -> TestResult {
        let store = store_with(&[
            ("dir/", ""),
            ("dir/a.txt", "a"),
            ("dir/b.txt", "b"),
            ("dir/sub/c.txt", "c"),
            ("dir/sub/deep/d.txt", "d"),
            ("other.txt", "o"),
        ])
        .await?;

        let listing = store.list("bucket", "dir/", Some('/'), 1024).await?;
        let keys: Vec<_> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["dir/", "dir/a.txt", "dir/b.txt"]);
        assert_eq!(listing.prefixes, vec!["dir/sub/".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn listing_respects_max_results() -> TestResult {
        let store = store_with(&[("dir/a", "a"), ("dir/b", "b"), ("dir/c", "c")]).await?;
        let listing = store.list("bucket", "dir/", Some('/'), 1).await?;
        assert_eq!(listing.objects.len() + listing.prefixes.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_container_is_not_found() -> TestResult {
        let store = MemoryStore::new();
        let err = store.list("ghost", "", Some('/'), 10).await.unwrap_err();
        assert!(err.is_not_found());
        let err = store.get_container("ghost").await.unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn denied_container_is_forbidden() -> TestResult {
        let store = MemoryStore::new();
        store.create_container("secret").await?;
        store.deny("secret");
        let err = store.get_container("secret").await.unwrap_err();
        assert!(matches!(err, StorageError::Forbidden { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn snapshot_round_trip_preserves_objects() -> TestResult {
        let store = store_with(&[("f.txt", "hello")]).await?;
        let snapshot = store.snapshot_json()?;
        let restored = MemoryStore::from_snapshot_json(&snapshot)?;
        let body = restored.download("bucket", "f.txt").await?;
        assert_eq!(&body[..], b"hello");
        Ok(())
    }

    #[tokio::test]
    async fn copy_goes_across_containers() -> TestResult {
        let store = store_with(&[("f.txt", "hello")]).await?;
        store.create_container("b2").await?;
        store.copy("bucket", "f.txt", "b2", "g.txt").await?;
        assert!(store.exists("b2", "g.txt").await?);
        assert!(store.exists("bucket", "f.txt").await?);
        Ok(())
    }
}
