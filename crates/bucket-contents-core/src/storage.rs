//! Flat bucket/object storage capability.
//!
//! This module defines the surface the contents engine requires from an
//! object storage backend. Backends expose only flat primitives:
//!
//! - container lifecycle (`list_containers`, `get_container`,
//!   `create_container`, `delete_container`),
//! - whole-object transfer (`get`, `download`, `upload`, `delete`),
//! - delimiter-grouped prefix listing (`list`),
//! - single-object `rename` within a container and `copy` across containers.
//!
//! There are no atomic multi-key operations and no native directory or
//! recursive rename; the [`crate::manager`] module synthesizes hierarchical
//! semantics from these primitives. The trait is async and object-safe so a
//! manager can be written once against `dyn ObjectStore` and pointed at any
//! backend.
//!
//! [`memory::MemoryStore`] is the in-process reference backend used by the
//! test suites and the CLI.

pub mod error;
pub mod memory;

pub use error::{BackendError, StorageError, StorageResult};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path;

/// Handle to an existing container (bucket).
///
/// Carries no live connection state; it is evidence that the container
/// existed at lookup time, suitable for memoization in
/// [`crate::cache::ContainerCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// The container id (bucket name).
    pub name: String,
}

impl Container {
    /// Create a handle for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Container { name: name.into() }
    }
}

/// Metadata handle for a stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectHandle {
    /// Container the object lives in.
    pub container: String,
    /// Object key within the container.
    pub key: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Content type reported by the backend, if any.
    pub content_type: Option<String>,
    /// Last-modified timestamp.
    pub updated: DateTime<Utc>,
}

impl ObjectHandle {
    /// Externally visible hierarchical path of this object
    /// (`container/key`).
    pub fn path(&self) -> String {
        path::object_path(&self.container, &self.key)
    }

    /// Display name: the last segment of the key.
    pub fn name(&self) -> &str {
        path::blob_name(&self.key)
    }
}

/// One level of a delimiter-grouped prefix listing.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Objects directly under the prefix.
    pub objects: Vec<ObjectHandle>,
    /// Full key prefixes of the next level down, each ending in the
    /// delimiter (for example `dir/sub/` when listing `dir/`).
    pub prefixes: Vec<String>,
}

impl Listing {
    /// True when neither objects nor sub-prefixes matched.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.prefixes.is_empty()
    }
}

/// Async capability trait for a flat object storage backend.
///
/// All operations address containers and keys by string id; failures are
/// reported through [`StorageError`] so callers can distinguish not-found,
/// forbidden, and bad-request conditions from backend faults.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List the ids of all visible containers.
    async fn list_containers(&self) -> StorageResult<Vec<String>>;

    /// Look up an existing container.
    ///
    /// Fails with [`StorageError::NotFound`] when the container does not
    /// exist, [`StorageError::Forbidden`] when access is denied, and
    /// [`StorageError::BadRequest`] when the id is not a valid container
    /// name.
    async fn get_container(&self, name: &str) -> StorageResult<Container>;

    /// Create a new container.
    async fn create_container(&self, name: &str) -> StorageResult<Container>;

    /// Delete a container together with everything in it.
    async fn delete_container(&self, name: &str) -> StorageResult<()>;

    /// Cheap existence probe for a single key.
    async fn exists(&self, container: &str, key: &str) -> StorageResult<bool>;

    /// Fetch the metadata handle of a single object, or `None` when the key
    /// does not exist.
    async fn get(&self, container: &str, key: &str) -> StorageResult<Option<ObjectHandle>>;

    /// Download the content bytes of an object.
    async fn download(&self, container: &str, key: &str) -> StorageResult<Bytes>;

    /// Upload `data` to `key`, replacing any previous object.
    async fn upload(
        &self,
        container: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<ObjectHandle>;

    /// Delete a single object.
    async fn delete(&self, container: &str, key: &str) -> StorageResult<()>;

    /// Delete several objects; not atomic, stops at the first failure.
    async fn delete_batch(&self, container: &str, keys: &[String]) -> StorageResult<()>;

    /// Delimiter-grouped prefix listing, bounded by `max_results` entries
    /// (objects plus sub-prefixes combined).
    ///
    /// Fails with [`StorageError::NotFound`] when the container has
    /// vanished since it was looked up.
    async fn list(
        &self,
        container: &str,
        prefix: &str,
        delimiter: Option<char>,
        max_results: usize,
    ) -> StorageResult<Listing>;

    /// Native single-object rename within one container.
    async fn rename(
        &self,
        container: &str,
        old_key: &str,
        new_key: &str,
    ) -> StorageResult<ObjectHandle>;

    /// Copy a single object, possibly across containers. The source is left
    /// in place.
    async fn copy(
        &self,
        src_container: &str,
        src_key: &str,
        dst_container: &str,
        dst_key: &str,
    ) -> StorageResult<ObjectHandle>;
}
