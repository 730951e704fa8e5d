//! Existence and listing engine.
//!
//! `fetch` is the central primitive: given a path it determines whether the
//! path denotes a file, a directory (real or synthesized from a key
//! prefix), the root, or nothing, and optionally returns the payload needed
//! to build a model. Every other operation composes it.

use crate::error::ContentsError;
use crate::error::ContentsResult;
use crate::manager::ContentsManager;
use crate::path;
use crate::storage::{ObjectHandle, ObjectStore};

/// Direct members of a directory: child objects and child sub-prefixes.
#[derive(Debug, Clone, Default)]
pub struct DirEntries {
    /// Objects directly under the directory (the directory's own marker may
    /// be among them; model building excludes it).
    pub objects: Vec<ObjectHandle>,
    /// Full child prefixes relative to the container root, trailing
    /// delimiter stripped (`dir/sub` for a child of `dir/`). For the root
    /// listing these are container ids.
    pub prefixes: Vec<String>,
}

/// What a path turned out to denote.
#[derive(Debug)]
pub enum Fetched {
    /// Nothing exists at the path.
    Missing,
    /// The container exists but is inaccessible; the path exists but is
    /// opaque and no payload is available.
    Opaque,
    /// The path exists; content was not requested so no payload was built.
    Present,
    /// The path denotes an object.
    File(ObjectHandle),
    /// The path denotes a directory with these direct members.
    Dir(DirEntries),
    /// The empty path: the root listing of all container ids.
    Root(Vec<String>),
}

impl Fetched {
    /// Whether the path exists in any form.
    pub fn exists(&self) -> bool {
        !matches!(self, Fetched::Missing)
    }
}

impl<S: ObjectStore> ContentsManager<S> {
    /// Determine what `path` denotes; see [`Fetched`].
    ///
    /// `want_content` selects between a full payload and the cheapest
    /// possible existence determination (a single-entry listing or a bare
    /// probe). A backend "forbidden" while resolving the container is
    /// reinterpreted as [`Fetched::Opaque`], never an error. A "not found"
    /// while probing or listing inside the container means it vanished after
    /// it was cached; the cache entry is evicted and the path reported
    /// missing.
    pub(crate) async fn fetch(&self, path: &str, want_content: bool) -> ContentsResult<Fetched> {
        if path.is_empty() {
            if !want_content {
                return Ok(Fetched::Present);
            }
            let containers = self.store.list_containers().await?;
            return Ok(Fetched::Root(containers));
        }

        let (container_id, key) = path::split_path(path);
        let container = match self.container(container_id).await {
            Ok(Some(container)) => container,
            Ok(None) => return Ok(Fetched::Missing),
            Err(ContentsError::Storage { source }) if source.is_forbidden() => {
                return Ok(Fetched::Opaque);
            }
            Err(e) => return Err(e),
        };

        if key.is_empty() || key.ends_with(path::DELIMITER) {
            if !key.is_empty() {
                let marker_exists = match self.store.exists(&container.name, key).await {
                    Ok(found) => found,
                    Err(e) if e.is_not_found() => {
                        self.cache.evict(&container.name);
                        return Ok(Fetched::Missing);
                    }
                    Err(e) => return Err(e.into()),
                };
                if marker_exists && !want_content {
                    return Ok(Fetched::Present);
                }
            }
            // The marker object may not exist while the key is still a
            // prefix of other keys; the listing decides.
            let max_results = if want_content {
                self.config.max_list_size
            } else {
                1
            };
            let listing = match self
                .store
                .list(&container.name, key, Some(path::DELIMITER), max_results)
                .await
            {
                Ok(listing) => listing,
                Err(e) if e.is_not_found() => {
                    self.cache.evict(&container.name);
                    return Ok(Fetched::Missing);
                }
                Err(e) => return Err(e.into()),
            };
            // A container root exists as a directory as soon as the
            // container itself does, even when empty.
            if listing.is_empty() && !key.is_empty() {
                return Ok(Fetched::Missing);
            }
            if !want_content {
                return Ok(Fetched::Present);
            }
            let prefixes = listing
                .prefixes
                .into_iter()
                .map(|p| p.trim_end_matches(path::DELIMITER).to_string())
                .collect();
            return Ok(Fetched::Dir(DirEntries {
                objects: listing.objects,
                prefixes,
            }));
        }

        if !want_content {
            return match self.store.exists(&container.name, key).await {
                Ok(true) => Ok(Fetched::Present),
                Ok(false) => Ok(Fetched::Missing),
                Err(e) if e.is_not_found() => {
                    self.cache.evict(&container.name);
                    Ok(Fetched::Missing)
                }
                Err(e) => Err(e.into()),
            };
        }
        match self.store.get(&container.name, key).await {
            Ok(Some(obj)) => Ok(Fetched::File(obj)),
            Ok(None) => Ok(Fetched::Missing),
            Err(e) if e.is_not_found() => {
                self.cache.evict(&container.name);
                Ok(Fetched::Missing)
            }
            Err(e) => Err(e.into()),
        }
    }
}
