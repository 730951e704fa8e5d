//! The contents manager: hierarchical semantics over flat object storage.
//!
//! This module owns the engine that makes a bucket/object backend look like
//! a POSIX-ish tree of files, notebooks, and directories:
//!
//! - The FETCH engine ([`fetch`]) decides what a path denotes: a file, a
//!   real or synthesized directory, the root listing, an opaque (forbidden)
//!   container, or nothing. Every other operation composes it.
//! - Model builders ([`models`]) turn object handles and listings into
//!   [`ContentModel`] values, including content decoding.
//! - The mutation engine ([`save`], [`mutate`]) implements save, delete and
//!   rename as sequences of non-transactional object operations. Multi-key
//!   operations have NO atomicity: a failure partway through a directory
//!   delete or rename leaves a partially-applied result, and callers should
//!   verify afterwards.
//! - The checkpoint subsystem ([`crate::checkpoints`]) stores point-in-time
//!   copies as sibling objects and calls back into the save/rename/delete
//!   primitives here.
//!
//! Directory existence is synthesized: a key ending in `/` may exist as a
//! zero-byte marker object, but the mere presence of other keys under the
//! prefix is sufficient to make the directory exist. Listings are always one
//! level deep via the backend's delimiter grouping.
//!
//! Checkpoints are NOT cascaded when the owning file is deleted or renamed;
//! callers bridge explicitly with
//! [`ContentsManager::rename_all_checkpoints`] and
//! [`ContentsManager::delete_checkpoint`].

pub mod fetch;
pub mod models;
mod mutate;
mod save;

pub use fetch::{DirEntries, Fetched};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use log::debug;

use crate::cache::ContainerCache;
use crate::config::ManagerConfig;
use crate::error::{ContentsError, ContentsResult, NoSuchDirectorySnafu, NoSuchFileSnafu,
    NotADirectorySnafu};
use crate::hooks::{default_should_list, PostSaveHook, PreSaveHook, VisibilityFilter};
use crate::model::{ContentModel, EntryType, Format};
use crate::notebook::{JsonNotebookCodec, NotebookCodec};
use crate::path;
use crate::storage::{Container, ObjectStore};

/// Boxed future used where operations recurse through sub-prefixes.
pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Hierarchical contents engine over an [`ObjectStore`] backend.
pub struct ContentsManager<S> {
    pub(crate) store: S,
    pub(crate) cache: ContainerCache,
    pub(crate) config: ManagerConfig,
    pub(crate) codec: Box<dyn NotebookCodec>,
    pub(crate) pre_save_hook: Option<PreSaveHook>,
    pub(crate) post_save_hook: Option<PostSaveHook>,
    pub(crate) should_list: VisibilityFilter,
}

impl<S: ObjectStore> ContentsManager<S> {
    /// Create a manager over `store` with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, ManagerConfig::default())
    }

    /// Create a manager over `store` with explicit configuration.
    pub fn with_config(store: S, config: ManagerConfig) -> Self {
        ContentsManager {
            store,
            cache: ContainerCache::new(config.cache_containers),
            config,
            codec: Box::new(JsonNotebookCodec),
            pre_save_hook: None,
            post_save_hook: None,
            should_list: Arc::new(default_should_list),
        }
    }

    /// Replace the notebook codec.
    pub fn set_notebook_codec(&mut self, codec: Box<dyn NotebookCodec>) {
        self.codec = codec;
    }

    /// Install a pre-save hook; its failures abort the save.
    pub fn set_pre_save_hook(&mut self, hook: PreSaveHook) {
        self.pre_save_hook = Some(hook);
    }

    /// Install a post-save hook; its failures are logged, never raised.
    pub fn set_post_save_hook(&mut self, hook: PostSaveHook) {
        self.post_save_hook = Some(hook);
    }

    /// Replace the listing visibility filter (default hides dotfiles).
    pub fn set_visibility_filter(&mut self, filter: VisibilityFilter) {
        self.should_list = filter;
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve a container id, memoizing successful lookups.
    ///
    /// Returns `None` when the container does not exist or the id is
    /// invalid; a deliberate "not found" is never cached, so repeated
    /// lookups of a missing container keep round-tripping. Forbidden
    /// propagates for the caller to interpret.
    pub(crate) async fn container(&self, name: &str) -> ContentsResult<Option<Container>> {
        if let Some(container) = self.cache.lookup(name) {
            return Ok(Some(container));
        }
        match self.store.get_container(name).await {
            Ok(container) => {
                self.cache.insert(container.clone());
                Ok(Some(container))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(crate::storage::StorageError::BadRequest { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a container id, propagating "not found" to the caller.
    pub(crate) async fn container_checked(&self, name: &str) -> ContentsResult<Container> {
        match self.container(name).await? {
            Some(container) => Ok(container),
            None => Err(crate::storage::error::NotFoundSnafu { path: name }
                .build()
                .into()),
        }
    }

    /// Whether `path` should be treated as hidden.
    ///
    /// The root is never hidden; a path inside a missing or forbidden
    /// container always is.
    pub async fn is_hidden(&self, path: &str) -> ContentsResult<bool> {
        debug!("is_hidden({path:?})");
        if path.is_empty() {
            return Ok(false);
        }
        let path = path::strip_leading_slash(path);
        let (container_id, _) = path::split_path(path);
        match self.container(container_id).await {
            Ok(found) => Ok(found.is_none()),
            Err(ContentsError::Storage { source }) if source.is_forbidden() => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// Whether `path` denotes an existing file (never true for directories
    /// or the root).
    pub async fn file_exists(&self, path: &str) -> ContentsResult<bool> {
        debug!("file_exists({path:?})");
        if path.is_empty() {
            return Ok(false);
        }
        let path = path::strip_leading_slash(path);
        let (container_id, key) = path::split_path(path);
        let container = match self.container(container_id).await? {
            Some(container) => container,
            None => return Ok(false),
        };
        if key.is_empty() || key.ends_with(path::DELIMITER) {
            // such keys may exist as objects but we treat them as directories
            return Ok(false);
        }
        match self.store.exists(&container.name, key).await {
            Ok(found) => Ok(found),
            Err(e) if e.is_not_found() => {
                // The container vanished behind the cached handle.
                self.cache.evict(&container.name);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether `path` denotes an existing directory (real or synthesized).
    pub async fn dir_exists(&self, path: &str) -> ContentsResult<bool> {
        debug!("dir_exists({path:?})");
        let path = path::strip_leading_slash(path);
        if path.is_empty() {
            return Ok(true);
        }
        let dir_path = path::ensure_dir_suffix(path);
        Ok(self.fetch(&dir_path, false).await?.exists())
    }

    /// Retrieve the model at `path`.
    ///
    /// `content` controls whether file bytes / notebook documents /
    /// directory listings are populated. `entry_type` forces the
    /// interpretation of the path; `format` controls file content decoding.
    pub async fn get(
        &self,
        path: &str,
        content: bool,
        entry_type: Option<EntryType>,
        format: Option<Format>,
    ) -> ContentsResult<ContentModel> {
        debug!("get({path:?}, content={content}, type={entry_type:?}, format={format:?})");
        self.get_inner(path::strip_leading_slash(path).to_string(), content, entry_type, format)
            .await
    }

    /// `get` behind an owned path, boxed where directory listings recurse
    /// back into it for child models.
    pub(crate) fn get_inner(
        &self,
        path: String,
        content: bool,
        entry_type: Option<EntryType>,
        format: Option<Format>,
    ) -> BoxFuture<'_, ContentsResult<ContentModel>> {
        Box::pin(async move {
            let is_dir_shaped = !path.contains(path::DELIMITER)
                || path.ends_with(path::DELIMITER)
                || entry_type == Some(EntryType::Directory);
            if is_dir_shaped {
                if !matches!(entry_type, None | Some(EntryType::Directory)) {
                    return NotADirectorySnafu { path }.fail();
                }
                let dir_path = if path.contains(path::DELIMITER) {
                    path::ensure_dir_suffix(&path)
                } else {
                    path.clone()
                };
                match self.fetch(&dir_path, content).await? {
                    Fetched::Missing => NoSuchDirectorySnafu { path: dir_path }.fail(),
                    Fetched::Root(containers) => {
                        self.dir_model(
                            "",
                            Some(DirEntries {
                                objects: Vec::new(),
                                prefixes: containers,
                            }),
                            content,
                        )
                        .await
                    }
                    Fetched::Dir(entries) => self.dir_model(&dir_path, Some(entries), content).await,
                    // Present, or an opaque container: a content-less model
                    // is all that can be said about it.
                    _ => self.dir_model(&dir_path, None, false).await,
                }
            } else {
                match self.fetch(&path, true).await? {
                    Fetched::File(obj) => {
                        let as_notebook = entry_type == Some(EntryType::Notebook)
                            || (entry_type.is_none() && path.ends_with(".ipynb"));
                        if as_notebook {
                            self.notebook_model(&obj, content).await
                        } else {
                            self.file_model(&obj, content, format).await
                        }
                    }
                    _ => NoSuchFileSnafu { path }.fail(),
                }
            }
        })
    }
}
