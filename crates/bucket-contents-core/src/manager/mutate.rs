//! Delete and rename: recursive, non-transactional multi-object mutations.
//!
//! Directory-level operations are sequences of independent round trips with
//! no cross-call atomicity; a failure partway through leaves some children
//! mutated and others not. The post-conditions are: after a delete no
//! descendant remains under the prefix; after a rename every descendant
//! exists at the new prefix and none remains at the old one, across
//! containers as well as within one.

use log::debug;

use crate::error::ContentsResult;
use crate::manager::{BoxFuture, ContentsManager};
use crate::path;
use crate::storage::error::BadRequestSnafu;
use crate::storage::ObjectStore;

impl<S: ObjectStore> ContentsManager<S> {
    /// Delete the entry at `path`.
    ///
    /// A container root deletes the whole container and evicts its cache
    /// entry. A file deletes the single object; a directory (or a path that
    /// is also a prefix) deletes every object under it, one level at a
    /// time.
    pub async fn delete(&self, path: &str) -> ContentsResult<()> {
        debug!("delete({path:?})");
        self.delete_inner(path::strip_leading_slash(path).to_string())
            .await
    }

    fn delete_inner(&self, path: String) -> BoxFuture<'_, ContentsResult<()>> {
        Box::pin(async move {
            let (container_id, key) = path::split_path(&path);
            let container = self.container_checked(container_id).await?;
            if key.is_empty() {
                self.store.delete_container(&container.name).await?;
                self.cache.evict(&container.name);
                return Ok(());
            }

            if !key.ends_with(path::DELIMITER)
                && self.store.exists(&container.name, key).await?
            {
                self.store.delete(&container.name, key).await?;
            }

            // The key may also be a directory prefix; sweep whatever lives
            // under it.
            let prefix = path::ensure_dir_suffix(key);
            let listing = self
                .store
                .list(
                    &container.name,
                    &prefix,
                    Some(path::DELIMITER),
                    self.config.max_list_size,
                )
                .await?;
            let keys: Vec<String> = listing.objects.iter().map(|o| o.key.clone()).collect();
            if !keys.is_empty() {
                self.store.delete_batch(&container.name, &keys).await?;
            }
            for sub_prefix in listing.prefixes {
                self.delete_inner(path::object_path(&container.name, &sub_prefix))
                    .await?;
            }
            Ok(())
        })
    }

    /// Rename `old_path` to `new_path`.
    ///
    /// Within one container a single object uses the backend's native
    /// rename and a directory renames each child then recurses. Across
    /// containers there is no native primitive: each object is copied and
    /// then its source deleted, child by child.
    pub async fn rename(&self, old_path: &str, new_path: &str) -> ContentsResult<()> {
        debug!("rename({old_path:?}, {new_path:?})");
        self.rename_inner(
            path::strip_leading_slash(old_path).to_string(),
            path::strip_leading_slash(new_path).to_string(),
        )
        .await
    }

    fn rename_inner(&self, old_path: String, new_path: String) -> BoxFuture<'_, ContentsResult<()>> {
        Box::pin(async move {
            let (old_id, old_key) = path::split_path(&old_path);
            let (new_id, new_key) = path::split_path(&new_path);
            let old_container = self.container_checked(old_id).await?;
            let new_container = self.container_checked(new_id).await?;
            if old_key.is_empty() || new_key.is_empty() {
                return Err(BadRequestSnafu {
                    path: old_path.clone(),
                    message: "renaming a container is not supported",
                }
                .build()
                .into());
            }

            let same_container = old_container.name == new_container.name;
            let old_obj = if old_key.ends_with(path::DELIMITER) {
                None
            } else {
                self.store.get(&old_container.name, old_key).await?
            };

            if let Some(obj) = old_obj {
                if same_container {
                    self.store
                        .rename(&old_container.name, &obj.key, new_key)
                        .await?;
                } else {
                    self.store
                        .copy(&old_container.name, &obj.key, &new_container.name, new_key)
                        .await?;
                    self.store.delete(&old_container.name, &obj.key).await?;
                }
                return Ok(());
            }

            // Directory rename: move each child object, then recurse into
            // each sub-prefix.
            let old_prefix = path::ensure_dir_suffix(old_key);
            let new_prefix = path::ensure_dir_suffix(new_key);
            let listing = self
                .store
                .list(
                    &old_container.name,
                    &old_prefix,
                    Some(path::DELIMITER),
                    self.config.max_list_size,
                )
                .await?;
            for obj in &listing.objects {
                let target = format!("{new_prefix}{}", obj.name());
                if same_container {
                    self.store
                        .rename(&old_container.name, &obj.key, &target)
                        .await?;
                } else {
                    self.store
                        .copy(&old_container.name, &obj.key, &new_container.name, &target)
                        .await?;
                    self.store.delete(&old_container.name, &obj.key).await?;
                }
            }
            for sub_prefix in listing.prefixes {
                let child = path::dir_name(&sub_prefix);
                self.rename_inner(
                    path::object_path(&old_container.name, &sub_prefix),
                    format!(
                        "{}{}{new_prefix}{child}{}",
                        new_container.name,
                        path::DELIMITER,
                        path::DELIMITER
                    ),
                )
                .await?;
            }
            Ok(())
        })
    }
}
