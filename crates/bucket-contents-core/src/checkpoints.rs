//! Checkpoints: point-in-time copies of file and notebook content.
//!
//! A checkpoint is stored as a sibling object under a configurable
//! checkpoint sub-directory, keyed by a generated id embedded in the object
//! name: `<container>/<dir><checkpoint_dir>/<basename>-<id><ext>`. An
//! optional checkpoint container redirects every checkpoint object away from
//! the data container into one alternate namespace.
//!
//! The per-file state machine is `{no checkpoint} -> create -> {>=1
//! checkpoint}`; saving a notebook guarantees the transition has happened.
//! Checkpoints are never cascaded implicitly: deleting or renaming a file
//! leaves its checkpoints in place unless the explicit operations here are
//! used.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ContentsResult, NoSuchCheckpointSnafu, NoSuchFileSnafu};
use crate::manager::{ContentsManager, Fetched};
use crate::model::ContentModel;
use crate::path;
use crate::storage::ObjectStore;

/// One checkpoint of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Generated unique id, embedded in the checkpoint's object name.
    pub id: String,
    /// When the checkpoint object was written.
    pub last_modified: DateTime<Utc>,
}

impl<S: ObjectStore> ContentsManager<S> {
    /// Derive the checkpoint path for `checkpoint_id` of `path`; with no id,
    /// the listing prefix for all checkpoints of `path`.
    fn checkpoint_path(&self, checkpoint_id: Option<&str>, path: &str) -> String {
        let path = path::strip_leading_slash(path);
        let (container_id, key) = path::split_path(path);
        let container = self
            .config
            .checkpoint_container
            .as_deref()
            .unwrap_or(container_id);
        let split = key.rfind(path::DELIMITER).map(|i| i + 1).unwrap_or(0);
        let (dir, file) = key.split_at(split);
        let (stem, ext) = path::split_extension(file);
        let cp_dir = &self.config.checkpoint_dir;
        match checkpoint_id {
            Some(id) => format!("{container}/{dir}{cp_dir}/{stem}-{id}{ext}"),
            None => format!("{container}/{dir}{cp_dir}/{stem}"),
        }
    }

    /// Create a checkpoint of the current content at `path`.
    ///
    /// Fails with a 404-class error when the path does not denote a file or
    /// notebook.
    pub async fn create_checkpoint(&self, path: &str) -> ContentsResult<Checkpoint> {
        let checkpoint_id = Uuid::new_v4().to_string();
        let cp = self.checkpoint_path(Some(&checkpoint_id), path);
        debug!("creating checkpoint {checkpoint_id} for {path} as {cp}");
        let model = self.get(path, true, None, None).await?;
        let handle = match model {
            ContentModel::Notebook(nb) => match nb.content {
                Some(doc) => self.save_notebook(&cp, &doc).await?,
                None => return NoSuchFileSnafu { path }.fail(),
            },
            ContentModel::File(file) => match file.content {
                Some(content) => self.save_file(&cp, &content, file.format).await?,
                None => return NoSuchFileSnafu { path }.fail(),
            },
            ContentModel::Directory(_) => return NoSuchFileSnafu { path }.fail(),
        };
        Ok(Checkpoint {
            id: checkpoint_id,
            last_modified: handle.updated,
        })
    }

    /// List all checkpoints for `path`, most recently modified first.
    pub async fn list_checkpoints(&self, path: &str) -> ContentsResult<Vec<Checkpoint>> {
        let cp_prefix = self.checkpoint_path(None, path);
        let (container_id, key_prefix) = path::split_path(&cp_prefix);
        let container = match self.container(container_id).await? {
            Some(container) => container,
            None => return Ok(Vec::new()),
        };
        let stem = path::blob_name(key_prefix);
        let ext = {
            let own_file = path::blob_name(path::split_path(path).1);
            path::split_extension(own_file).1.to_string()
        };
        let listing = match self
            .store
            .list(
                &container.name,
                key_prefix,
                Some(path::DELIMITER),
                self.config.max_list_size,
            )
            .await
        {
            Ok(listing) => listing,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let marker = format!("{stem}-");
        let mut checkpoints: Vec<Checkpoint> = listing
            .objects
            .iter()
            .filter_map(|obj| {
                let (obj_stem, obj_ext) = path::split_extension(obj.name());
                if obj_ext != ext {
                    return None;
                }
                let id = obj_stem.strip_prefix(&marker)?;
                if id.is_empty() {
                    return None;
                }
                Some(Checkpoint {
                    id: id.to_string(),
                    last_modified: obj.updated,
                })
            })
            .collect();
        checkpoints.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        debug!("list_checkpoints: {path}: {checkpoints:?}");
        Ok(checkpoints)
    }

    /// Retrieve the content of a non-notebook checkpoint as a save-ready
    /// file model.
    pub async fn get_file_checkpoint(
        &self,
        checkpoint_id: &str,
        path: &str,
    ) -> ContentsResult<ContentModel> {
        debug!("restoring {path} from checkpoint {checkpoint_id}");
        let cp = self.checkpoint_path(Some(checkpoint_id), path);
        match self.fetch(&cp, true).await? {
            Fetched::File(obj) => {
                let (content, format) = self.read_file(&obj, None).await?;
                Ok(ContentModel::file_for_save(content, format))
            }
            _ => NoSuchCheckpointSnafu {
                checkpoint_id,
                path,
            }
            .fail(),
        }
    }

    /// Retrieve the content of a notebook checkpoint as a save-ready
    /// notebook model.
    pub async fn get_notebook_checkpoint(
        &self,
        checkpoint_id: &str,
        path: &str,
    ) -> ContentsResult<ContentModel> {
        debug!("restoring {path} from checkpoint {checkpoint_id}");
        let cp = self.checkpoint_path(Some(checkpoint_id), path);
        match self.fetch(&cp, true).await? {
            Fetched::File(obj) => {
                let doc = self.read_notebook(&obj).await?;
                Ok(ContentModel::notebook_for_save(doc))
            }
            _ => NoSuchCheckpointSnafu {
                checkpoint_id,
                path,
            }
            .fail(),
        }
    }

    /// Restore `path` to the state captured by `checkpoint_id`.
    pub async fn restore_checkpoint(
        &self,
        checkpoint_id: &str,
        path: &str,
    ) -> ContentsResult<ContentModel> {
        let model = if path.ends_with(".ipynb") {
            self.get_notebook_checkpoint(checkpoint_id, path).await?
        } else {
            self.get_file_checkpoint(checkpoint_id, path).await?
        };
        self.save(&model, path).await
    }

    /// Move one checkpoint from `old_path`'s namespace to `new_path`'s.
    pub async fn rename_checkpoint(
        &self,
        checkpoint_id: &str,
        old_path: &str,
        new_path: &str,
    ) -> ContentsResult<()> {
        let old_cp = self.checkpoint_path(Some(checkpoint_id), old_path);
        let new_cp = self.checkpoint_path(Some(checkpoint_id), new_path);
        self.rename(&old_cp, &new_cp).await
    }

    /// Move every checkpoint of `old_path` under `new_path`.
    ///
    /// This is the explicit bridge for the non-cascading rename policy.
    pub async fn rename_all_checkpoints(
        &self,
        old_path: &str,
        new_path: &str,
    ) -> ContentsResult<()> {
        for checkpoint in self.list_checkpoints(old_path).await? {
            self.rename_checkpoint(&checkpoint.id, old_path, new_path)
                .await?;
        }
        Ok(())
    }

    /// Delete one checkpoint.
    pub async fn delete_checkpoint(&self, checkpoint_id: &str, path: &str) -> ContentsResult<()> {
        let cp = self.checkpoint_path(Some(checkpoint_id), path);
        if !self.fetch(&cp, false).await?.exists() {
            return NoSuchCheckpointSnafu {
                checkpoint_id,
                path,
            }
            .fail();
        }
        self.delete(&cp).await
    }
}
