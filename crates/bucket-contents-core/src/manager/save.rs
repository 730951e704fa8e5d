//! Save dispatch: notebooks, files, and directory markers.

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use log::{debug, error};
use serde_json::Value;
use snafu::ResultExt;

use crate::error::{
    ContentsResult, EncodingSnafu, NoContentSnafu, NotADirectorySnafu, PreSaveHookSnafu,
    RootSaveForbiddenSnafu, UnexpectedSnafu, UnsupportedFormatSnafu,
};
use crate::manager::ContentsManager;
use crate::model::{ContentModel, EntryType, Format, DIRECTORY_MIMETYPE, NOTEBOOK_MIMETYPE};
use crate::path;
use crate::storage::{ObjectHandle, ObjectStore};

impl<S: ObjectStore> ContentsManager<S> {
    /// Save `model` at `path` and return the re-fetched, content-less model
    /// of the result.
    ///
    /// Validation happens before any network call: non-directory models
    /// must carry content, and root-level saves may only create directories
    /// (containers). Directory paths are coerced to a single trailing `/`.
    /// The pre-save hook gates the save; failures inside the dispatched
    /// mutation are wrapped into a 500-class error unless they already
    /// carry a 4xx class. Saving a notebook guarantees at least one
    /// checkpoint exists for the path afterwards. Post-save hook failures
    /// are logged and dropped.
    pub async fn save(&self, model: &ContentModel, path: &str) -> ContentsResult<ContentModel> {
        let mut path = path::strip_leading_slash(path).to_string();
        if !model.has_content() {
            return NoContentSnafu { path }.fail();
        }
        let (_, key) = path::split_path(&path);
        if key.is_empty() && model.entry_type() != EntryType::Directory {
            return RootSaveForbiddenSnafu.fail();
        }
        if !key.is_empty() && model.entry_type() == EntryType::Directory {
            path = path::ensure_dir_suffix(&path);
        }
        debug!("saving {path}");

        if let Some(hook) = &self.pre_save_hook {
            hook(&path, model).map_err(|e| {
                PreSaveHookSnafu {
                    path: path.clone(),
                    message: e.to_string(),
                }
                .build()
            })?;
        }

        let validation_message = match model {
            ContentModel::Notebook(nb) => nb.content.as_ref().and_then(|doc| self.codec.validate(doc)),
            _ => None,
        };

        if let Err(e) = self.dispatch_save(model, &path).await {
            if e.is_client_error() {
                return Err(e);
            }
            error!("error while saving file: {path} {e}");
            return UnexpectedSnafu {
                path,
                message: e.to_string(),
            }
            .fail();
        }

        let mut saved = self.get(&path, false, None, None).await?;
        if let (ContentModel::Notebook(nb), Some(message)) = (&mut saved, validation_message) {
            nb.message = Some(message);
        }

        if let Some(hook) = &self.post_save_hook {
            debug!("running post-save hook on {path}");
            if let Err(e) = hook(&path, &saved) {
                error!("post-save hook failed on {path}: {e}");
            }
        }

        Ok(saved)
    }

    async fn dispatch_save(&self, model: &ContentModel, path: &str) -> ContentsResult<()> {
        match model {
            ContentModel::Notebook(nb) => {
                let Some(doc) = nb.content.as_ref() else {
                    return NoContentSnafu { path }.fail();
                };
                let mut doc = doc.clone();
                self.codec.check_and_sign(&mut doc, path);
                self.save_notebook(path, &doc).await?;
                // One checkpoint should always exist for notebooks.
                if self.list_checkpoints(path).await?.is_empty() {
                    self.create_checkpoint(path).await?;
                }
                Ok(())
            }
            ContentModel::File(file) => {
                let Some(content) = file.content.as_ref() else {
                    return NoContentSnafu { path }.fail();
                };
                self.save_file(path, content, file.format).await?;
                Ok(())
            }
            ContentModel::Directory(_) => self.save_directory(path).await,
        }
    }

    /// Serialize and upload a notebook document.
    pub(crate) async fn save_notebook(
        &self,
        path: &str,
        doc: &Value,
    ) -> ContentsResult<ObjectHandle> {
        let (container_id, key) = path::split_path(path);
        let container = self.container_checked(container_id).await?;
        let data = self.codec.serialize(doc, path)?;
        Ok(self
            .store
            .upload(
                &container.name,
                key,
                Bytes::from(data),
                Some(NOTEBOOK_MIMETYPE),
            )
            .await?)
    }

    /// Decode and upload generic file content.
    pub(crate) async fn save_file(
        &self,
        path: &str,
        content: &str,
        format: Option<Format>,
    ) -> ContentsResult<ObjectHandle> {
        let (container_id, key) = path::split_path(path);
        let container = self.container_checked(container_id).await?;
        let bytes = match format {
            Some(Format::Text) => Bytes::copy_from_slice(content.as_bytes()),
            Some(Format::Base64) => {
                let compact: String = content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                let decoded = general_purpose::STANDARD
                    .decode(compact)
                    .context(EncodingSnafu { path })?;
                Bytes::from(decoded)
            }
            None | Some(Format::Json) => return UnsupportedFormatSnafu { path }.fail(),
        };
        Ok(self.store.upload(&container.name, key, bytes, None).await?)
    }

    /// Create a directory: idempotent when it already exists, a 400-class
    /// error when a file occupies the path, a container at root level, a
    /// zero-byte marker object otherwise.
    pub(crate) async fn save_directory(&self, path: &str) -> ContentsResult<()> {
        let (container_id, key) = path::split_path(path);
        if !key.is_empty() {
            let container = self.container(container_id).await?;
            if let Some(container) = container {
                let file_key = key.trim_end_matches(path::DELIMITER);
                if self.store.exists(&container.name, file_key).await? {
                    return NotADirectorySnafu { path }.fail();
                }
            }
        }
        if self.fetch(path, false).await?.exists() {
            debug!("directory {path:?} already exists");
            return Ok(());
        }
        if key.is_empty() {
            let container = self.store.create_container(container_id).await?;
            self.cache.insert(container);
        } else {
            let container = self.container_checked(container_id).await?;
            let marker = path::ensure_dir_suffix(key);
            self.store
                .upload(
                    &container.name,
                    &marker,
                    Bytes::new(),
                    Some(DIRECTORY_MIMETYPE),
                )
                .await?;
        }
        Ok(())
    }
}
