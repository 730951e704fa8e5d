//! Model builders: object handles and listings to [`ContentModel`] values.

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

use crate::error::{ContentsResult, NotUtf8Snafu};
use crate::manager::{ContentsManager, DirEntries};
use crate::model::{
    ContentModel, DirectoryModel, EntryType, FileModel, Format, NotebookModel, DIRECTORY_MIMETYPE,
};
use crate::path;
use crate::storage::{ObjectHandle, ObjectStore};

impl<S: ObjectStore> ContentsManager<S> {
    /// Read and decode a non-notebook file.
    ///
    /// `Some(Text)` must decode as UTF-8 or the request fails with a
    /// 400-class error naming the path. An unspecified format tries UTF-8
    /// first and falls back to base64; `Some(Base64)` always encodes the
    /// raw bytes.
    pub(crate) async fn read_file(
        &self,
        obj: &ObjectHandle,
        format: Option<Format>,
    ) -> ContentsResult<(String, Format)> {
        let bytes = self.store.download(&obj.container, &obj.key).await?;
        if matches!(format, None | Some(Format::Text)) {
            match std::str::from_utf8(&bytes) {
                Ok(text) => return Ok((text.to_string(), Format::Text)),
                Err(_) if format == Some(Format::Text) => {
                    return NotUtf8Snafu { path: obj.path() }.fail();
                }
                Err(_) => {}
            }
        }
        Ok((general_purpose::STANDARD.encode(&bytes), Format::Base64))
    }

    /// Build a file model, with content when requested.
    pub(crate) async fn file_model(
        &self,
        obj: &ObjectHandle,
        content: bool,
        format: Option<Format>,
    ) -> ContentsResult<ContentModel> {
        let mut model = FileModel {
            name: obj.name().to_string(),
            path: obj.path(),
            created: Some(obj.updated),
            last_modified: Some(obj.updated),
            mimetype: obj.content_type.clone(),
            writable: true,
            content: None,
            format: None,
        };
        if content {
            let (text, format) = self.read_file(obj, format).await?;
            if model.mimetype.is_none() {
                model.mimetype = Some(
                    match format {
                        Format::Base64 => "application/octet-stream",
                        _ => "text/plain",
                    }
                    .to_string(),
                );
            }
            model.content = Some(text);
            model.format = Some(format);
        }
        Ok(ContentModel::File(model))
    }

    /// Download and parse a notebook document, marking trusted cells.
    pub(crate) async fn read_notebook(&self, obj: &ObjectHandle) -> ContentsResult<Value> {
        let bytes = self.store.download(&obj.container, &obj.key).await?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|_| NotUtf8Snafu { path: obj.path() }.build())?;
        let mut notebook = self.codec.parse(text, &obj.path())?;
        self.codec.mark_trusted(&mut notebook, &obj.path());
        Ok(notebook)
    }

    /// Build a notebook model, with the parsed and validated document when
    /// requested.
    pub(crate) async fn notebook_model(
        &self,
        obj: &ObjectHandle,
        content: bool,
    ) -> ContentsResult<ContentModel> {
        let mut model = NotebookModel {
            name: obj.name().to_string(),
            path: obj.path(),
            created: Some(obj.updated),
            last_modified: Some(obj.updated),
            mimetype: obj.content_type.clone(),
            writable: true,
            content: None,
            format: None,
            message: None,
        };
        if content {
            let notebook = self.read_notebook(obj).await?;
            model.message = self.codec.validate(&notebook);
            model.content = Some(notebook);
            model.format = Some(Format::Json);
        }
        Ok(ContentModel::Notebook(model))
    }

    /// Build a directory model from its direct members.
    ///
    /// The listing excludes the directory's own marker entry and anything
    /// the visibility filter rejects. Child models are content-less;
    /// sub-directory children re-enter `get` one at a time.
    pub(crate) async fn dir_model(
        &self,
        dir_path: &str,
        entries: Option<DirEntries>,
        content: bool,
    ) -> ContentsResult<ContentModel> {
        let writable = !dir_path.is_empty()
            && (entries.is_some() || !self.is_hidden(dir_path).await?);
        let mut model = DirectoryModel {
            name: path::dir_name(dir_path).to_string(),
            path: dir_path.to_string(),
            created: None,
            last_modified: None,
            mimetype: Some(DIRECTORY_MIMETYPE.to_string()),
            writable,
            content: None,
            format: None,
        };

        if content {
            let entries = entries.unwrap_or_default();
            let mut children = Vec::new();
            for obj in &entries.objects {
                if obj.path() == dir_path || !(self.should_list)(obj.name()) {
                    continue;
                }
                let child = if obj.key.ends_with(".ipynb") {
                    self.notebook_model(obj, false).await?
                } else {
                    self.file_model(obj, false, None).await?
                };
                children.push(child);
            }

            let (container_id, own_key) = path::split_path(dir_path);
            let own_key = own_key.trim_end_matches(path::DELIMITER);
            for prefix in &entries.prefixes {
                if !(self.should_list)(path::dir_name(prefix)) || prefix == own_key {
                    continue;
                }
                let child_path = if dir_path.is_empty() {
                    // Root listing: prefixes are container ids.
                    prefix.clone()
                } else {
                    format!("{container_id}{}{prefix}{}", path::DELIMITER, path::DELIMITER)
                };
                children.push(
                    self.get_inner(child_path, false, Some(EntryType::Directory), None)
                        .await?,
                );
            }

            model.content = Some(children);
            model.format = Some(Format::Json);
        }

        Ok(ContentModel::Directory(model))
    }
}
