//! Content models exchanged with callers.
//!
//! A model describes one entry of the hierarchical namespace: a file, a
//! notebook, or a directory. The three kinds are a tagged enum so each
//! variant carries only the fields valid for it; the serde representation
//! uses a lowercase `type` tag, which is also the wire shape front ends
//! expect.
//!
//! `content` is `None` unless content was explicitly requested. Directory
//! content lists immediate children only, as content-less models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mimetype reported for directories.
pub const DIRECTORY_MIMETYPE: &str = "application/x-directory";

/// Mimetype used when uploading serialized notebooks.
pub const NOTEBOOK_MIMETYPE: &str = "application/x-ipynb+json";

/// Encoding of a model's `content` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// UTF-8 text.
    Text,
    /// Base64-encoded raw bytes.
    Base64,
    /// Structured JSON (notebooks and directory listings).
    Json,
}

/// The kind of entry a path denotes, used to force interpretation on `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// A generic file.
    File,
    /// A notebook document.
    Notebook,
    /// A directory (real or synthesized from a key prefix).
    Directory,
}

/// Model of a generic file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileModel {
    /// Display name (last path segment).
    pub name: String,
    /// Full hierarchical path.
    pub path: String,
    /// Creation timestamp; backends report only last-modified, which is
    /// used for both.
    pub created: Option<DateTime<Utc>>,
    /// Last-modified timestamp.
    pub last_modified: Option<DateTime<Utc>>,
    /// Content type, if known.
    pub mimetype: Option<String>,
    /// Whether the entry accepts writes.
    pub writable: bool,
    /// File content; `None` unless content was requested.
    pub content: Option<String>,
    /// Encoding of `content`.
    pub format: Option<Format>,
}

/// Model of a notebook document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookModel {
    /// Display name (last path segment).
    pub name: String,
    /// Full hierarchical path.
    pub path: String,
    /// Creation timestamp (same as last-modified, see [`FileModel`]).
    pub created: Option<DateTime<Utc>>,
    /// Last-modified timestamp.
    pub last_modified: Option<DateTime<Utc>>,
    /// Content type, if known.
    pub mimetype: Option<String>,
    /// Whether the entry accepts writes.
    pub writable: bool,
    /// Parsed notebook document; `None` unless content was requested.
    pub content: Option<serde_json::Value>,
    /// Always [`Format::Json`] when content is present.
    pub format: Option<Format>,
    /// Validation message attached by the notebook codec, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Model of a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryModel {
    /// Display name (last path segment, trailing slash stripped).
    pub name: String,
    /// Full hierarchical path, with directory intent.
    pub path: String,
    /// Directories carry no timestamps.
    pub created: Option<DateTime<Utc>>,
    /// Directories carry no timestamps.
    pub last_modified: Option<DateTime<Utc>>,
    /// Always [`DIRECTORY_MIMETYPE`].
    pub mimetype: Option<String>,
    /// Whether the entry accepts writes.
    pub writable: bool,
    /// Immediate children as content-less models; `None` unless content was
    /// requested.
    pub content: Option<Vec<ContentModel>>,
    /// Always [`Format::Json`] when content is present.
    pub format: Option<Format>,
}

/// A content entry: file, notebook, or directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentModel {
    /// A generic file.
    File(FileModel),
    /// A notebook document.
    Notebook(NotebookModel),
    /// A directory.
    Directory(DirectoryModel),
}

impl ContentModel {
    /// The entry kind of this model.
    pub fn entry_type(&self) -> EntryType {
        match self {
            ContentModel::File(_) => EntryType::File,
            ContentModel::Notebook(_) => EntryType::Notebook,
            ContentModel::Directory(_) => EntryType::Directory,
        }
    }

    /// Display name of the entry.
    pub fn name(&self) -> &str {
        match self {
            ContentModel::File(m) => &m.name,
            ContentModel::Notebook(m) => &m.name,
            ContentModel::Directory(m) => &m.name,
        }
    }

    /// Full hierarchical path of the entry.
    pub fn path(&self) -> &str {
        match self {
            ContentModel::File(m) => &m.path,
            ContentModel::Notebook(m) => &m.path,
            ContentModel::Directory(m) => &m.path,
        }
    }

    /// Whether the model carries content. Directories count as carrying
    /// content always; their content is synthesized, not supplied.
    pub fn has_content(&self) -> bool {
        match self {
            ContentModel::File(m) => m.content.is_some(),
            ContentModel::Notebook(m) => m.content.is_some(),
            ContentModel::Directory(_) => true,
        }
    }

    /// A minimal file model suitable as input to `save`.
    pub fn file_for_save(content: impl Into<String>, format: Format) -> Self {
        ContentModel::File(FileModel {
            name: String::new(),
            path: String::new(),
            created: None,
            last_modified: None,
            mimetype: None,
            writable: true,
            content: Some(content.into()),
            format: Some(format),
        })
    }

    /// A minimal notebook model suitable as input to `save`.
    pub fn notebook_for_save(content: serde_json::Value) -> Self {
        ContentModel::Notebook(NotebookModel {
            name: String::new(),
            path: String::new(),
            created: None,
            last_modified: None,
            mimetype: None,
            writable: true,
            content: Some(content),
            format: Some(Format::Json),
            message: None,
        })
    }

    /// A minimal directory model suitable as input to `save`.
    pub fn directory_for_save() -> Self {
        ContentModel::Directory(DirectoryModel {
            name: String::new(),
            path: String::new(),
            created: None,
            last_modified: None,
            mimetype: Some(DIRECTORY_MIMETYPE.to_string()),
            writable: true,
            content: None,
            format: None,
        })
    }
}
