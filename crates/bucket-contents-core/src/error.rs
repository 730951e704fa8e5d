//! Error taxonomy of the contents engine.
//!
//! Every error maps onto one of four caller-visible classes, exposed by
//! [`ContentsError::status`]:
//!
//! - `404` — the requested path or checkpoint is absent,
//! - `400` — the request itself is invalid (missing content, unsupported
//!   format, undecodable payload, wrong entry type),
//! - `403` — the operation is denied (root-level non-directory save),
//! - `500` — anything unexpected from the backend or a hook.
//!
//! A backend "forbidden" is deliberately NOT part of this taxonomy for
//! reads: the fetch layer swallows it and reports the path as existing but
//! opaque. Validation errors are raised before any network call; errors from
//! a dispatched mutation are wrapped into [`ContentsError::Unexpected`]
//! unless they already carry a 4xx class.

use snafu::{Backtrace, prelude::*};

use crate::storage::StorageError;

/// Result type used by the manager surface.
pub type ContentsResult<T> = Result<T, ContentsError>;

/// Errors surfaced by the contents engine.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ContentsError {
    /// The path does not denote an existing file.
    #[snafu(display("No such file: {path}"))]
    NoSuchFile {
        /// The requested path.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The path does not denote an existing directory.
    #[snafu(display("No such directory: {path}"))]
    NoSuchDirectory {
        /// The requested path.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// No checkpoint with this id exists for the path.
    #[snafu(display("No such checkpoint: {checkpoint_id} for {path}"))]
    NoSuchCheckpoint {
        /// The requested checkpoint id.
        checkpoint_id: String,
        /// The owning path.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// A directory was expected but the path resolves to a file, or the
    /// caller forced a non-directory type onto a directory path.
    #[snafu(display("Not a directory: {path}"))]
    NotADirectory {
        /// The offending path.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The model passed to `save` carries no content.
    #[snafu(display("No file content provided for {path}"))]
    NoContent {
        /// The save target path.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// Only directories (containers) may be created at the root level.
    #[snafu(display("You may only create directories (containers) at the root level"))]
    RootSaveForbidden {
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// Text format was explicitly requested but the payload is not UTF-8.
    #[snafu(display("{path} is not UTF-8 encoded"))]
    NotUtf8 {
        /// The offending path.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// A file save must specify its content format as text or base64.
    #[snafu(display("Must specify format of file contents for {path} as \"text\" or \"base64\""))]
    UnsupportedFormat {
        /// The save target path.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The supplied content could not be decoded for upload.
    #[snafu(display("Encoding error saving {path}: {source}"))]
    Encoding {
        /// The save target path.
        path: String,
        /// The decode failure.
        source: base64::DecodeError,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The notebook payload is not a valid document.
    #[snafu(display("Invalid notebook {path}: {message}"))]
    InvalidNotebook {
        /// The offending path.
        path: String,
        /// What was wrong with the document.
        message: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The pre-save hook rejected the save.
    #[snafu(display("Pre-save hook failed for {path}: {message}"))]
    PreSaveHook {
        /// The save target path.
        path: String,
        /// The hook's failure message.
        message: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// Anything else that went wrong during a dispatched mutation.
    #[snafu(display("Unexpected error while saving file: {path} {message}"))]
    Unexpected {
        /// The path being mutated.
        path: String,
        /// The underlying failure message.
        message: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// A storage operation failed outside a dispatched mutation.
    ///
    /// Backtraces are delegated to the inner StorageError.
    #[snafu(display("Storage error: {source}"))]
    Storage {
        /// Underlying storage error returned by the backend.
        #[snafu(backtrace)]
        source: StorageError,
    },
}

impl ContentsError {
    /// The HTTP-equivalent class of this error.
    pub fn status(&self) -> u16 {
        match self {
            ContentsError::NoSuchFile { .. }
            | ContentsError::NoSuchDirectory { .. }
            | ContentsError::NoSuchCheckpoint { .. } => 404,
            ContentsError::NotADirectory { .. }
            | ContentsError::NoContent { .. }
            | ContentsError::NotUtf8 { .. }
            | ContentsError::UnsupportedFormat { .. }
            | ContentsError::Encoding { .. }
            | ContentsError::InvalidNotebook { .. } => 400,
            ContentsError::RootSaveForbidden { .. } => 403,
            ContentsError::Storage { source } => match source {
                StorageError::NotFound { .. } => 404,
                StorageError::Forbidden { .. } => 403,
                StorageError::BadRequest { .. } => 400,
                StorageError::Backend { .. } => 500,
            },
            ContentsError::PreSaveHook { .. } | ContentsError::Unexpected { .. } => 500,
        }
    }

    /// True when the error already carries a deliberate 4xx class and must
    /// pass through the mutation dispatch untouched.
    pub(crate) fn is_client_error(&self) -> bool {
        self.status() < 500
    }
}

impl From<StorageError> for ContentsError {
    fn from(source: StorageError) -> Self {
        ContentsError::Storage { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes() {
        let err = NoSuchFileSnafu { path: "b/f" }.build();
        assert_eq!(err.status(), 404);
        let err = RootSaveForbiddenSnafu.build();
        assert_eq!(err.status(), 403);
        let err = NotUtf8Snafu { path: "b/f" }.build();
        assert_eq!(err.status(), 400);
        let err = UnexpectedSnafu {
            path: "b/f",
            message: "boom",
        }
        .build();
        assert_eq!(err.status(), 500);
    }
}
