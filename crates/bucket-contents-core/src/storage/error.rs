//! Storage error taxonomy.
//!
//! Backends report failures through [`StorageError`] so callers can tell
//! not-found, forbidden, and bad-request answers apart from genuine backend
//! faults; anything implementation-specific is carried inside
//! [`BackendError`].

use std::{error::Error, fmt, io};

use snafu::{Backtrace, prelude::*};

/// General result type used by storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by a concrete storage backend implementation.
///
/// Backend-specific failures are wrapped in this enum so higher layers can
/// map them into [`StorageError`] variants with path context attached.
#[derive(Debug)]
pub enum BackendError {
    /// An I/O error from the backend transport or a snapshot file.
    Io(io::Error),
    /// A (de)serialization error from a snapshot payload.
    Encoding(serde_json::Error),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Io(e) => write!(f, "backend I/O error: {e}"),
            BackendError::Encoding(e) => write!(f, "backend encoding error: {e}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BackendError::Io(e) => Some(e),
            BackendError::Encoding(e) => Some(e),
        }
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// The container or object at `path` was not found.
    #[snafu(display("Not found: {path}"))]
    NotFound {
        /// The path that was not found.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// Access to the container or object at `path` was denied.
    #[snafu(display("Forbidden: {path}"))]
    Forbidden {
        /// The path access was denied to.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The request was malformed, for example an invalid container name.
    #[snafu(display("Bad request for {path}: {message}"))]
    BadRequest {
        /// The offending path.
        path: String,
        /// Human-readable description of what was wrong.
        message: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The backend itself failed.
    #[snafu(display("Backend failure at {path}: {source}"))]
    Backend {
        /// The path the operation was addressing.
        path: String,
        /// Underlying backend error that caused the failure.
        source: BackendError,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },
}

impl StorageError {
    /// True for the not-found variant, used where an absent container is an
    /// answer rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    /// True for the forbidden variant, which the fetch layer reinterprets as
    /// "exists but opaque".
    pub fn is_forbidden(&self) -> bool {
        matches!(self, StorageError::Forbidden { .. })
    }
}
