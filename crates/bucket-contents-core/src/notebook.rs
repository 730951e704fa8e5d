//! Notebook document codec seam.
//!
//! Parsing, serializing, validating and trust-marking notebook documents is
//! the business of an external collaborator. The engine only needs the small
//! surface captured by [`NotebookCodec`]; deployments with a real signing
//! store provide their own implementation, while [`JsonNotebookCodec`] is the
//! shipped default that treats documents as plain JSON.

use serde_json::Value;

use crate::error::{ContentsResult, InvalidNotebookSnafu};

/// Codec for notebook documents.
pub trait NotebookCodec: Send + Sync {
    /// Parse raw UTF-8 text into a notebook document.
    fn parse(&self, data: &str, path: &str) -> ContentsResult<Value>;

    /// Serialize a document back to the text that gets uploaded.
    fn serialize(&self, notebook: &Value, path: &str) -> ContentsResult<String>;

    /// Validate a document; a message describes what is wrong, `None` means
    /// the document is valid.
    fn validate(&self, notebook: &Value) -> Option<String>;

    /// Mark cells previously trusted for `path` as trusted in the document.
    fn mark_trusted(&self, notebook: &mut Value, path: &str);

    /// Sign the document for `path` if its provenance checks out.
    fn check_and_sign(&self, notebook: &mut Value, path: &str);
}

/// Default codec: notebooks are JSON documents, trust operations are no-ops.
#[derive(Debug, Default)]
pub struct JsonNotebookCodec;

/// Top-level fields every notebook document must carry.
const REQUIRED_FIELDS: [&str; 3] = ["cells", "metadata", "nbformat"];

impl NotebookCodec for JsonNotebookCodec {
    fn parse(&self, data: &str, path: &str) -> ContentsResult<Value> {
        serde_json::from_str(data).map_err(|e| {
            InvalidNotebookSnafu {
                path,
                message: e.to_string(),
            }
            .build()
        })
    }

    fn serialize(&self, notebook: &Value, path: &str) -> ContentsResult<String> {
        serde_json::to_string_pretty(notebook).map_err(|e| {
            InvalidNotebookSnafu {
                path,
                message: e.to_string(),
            }
            .build()
        })
    }

    fn validate(&self, notebook: &Value) -> Option<String> {
        let obj = match notebook.as_object() {
            Some(obj) => obj,
            None => return Some("notebook is not a JSON object".to_string()),
        };
        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                return Some(format!("notebook is missing required field {field:?}"));
            }
        }
        None
    }

    fn mark_trusted(&self, _notebook: &mut Value, _path: &str) {}

    fn check_and_sign(&self, _notebook: &mut Value, _path: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_flags_missing_fields() {
        let codec = JsonNotebookCodec;
        let nb = json!({"cells": [], "metadata": {}, "nbformat": 4, "nbformat_minor": 5});
        assert_eq!(codec.validate(&nb), None);

        let bad = json!({"cells": []});
        let message = codec.validate(&bad).expect("invalid");
        assert!(message.contains("metadata"));
    }

    #[test]
    fn parse_rejects_garbage() {
        let codec = JsonNotebookCodec;
        let err = codec.parse("not json", "b/nb.ipynb").unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
