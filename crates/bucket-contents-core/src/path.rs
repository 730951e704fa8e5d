//! Path conventions for the bucket/object namespace.
//!
//! This module centralizes every rule for mapping a hierarchical,
//! `/`-delimited path onto the flat bucket/object address space:
//!
//! - The FIRST segment of a path is the container (bucket) id; everything
//!   after the first `/` is the object key inside that container.
//! - An empty path denotes the root listing of all containers.
//! - A key ending in `/` is directory intent; the marker object for a
//!   directory is the key with exactly one trailing `/`.
//!
//! The functions here are pure string manipulation. Callers are expected to
//! strip leading slashes (via [`strip_leading_slash`]) before resolving, and
//! to join results back with [`object_path`] when reconstructing the
//! externally visible path of an object handle.

/// Hierarchy delimiter used throughout the namespace.
pub const DELIMITER: char = '/';

/// Split a normalized path into `(container, key)` at the first `/`.
///
/// If the path contains no `/`, the whole string is the container id and the
/// key is empty. This never fails; malformed input is the caller's problem.
pub fn split_path(path: &str) -> (&str, &str) {
    match path.split_once(DELIMITER) {
        Some((container, key)) => (container, key),
        None => (path, ""),
    }
}

/// Remove a single leading `/` if present.
pub fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix(DELIMITER).unwrap_or(path)
}

/// Last segment of an object key: `"a/b/c.txt"` -> `"c.txt"`.
pub fn blob_name(key: &str) -> &str {
    key.rsplit(DELIMITER).next().unwrap_or(key)
}

/// Display name of a directory path: trailing `/` stripped, last segment.
///
/// `"bucket/a/b/"` -> `"b"`, `"bucket"` -> `"bucket"`.
pub fn dir_name(path: &str) -> &str {
    let trimmed = path.strip_suffix(DELIMITER).unwrap_or(path);
    trimmed.rsplit(DELIMITER).next().unwrap_or(trimmed)
}

/// Coerce a key or path to end with exactly one `/`.
pub fn ensure_dir_suffix(path: &str) -> String {
    format!("{}{}", path.trim_end_matches(DELIMITER), DELIMITER)
}

/// Reconstruct the externally visible path of an object: `container/key`.
///
/// A container with an empty key maps back to just the container id.
pub fn object_path(container: &str, key: &str) -> String {
    if key.is_empty() {
        container.to_string()
    } else {
        format!("{container}{DELIMITER}{key}")
    }
}

/// Split a file name into `(stem, extension)` where the extension includes
/// the leading dot: `"nb.ipynb"` -> `("nb", ".ipynb")`, `"Makefile"` ->
/// `("Makefile", "")`. A leading dot alone does not start an extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_at_first_delimiter() {
        assert_eq!(split_path("a/b/c"), ("a", "b/c"));
        assert_eq!(split_path("a"), ("a", ""));
        assert_eq!(split_path(""), ("", ""));
        assert_eq!(split_path("bucket/dir/"), ("bucket", "dir/"));
    }

    #[test]
    fn blob_and_dir_names() {
        assert_eq!(blob_name("a/b/c.txt"), "c.txt");
        assert_eq!(blob_name("c.txt"), "c.txt");
        assert_eq!(dir_name("bucket/a/b/"), "b");
        assert_eq!(dir_name("bucket"), "bucket");
    }

    #[test]
    fn dir_suffix_is_idempotent() {
        assert_eq!(ensure_dir_suffix("a/b"), "a/b/");
        assert_eq!(ensure_dir_suffix("a/b/"), "a/b/");
        assert_eq!(ensure_dir_suffix("a/b//"), "a/b/");
    }

    #[test]
    fn extensions() {
        assert_eq!(split_extension("nb.ipynb"), ("nb", ".ipynb"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("Makefile"), ("Makefile", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }

    #[test]
    fn object_paths_round_trip() {
        assert_eq!(object_path("b", "dir/f.txt"), "b/dir/f.txt");
        assert_eq!(object_path("b", ""), "b");
        let (c, k) = split_path("b/dir/f.txt");
        assert_eq!(object_path(c, k), "b/dir/f.txt");
    }
}
