//! Manager configuration.

use serde::{Deserialize, Serialize};

/// Default checkpoint sub-directory name, relative to the owning file's
/// directory.
pub const DEFAULT_CHECKPOINT_DIR: &str = ".ipynb_checkpoints";

/// Default bound on prefix-listing results.
pub const DEFAULT_MAX_LIST_SIZE: usize = 1024;

/// Tunables of a [`crate::manager::ContentsManager`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Upper bound on entries returned by a single prefix listing.
    pub max_list_size: usize,
    /// Whether to memoize container lookups; when false every existence
    /// check round-trips to the backend.
    pub cache_containers: bool,
    /// Name of the checkpoint sub-directory kept next to each file.
    pub checkpoint_dir: String,
    /// Optional container that receives all checkpoint objects instead of
    /// the data container.
    pub checkpoint_container: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            max_list_size: DEFAULT_MAX_LIST_SIZE,
            cache_containers: true,
            checkpoint_dir: DEFAULT_CHECKPOINT_DIR.to_string(),
            checkpoint_container: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: ManagerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_list_size, DEFAULT_MAX_LIST_SIZE);
        assert!(config.cache_containers);
        assert_eq!(config.checkpoint_dir, DEFAULT_CHECKPOINT_DIR);
        assert_eq!(config.checkpoint_container, None);
    }
}
