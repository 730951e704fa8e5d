//! Save hooks and the listing visibility filter.
//!
//! Hooks are opaque callables supplied by the embedding application. The
//! pre-save hook gates whether a save happens at all, so its failures
//! propagate; the post-save hook is a best-effort side effect whose failures
//! are logged and dropped by the manager.

use std::sync::Arc;

use crate::model::ContentModel;

/// Boxed error hooks may fail with.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Called with `(path, model)` before a save is dispatched.
pub type PreSaveHook = Arc<dyn Fn(&str, &ContentModel) -> Result<(), HookError> + Send + Sync>;

/// Called with `(path, model)` after a save completed; the model is the
/// re-fetched result.
pub type PostSaveHook = Arc<dyn Fn(&str, &ContentModel) -> Result<(), HookError> + Send + Sync>;

/// Decides whether an entry name appears in directory listings.
pub type VisibilityFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Default visibility policy: hide dotfiles.
pub fn default_should_list(name: &str) -> bool {
    !name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotfiles_are_hidden() {
        assert!(default_should_list("notes.txt"));
        assert!(!default_should_list(".ipynb_checkpoints"));
        assert!(!default_should_list(".hidden"));
    }
}
