//! Visibility key errors.

use super::error_code::{self, DdgErrorCode};

/// Errors that can occur while reading or changing a visibility key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisibilityKeyError {
    #[error("Trying to show and hide same visibilityIdx: {idx} in same change")]
    ShowHideConflict { idx: usize },

    #[error("Malformed visibility key bucket {bucket_idx}: {field:?}")]
    MalformedBucket { bucket_idx: usize, field: String },
}

impl DdgErrorCode for VisibilityKeyError {
    fn error_code(&self) -> &'static str {
        error_code::VISIBILITY_KEY_ERROR
    }
}
