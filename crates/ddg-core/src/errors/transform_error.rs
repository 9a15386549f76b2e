//! Payload and trace transform errors.

use super::error_code::{self, DdgErrorCode};

/// Errors that can occur while turning raw paths or traces into a model.
/// Any of these aborts construction of the whole model.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Payload path lacks focal node: {path}")]
    MissingFocalNode { path: String },

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("Invalid trace {trace_id}: {message}")]
    InvalidTrace { trace_id: String, message: String },
}

impl DdgErrorCode for TransformError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFocalNode { .. } => error_code::MISSING_FOCAL_NODE,
            _ => error_code::TRANSFORM_ERROR,
        }
    }
}
