//! Top-level error aggregating every subsystem.

use super::error_code::DdgErrorCode;
use super::{ConfigError, GraphError, TransformError, VisibilityKeyError};

/// Errors surfaced by session-level operations.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum DdgError {
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Visibility key error: {0}")]
    Visibility(#[from] VisibilityKeyError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DdgErrorCode for DdgError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transform(e) => e.error_code(),
            Self::Visibility(e) => e.error_code(),
            Self::Graph(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
