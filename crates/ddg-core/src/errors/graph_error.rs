//! Graph and vertex/edge manager errors.
//!
//! Apart from `Visibility`, every variant is a broken caller contract:
//! the visibility key sequence asked for something the graph cannot
//! represent. They are never user-facing.

use super::error_code::{self, DdgErrorCode};
use super::VisibilityKeyError;

/// Errors that can occur while building or updating a dependency graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Given visibilityIdx that does not exist: {idx}")]
    UnknownVisibilityIdx { idx: usize },

    #[error("Non-focal pathElem cannot be connected to graph: visibilityIdx {idx} ({elem})")]
    DisconnectedPathElem { idx: usize, elem: String },

    #[error("Attempting to hide visibilityIdx {idx} which is not visible")]
    HideNotVisible { idx: usize },

    #[error("Attempting to show visibilityIdx {idx} which is already visible")]
    AlreadyVisible { idx: usize },

    #[error("Existing edge not associated with any pathElems: {from:?} -> {to:?}")]
    EdgeWithoutPathElems { from: String, to: String },

    #[error("Edge was not removed when its last pathElem was hidden: {from:?} -> {to:?}")]
    EdgeNotReleased { from: String, to: String },

    #[error("Focal pathElem had malformed edge: visibilityIdx {idx}")]
    FocalElemHasEdge { idx: usize },

    #[error("Attempting to hide vertex that other vertices are connected to: {key:?}")]
    VertexStillReferenced { key: String },

    #[error("Visibility key error: {0}")]
    Visibility(#[from] VisibilityKeyError),
}

impl DdgErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Visibility(e) => e.error_code(),
            Self::UnknownVisibilityIdx { .. } => error_code::GRAPH_ERROR,
            _ => error_code::GRAPH_INVARIANT,
        }
    }
}
