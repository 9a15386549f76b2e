//! Dependency model: payload wire types and the immutable path/element arena.

pub mod payload;
pub mod types;

pub use payload::{DdgPayload, PayloadAttribute, PayloadEntry, PayloadPath};
pub use types::{DdgModel, EdgeSide, FocalSelector, Operation, Path, PathElem, Service};
