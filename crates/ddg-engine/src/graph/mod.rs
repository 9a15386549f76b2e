//! Vertex/edge derivation over the dependency model.
//!
//! Two variants share the same vertex-key strategies: `GraphModel`, frozen
//! at construction and queried with any visibility key, and `DdgEvManager`,
//! which mutates one view incrementally as keys change.

pub mod density;
pub mod ev_manager;
pub mod model;
pub mod types;

pub use density::{DensityStrategy, VertexKeyStrategy, FOCAL_KEY};
pub use ev_manager::DdgEvManager;
pub use model::GraphModel;
pub use types::{
    CheckedStatus, DdgEdge, DdgVertex, Direction, GenerationUpdate, VertexOperation, VisibleGraph,
};
