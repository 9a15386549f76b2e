//! # ddg-engine
//!
//! Deep dependency graph engine. Turns service-call paths into a
//! deduplicated directed graph centered on a focal service/operation, and
//! tracks which parts of it are shown through compact visibility keys.
//!
//! Data flow: payload (or traces) → [`transform`] → [`model::DdgModel`] →
//! [`graph::GraphModel`] / [`graph::DdgEvManager`] driven by
//! [`visibility`] keys.

pub mod graph;
pub mod model;
pub mod query;
pub mod session;
pub mod transform;
pub mod visibility;

pub use graph::{DdgEvManager, GraphModel, VisibleGraph};
pub use model::{DdgModel, DdgPayload, FocalSelector};
pub use query::DdgQuery;
pub use session::{DdgSession, SessionRegistry};
