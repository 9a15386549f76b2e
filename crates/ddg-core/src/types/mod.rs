//! Shared data structures for the DDG engine.

pub mod collections;
pub mod density;

pub use collections::{FxHashMap, FxHashSet};
pub use density::Density;
