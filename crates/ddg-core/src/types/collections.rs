//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// SmallVec sized for call-path members (paths are rarely longer than 8 hops).
pub type SmallVec8<T> = SmallVec<[T; 8]>;
