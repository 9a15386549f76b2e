//! Process-wide memo caches for the codec.
//!
//! The same keys are re-derived many times while a view is being explored.
//! These caches only save work: every entry is a pure function of its key.

use std::sync::Arc;

use moka::sync::Cache;
use once_cell::sync::Lazy;

use ddg_core::constants::DEFAULT_MEMO_CAPACITY;

use super::codec::VisibilityDiff;

fn memo<K, V>() -> Cache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder().max_capacity(DEFAULT_MEMO_CAPACITY).build()
}

/// Parsed buckets per key.
pub(super) static BUCKETS: Lazy<Cache<String, Arc<[u32]>>> = Lazy::new(memo);

/// Ascending indices per key.
pub(super) static DECODED: Lazy<Cache<String, Arc<[usize]>>> = Lazy::new(memo);

/// Diffs keyed by `(old, new)`.
pub(super) static DIFFS: Lazy<Cache<(String, String), Arc<VisibilityDiff>>> = Lazy::new(memo);

/// Keys per index list, as given.
pub(super) static ENCODED: Lazy<Cache<Vec<usize>, String>> = Lazy::new(memo);

/// Drop every memoized codec result.
pub fn clear_caches() {
    BUCKETS.invalidate_all();
    DECODED.invalidate_all();
    DIFFS.invalidate_all();
    ENCODED.invalidate_all();
}
