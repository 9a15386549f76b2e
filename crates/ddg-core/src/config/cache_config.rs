//! Memo cache configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MEMO_CAPACITY;

/// Configuration for the graph query memo caches.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries per memo cache. Default: 10.
    pub memo_capacity: Option<u64>,
}

impl CacheConfig {
    /// Returns the effective memo capacity, defaulting to 10.
    pub fn effective_memo_capacity(&self) -> u64 {
        self.memo_capacity.unwrap_or(DEFAULT_MEMO_CAPACITY)
    }
}
