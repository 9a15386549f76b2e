//! Encode, decode, change and diff visibility keys.
//!
//! Every function is pure. Keys are never edited in place: each change
//! produces a new string.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ddg_core::constants::VISIBILITY_BUCKET_SIZE;
use ddg_core::errors::VisibilityKeyError;
use ddg_core::types::collections::FxHashSet;

use super::cache::{BUCKETS, DECODED, DIFFS, ENCODED};

const BUCKET_MASK: u32 = (1 << VISIBILITY_BUCKET_SIZE) - 1;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Indices that became visible and indices that stopped being visible.
/// Both lists are ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibilityDiff {
    pub added: Vec<usize>,
    pub removed: Vec<usize>,
}

impl VisibilityDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

fn bucket_position(visibility_idx: usize) -> (usize, u32) {
    (
        visibility_idx / VISIBILITY_BUCKET_SIZE,
        1 << (visibility_idx % VISIBILITY_BUCKET_SIZE),
    )
}

fn parse_buckets(key: &str) -> Result<Vec<u32>, VisibilityKeyError> {
    key.split(',')
        .enumerate()
        .map(|(bucket_idx, field)| {
            if field.is_empty() {
                return Ok(0);
            }
            u64::from_str_radix(field, 36)
                .map(|value| (value as u32) & BUCKET_MASK)
                .map_err(|_| VisibilityKeyError::MalformedBucket {
                    bucket_idx,
                    field: field.to_string(),
                })
        })
        .collect()
}

/// Buckets of `key`. `""` is a single zero bucket.
fn buckets(key: &str) -> Result<Arc<[u32]>, VisibilityKeyError> {
    if let Some(cached) = BUCKETS.get(key) {
        return Ok(cached);
    }
    let parsed: Arc<[u32]> = parse_buckets(key)?.into();
    BUCKETS.insert(key.to_string(), Arc::clone(&parsed));
    Ok(parsed)
}

fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return String::new();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

fn render_buckets(buckets: &[u32]) -> String {
    buckets
        .iter()
        .map(|&bucket| to_base36(bucket))
        .collect::<Vec<_>>()
        .join(",")
}

/// Whether `visibility_idx` is set in `key`. Indices past the last bucket
/// are not visible.
pub fn is_visible(key: &str, visibility_idx: usize) -> Result<bool, VisibilityKeyError> {
    let (bucket_idx, bit) = bucket_position(visibility_idx);
    Ok(buckets(key)?
        .get(bucket_idx)
        .is_some_and(|bucket| bucket & bit != 0))
}

/// Copy `key`, clearing every index in `hide` and then setting every index
/// in `show`.
///
/// Showing past the last bucket appends zero buckets as needed; hiding past
/// it changes nothing. An index present in both lists is rejected.
pub fn change_visibility(
    key: &str,
    show: &[usize],
    hide: &[usize],
) -> Result<String, VisibilityKeyError> {
    let conflict_check: FxHashSet<usize> = show.iter().copied().collect();
    let mut next: Vec<u32> = buckets(key)?.to_vec();

    for &hide_idx in hide {
        if conflict_check.contains(&hide_idx) {
            return Err(VisibilityKeyError::ShowHideConflict { idx: hide_idx });
        }
        let (bucket_idx, bit) = bucket_position(hide_idx);
        if let Some(bucket) = next.get_mut(bucket_idx) {
            *bucket &= !bit;
        }
    }

    for &show_idx in show {
        let (bucket_idx, bit) = bucket_position(show_idx);
        if bucket_idx >= next.len() {
            next.resize(bucket_idx + 1, 0);
        }
        next[bucket_idx] |= bit;
    }

    Ok(render_buckets(&next))
}

/// Key with exactly `indices` visible.
pub fn create_visibility_key(indices: &[usize]) -> String {
    let mut next: Vec<u32> = vec![0];
    for &idx in indices {
        let (bucket_idx, bit) = bucket_position(idx);
        if bucket_idx >= next.len() {
            next.resize(bucket_idx + 1, 0);
        }
        next[bucket_idx] |= bit;
    }
    render_buckets(&next)
}

/// Memoized `create_visibility_key`.
pub fn encode(indices: &[usize]) -> String {
    if let Some(cached) = ENCODED.get(indices) {
        return cached;
    }
    let key = create_visibility_key(indices);
    ENCODED.insert(indices.to_vec(), key.clone());
    key
}

/// Every visible index in `key`, ascending.
pub fn decode(key: &str) -> Result<Vec<usize>, VisibilityKeyError> {
    if let Some(cached) = DECODED.get(key) {
        return Ok(cached.to_vec());
    }
    let mut indices = Vec::new();
    for (bucket_idx, &bucket) in buckets(key)?.iter().enumerate() {
        for bit_idx in 0..VISIBILITY_BUCKET_SIZE {
            if bucket & (1 << bit_idx) != 0 {
                indices.push(bucket_idx * VISIBILITY_BUCKET_SIZE + bit_idx);
            }
        }
    }
    DECODED.insert(key.to_string(), Arc::from(indices.as_slice()));
    Ok(indices)
}

/// Indices shown in `new_key` but not `old_key` (`added`) and the reverse
/// (`removed`), scanning as many buckets as the longer key has.
pub fn compare_visibility_keys(
    old_key: &str,
    new_key: &str,
) -> Result<VisibilityDiff, VisibilityKeyError> {
    let memo_key = (old_key.to_string(), new_key.to_string());
    if let Some(cached) = DIFFS.get(&memo_key) {
        return Ok((*cached).clone());
    }

    let old_buckets = buckets(old_key)?;
    let new_buckets = buckets(new_key)?;
    let mut diff = VisibilityDiff::default();

    for bucket_idx in 0..old_buckets.len().max(new_buckets.len()) {
        let old = old_buckets.get(bucket_idx).copied().unwrap_or(0);
        let new = new_buckets.get(bucket_idx).copied().unwrap_or(0);
        if old == new {
            continue;
        }
        for bit_idx in 0..VISIBILITY_BUCKET_SIZE {
            let bit = 1 << bit_idx;
            let idx = bucket_idx * VISIBILITY_BUCKET_SIZE + bit_idx;
            match (old & bit != 0, new & bit != 0) {
                (false, true) => diff.added.push(idx),
                (true, false) => diff.removed.push(idx),
                _ => {}
            }
        }
    }

    DIFFS.insert(memo_key, Arc::new(diff.clone()));
    Ok(diff)
}
