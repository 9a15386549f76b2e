//! Visibility keys: the set of shown element indices as a compact string.
//!
//! Wire format: a comma-separated list of base-36 integers. Field `i`
//! carries the bits for indices `31 * i ..= 31 * i + 30`; a zero field is
//! written empty so field positions are preserved.

mod cache;
pub mod codec;

pub use cache::clear_caches;
pub use codec::{
    change_visibility, compare_visibility_keys, create_visibility_key, decode, encode,
    is_visible, VisibilityDiff,
};
