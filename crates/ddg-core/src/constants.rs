//! Engine-wide constants.

/// Width of one visibility-key bucket. Each bucket is a base-36 CSV field
/// carrying the bits for 31 consecutive visibility indices.
pub const VISIBILITY_BUCKET_SIZE: usize = 31;

/// Default number of entries held by each memo cache.
pub const DEFAULT_MEMO_CAPACITY: u64 = 10;

/// Default hop radius revealed around the focal node when no key is given.
pub const DEFAULT_VISIBLE_HOPS: u32 = 2;

/// Upper bound accepted for `graph.default_visible_hops`.
pub const MAX_VISIBLE_HOPS: u32 = 64;

/// Payload attribute key carrying an exemplar trace id.
pub const EXEMPLAR_TRACE_ID_KEY: &str = "exemplar_trace_id";

/// Project-level config file name.
pub const CONFIG_FILE_NAME: &str = "ddg.toml";
