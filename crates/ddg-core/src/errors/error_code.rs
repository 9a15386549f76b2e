//! DdgErrorCode trait for host-boundary reporting.

/// Trait for mapping DDG errors to stable error code strings.
/// Every error enum implements this so that a host (UI bridge, logger)
/// can classify failures without matching on variants.
pub trait DdgErrorCode {
    /// Returns the error code string (e.g., "GRAPH_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const TRANSFORM_ERROR: &str = "TRANSFORM_ERROR";
pub const MISSING_FOCAL_NODE: &str = "MISSING_FOCAL_NODE";
pub const VISIBILITY_KEY_ERROR: &str = "VISIBILITY_KEY_ERROR";
pub const GRAPH_ERROR: &str = "GRAPH_ERROR";
pub const GRAPH_INVARIANT: &str = "GRAPH_INVARIANT";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
