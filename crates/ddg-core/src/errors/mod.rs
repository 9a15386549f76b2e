//! Error handling for the DDG engine.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod ddg_error;
pub mod error_code;
pub mod graph_error;
pub mod transform_error;
pub mod visibility_error;

pub use config_error::ConfigError;
pub use ddg_error::DdgError;
pub use error_code::DdgErrorCode;
pub use graph_error::GraphError;
pub use transform_error::TransformError;
pub use visibility_error::VisibilityKeyError;
