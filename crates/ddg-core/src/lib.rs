//! # ddg-core
//!
//! Shared foundation for the deep dependency graph engine: error enums,
//! layered configuration, tracing setup, and collection aliases.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;

pub use config::DdgConfig;
pub use errors::{DdgError, DdgErrorCode};
pub use types::Density;
