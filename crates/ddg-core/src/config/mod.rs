//! Configuration system for the DDG engine.
//! TOML-based, layered resolution: overrides > env > project > defaults.

pub mod cache_config;
pub mod ddg_config;
pub mod graph_config;

pub use cache_config::CacheConfig;
pub use ddg_config::{ConfigOverrides, DdgConfig};
pub use graph_config::GraphConfig;
