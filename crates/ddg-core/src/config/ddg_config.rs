//! Top-level DDG configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CacheConfig, GraphConfig};
use crate::constants::{CONFIG_FILE_NAME, MAX_VISIBLE_HOPS};
use crate::errors::ConfigError;
use crate::types::Density;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`DDG_*`)
/// 3. Project config (`ddg.toml` in project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DdgConfig {
    pub graph: GraphConfig,
    pub cache: CacheConfig,
}

/// Override arguments a host can apply on top of file and env config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub density: Option<Density>,
    pub show_operations: Option<bool>,
    pub default_visible_hops: Option<u32>,
    pub memo_capacity: Option<u64>,
}

impl DdgConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 3: project config
        let project_config_path = root.join(CONFIG_FILE_NAME);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): explicit overrides
        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        tracing::debug!(
            density = %config.graph.effective_density(),
            show_operations = config.graph.effective_show_operations(),
            memo_capacity = config.cache.effective_memo_capacity(),
            "ddg config resolved"
        );

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: DdgConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &DdgConfig) -> Result<(), ConfigError> {
        if config.cache.memo_capacity == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "cache.memo_capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(hops) = config.graph.default_visible_hops {
            if hops > MAX_VISIBLE_HOPS {
                return Err(ConfigError::ValidationFailed {
                    field: "graph.default_visible_hops".to_string(),
                    message: format!("must be at most {MAX_VISIBLE_HOPS}"),
                });
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut DdgConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: DdgConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut DdgConfig, other: &DdgConfig) {
        if other.graph.density.is_some() {
            base.graph.density = other.graph.density;
        }
        if other.graph.show_operations.is_some() {
            base.graph.show_operations = other.graph.show_operations;
        }
        if other.graph.default_visible_hops.is_some() {
            base.graph.default_visible_hops = other.graph.default_visible_hops;
        }
        if other.cache.memo_capacity.is_some() {
            base.cache.memo_capacity = other.cache.memo_capacity;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `DDG_GRAPH_DENSITY`, `DDG_CACHE_MEMO_CAPACITY`, etc.
    ///
    /// Unparseable numeric and boolean values are ignored; an unknown
    /// density is an error since it would silently change vertex keys.
    fn apply_env_overrides(config: &mut DdgConfig) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("DDG_GRAPH_DENSITY") {
            config.graph.density = Some(val.parse::<Density>()?);
        }
        if let Ok(val) = std::env::var("DDG_GRAPH_SHOW_OPERATIONS") {
            if let Ok(v) = val.parse::<bool>() {
                config.graph.show_operations = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DDG_GRAPH_DEFAULT_VISIBLE_HOPS") {
            if let Ok(v) = val.parse::<u32>() {
                config.graph.default_visible_hops = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DDG_CACHE_MEMO_CAPACITY") {
            if let Ok(v) = val.parse::<u64>() {
                config.cache.memo_capacity = Some(v);
            }
        }
        Ok(())
    }

    /// Apply explicit overrides (highest priority).
    pub fn apply_overrides(config: &mut DdgConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.density {
            config.graph.density = Some(v);
        }
        if let Some(v) = overrides.show_operations {
            config.graph.show_operations = Some(v);
        }
        if let Some(v) = overrides.default_visible_hops {
            config.graph.default_visible_hops = Some(v);
        }
        if let Some(v) = overrides.memo_capacity {
            config.cache.memo_capacity = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
