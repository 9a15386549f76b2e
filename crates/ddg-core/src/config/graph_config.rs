//! Graph configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_VISIBLE_HOPS;
use crate::types::Density;

/// Configuration for vertex derivation and the default view.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GraphConfig {
    /// Vertex density. Default: `ppe`.
    pub density: Option<Density>,
    /// Include operation names in non-focal vertex keys. Default: true.
    pub show_operations: Option<bool>,
    /// Hops revealed on each side of the focal node when no key is given. Default: 2.
    pub default_visible_hops: Option<u32>,
}

impl GraphConfig {
    /// Returns the effective density, defaulting to `PreventPathEntanglement`.
    pub fn effective_density(&self) -> Density {
        self.density.unwrap_or_default()
    }

    /// Returns whether operations are shown, defaulting to true.
    pub fn effective_show_operations(&self) -> bool {
        self.show_operations.unwrap_or(true)
    }

    /// Returns the default hop radius, defaulting to 2.
    pub fn effective_default_visible_hops(&self) -> u32 {
        self.default_visible_hops.unwrap_or(DEFAULT_VISIBLE_HOPS)
    }
}
