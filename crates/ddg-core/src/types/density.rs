//! Vertex density settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// How aggressively distinct path elements collapse into one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Density {
    /// One vertex per service (and operation, when shown).
    #[serde(rename = "mc", alias = "most-concise")]
    MostConcise,
    /// Like `MostConcise`, but upstream and downstream occurrences stay apart.
    #[serde(rename = "uvd", alias = "upstream-vs-downstream")]
    UpstreamVsDownstream,
    /// Like `MostConcise`, but every hop distance gets its own vertex.
    #[serde(rename = "opl", alias = "one-per-level")]
    OnePerLevel,
    /// One vertex per distinct chain back to the focal node.
    #[default]
    #[serde(rename = "ppe", alias = "prevent-path-entanglement")]
    PreventPathEntanglement,
    /// Like `PreventPathEntanglement`, but path ends are marked external.
    #[serde(rename = "evi", alias = "external-vs-internal")]
    ExternalVsInternal,
}

impl Density {
    /// Short code used in config files and query strings.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MostConcise => "mc",
            Self::UpstreamVsDownstream => "uvd",
            Self::OnePerLevel => "opl",
            Self::PreventPathEntanglement => "ppe",
            Self::ExternalVsInternal => "evi",
        }
    }

    /// All densities, most collapsed first.
    pub fn all() -> &'static [Density] {
        &[
            Self::MostConcise,
            Self::UpstreamVsDownstream,
            Self::OnePerLevel,
            Self::PreventPathEntanglement,
            Self::ExternalVsInternal,
        ]
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Density {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mc" | "most-concise" => Ok(Self::MostConcise),
            "uvd" | "upstream-vs-downstream" => Ok(Self::UpstreamVsDownstream),
            "opl" | "one-per-level" => Ok(Self::OnePerLevel),
            "ppe" | "prevent-path-entanglement" => Ok(Self::PreventPathEntanglement),
            "evi" | "external-vs-internal" => Ok(Self::ExternalVsInternal),
            other => Err(ConfigError::InvalidValue {
                field: "graph.density".to_string(),
                message: format!(
                    "density {other:?} has not been implemented, try one of: mc, uvd, opl, ppe, evi"
                ),
            }),
        }
    }
}
