//! Container configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid container config: {0}")]
    Json(#[from] serde_json::Error),
}

/// When an unregistered injectable type may be constructed as its own provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// At every recursion level.
    #[default]
    Everywhere,
    /// Only for the key passed to `inject`; dependencies need providers.
    TopLevel,
    /// Never; every key needs a provider.
    Never,
}

impl FallbackPolicy {
    pub(crate) fn allows(self, top_level: bool) -> bool {
        match self {
            FallbackPolicy::Everywhere => true,
            FallbackPolicy::TopLevel => top_level,
            FallbackPolicy::Never => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub fallback: FallbackPolicy,
    /// Seed the catalog with types submitted through `inventory` (what `#[derive(Injectable)]` does).
    pub discover: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::Everywhere,
            discover: true,
        }
    }
}

impl ContainerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
