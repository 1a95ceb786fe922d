//! Session configuration, loadable from TOML.

use chatcad_engine::EngineConfig;
use chatcad_kernel_math::Tolerance;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

fn default_cache_depth() -> usize {
    8
}

fn default_tolerance() -> f64 {
    Tolerance::DEFAULT.linear
}

fn default_parallel() -> bool {
    true
}

/// Tunable session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of most recent turns included in the cache key.
    #[serde(default = "default_cache_depth")]
    pub cache_depth: usize,
    /// Linear tolerance for coincident-surface classification in the
    /// boolean kernel.
    #[serde(default = "default_tolerance")]
    pub tolerance_linear: f64,
    /// Realize independent primitives in parallel.
    #[serde(default = "default_parallel")]
    pub parallel_primitives: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_depth: default_cache_depth(),
            tolerance_linear: default_tolerance(),
            parallel_primitives: default_parallel(),
        }
    }
}

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
}

impl SessionConfig {
    /// Parse from a TOML string. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Derive the composition engine settings.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tolerance: Tolerance::with_linear(self.tolerance_linear),
            parallel: self.parallel_primitives,
        }
    }
}
