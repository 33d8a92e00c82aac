//! Frames configuration
//!
//! Loads settings from `frames.toml`, with environment variables taking
//! precedence over file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "frames.toml";

/// Errors raised while loading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FramesConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Numeric tolerances
    pub numeric: NumericConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive, e.g. `"frames_core=trace"`
    pub filter: String,
}

/// Numeric configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NumericConfig {
    /// Tolerance used when comparing matrices and frame trees
    pub approx_epsilon: f64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Default for NumericConfig {
    fn default() -> Self {
        Self {
            approx_epsilon: 1e-9,
        }
    }
}

impl FramesConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `frames.toml` in the current directory,
    /// or return the defaults if it is missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// `FRAMES_LOG` replaces the log filter; `FRAMES_APPROX_EPSILON` replaces
    /// the comparison tolerance when it parses as a positive number.
    pub fn merge_with_env(&mut self) {
        if let Ok(filter) = std::env::var("FRAMES_LOG") {
            self.logging.filter = filter;
        }
        if let Ok(val) = std::env::var("FRAMES_APPROX_EPSILON") {
            if let Ok(eps) = val.parse::<f64>() {
                if eps > 0.0 {
                    self.numeric.approx_epsilon = eps;
                }
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from frames.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
