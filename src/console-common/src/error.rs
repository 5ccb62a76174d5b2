//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

use crate::config_substitution::SubstitutionError;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading the console configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// IO error.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Placeholder substitution error.
    #[error("Config substitution failed: {0}")]
    Substitution(#[from] SubstitutionError),

    /// A value parsed but is not acceptable.
    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    /// Returns the exit code for CLI error reporting.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::NotFound(_) => 2,
            ConfigError::Invalid { .. } => 3,
            _ => 1,
        }
    }
}
