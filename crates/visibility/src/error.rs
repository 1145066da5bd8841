//! Error types for visibility configuration

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a [`crate::VisibilityConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML parsing error
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// File I/O error
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Environment override that does not parse
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },

    /// Value out of range
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
