//! Error types for configuration loading

use masq_core::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration loading
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that can occur while loading `masquerade.yaml`
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Environment variable not found
    #[error("environment variable '{var}' not set")]
    EnvVarNotFound { var: String },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// A masquerade device whose properties do not form a valid binding
    #[error("invalid masquerade device '{name}': {source}")]
    InvalidBinding {
        name: String,
        #[source]
        source: ConfigError,
    },
}
