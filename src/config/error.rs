//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable could not be parsed.
    #[error("failed to parse {name}='{value}': {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A count that must be at least one was set to zero.
    #[error("{name} must be at least 1")]
    ZeroNotAllowed { name: &'static str },

    /// A required environment variable was not set.
    ///
    /// Only raised by operations that need a remote collaborator; cache maintenance
    /// runs without one.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// Collaborator URL without an `http://` or `https://` scheme.
    #[error("invalid service url '{value}': expected http:// or https://")]
    InvalidUrl { value: String },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
