//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading `PAYGRADE_*` settings or checking them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {name}='{value}': {reason}")]
    ParseError {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A parsed value violates a component invariant.
    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },

    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// The catalog path points at something other than a file.
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// The storage path points at something other than a directory.
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
