//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The rules file does not exist or could not be read.
    #[error("failed to read rules file {path}: {source}")]
    ReadRules {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The rules file is not valid TOML for the expected shape.
    #[error("failed to parse rules file: {0}")]
    ParseRules(String),

    /// The rules could not be rendered back to TOML.
    #[error("failed to render rules: {0}")]
    RenderRules(String),

    /// A `--at` value was not a valid RFC 3339 timestamp.
    #[error("invalid timestamp '{0}' (expected RFC 3339, e.g. 2025-03-10T12:00:00Z)")]
    InvalidTimestamp(String),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output could not be encoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
