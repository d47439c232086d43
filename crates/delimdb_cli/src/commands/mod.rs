//! CLI command implementations.

pub mod demo;
pub mod inspect;

use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The named file does not exist under the data directory.
    #[error("{0} not found")]
    FileNotFound(String),

    /// An output format other than `text` or `json` was requested.
    #[error("unknown output format {0:?} (expected text or json)")]
    UnknownFormat(String),

    /// Store error.
    #[error(transparent)]
    Core(#[from] delimdb_core::CoreError),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] delimdb_storage::StorageError),

    /// JSON rendering error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Directory listing error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Output format of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::UnknownFormat(other.to_string())),
        }
    }
}
