//! Error types for DelimDB core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in DelimDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] delimdb_storage::StorageError),

    /// Field codec error.
    #[error("codec error: {0}")]
    Codec(#[from] delimdb_codec::CodecError),

    /// Neither an explicit, cached, nor type-derived file name is usable.
    #[error("no file name could be resolved")]
    FileNameUnresolved,

    /// Save was asked to write a store without records.
    #[error("store is empty")]
    EmptyStore,

    /// Text could not be decoded or encoded with the configured encoding.
    #[error("{encoding} encoding error: {message}")]
    Encoding {
        /// Name of the encoding.
        encoding: &'static str,
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates an encoding error.
    pub fn encoding(encoding: &'static str, message: impl Into<String>) -> Self {
        Self::Encoding {
            encoding,
            message: message.into(),
        }
    }
}
