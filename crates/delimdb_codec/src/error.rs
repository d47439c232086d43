//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while converting cells and values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A cell could not be converted to the field's declared kind.
    #[error("cannot parse {text:?} as {kind}")]
    InvalidCell {
        /// Name of the target kind.
        kind: &'static str,
        /// The offending cell text.
        text: String,
    },

    /// A binary cell contained a non-hexadecimal digit.
    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidHex {
        /// The offending character.
        digit: char,
        /// Byte position of the digit in the cell.
        position: usize,
    },

    /// A value of the wrong variant was handed to a field.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected value variant.
        expected: &'static str,
        /// The variant actually received.
        actual: &'static str,
    },

    /// A field index outside the record's schema.
    #[error("unknown field index {index} for {type_name}")]
    UnknownField {
        /// Record type name.
        type_name: &'static str,
        /// The requested index.
        index: usize,
    },

    /// Integer value does not fit the target type.
    #[error("integer overflow converting to {target}")]
    IntegerOverflow {
        /// The target integer type.
        target: &'static str,
    },
}

impl CodecError {
    /// Create an invalid cell error.
    pub fn invalid_cell(kind: &'static str, text: impl Into<String>) -> Self {
        Self::InvalidCell {
            kind,
            text: text.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch { expected, actual }
    }

    /// Create an unknown field error.
    pub fn unknown_field(type_name: &'static str, index: usize) -> Self {
        Self::UnknownField { type_name, index }
    }
}

/// Why a single delimited line could not become a record.
///
/// Row errors never abort a load; the store skips the row and reports it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// Strict mode rejected the row's cell count.
    #[error("expected {expected} cells, found {actual}")]
    Arity {
        /// Number of persisted columns.
        expected: usize,
        /// Number of cells on the line.
        actual: usize,
    },

    /// The first column was empty, so the row has no usable key.
    #[error("first column is empty")]
    MissingKeyCell,

    /// A cell failed to convert or could not be assigned.
    #[error("field {field}: {source}")]
    Field {
        /// Name of the failing field.
        field: &'static str,
        /// Underlying conversion error.
        source: CodecError,
    },
}

impl RowError {
    /// Wraps a codec error with the field it happened on.
    pub fn field(field: &'static str, source: CodecError) -> Self {
        Self::Field { field, source }
    }
}
