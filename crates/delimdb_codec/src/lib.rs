//! # DelimDB Codec
//!
//! Field mapping and delimited-text line codec for DelimDB.
//!
//! This crate turns records into delimited lines and back, driven entirely
//! by static per-type metadata:
//! - [`Schema`] / [`FieldSpec`] declare each field's name, kind, key flag,
//!   ignore flag, and optional explicit column index
//! - [`Record`] exposes a type's fields through indexed accessors
//! - [`select_key`] picks the value a record is stored under
//! - [`bytes_to_hex`] / [`hex_to_bytes`] code byte-sequence fields
//! - [`parse_record`] / [`format_record`] implement the line format
//!
//! The crate performs no I/O.
//!
//! ## Usage
//!
//! ```
//! use delimdb_codec::{parse_row, split_line, FieldKind, FieldSpec, LineFormat, Schema, Value};
//!
//! static FIELDS: [FieldSpec; 2] = [
//!     FieldSpec::new("Id", FieldKind::Unsigned).key(),
//!     FieldSpec::new("Blob", FieldKind::Bytes),
//! ];
//! static ROW: Schema = Schema::new("Row", &FIELDS);
//!
//! let cells = split_line("7|0AFF", '|');
//! let values = parse_row(&ROW, &cells, &LineFormat::new()).unwrap();
//! assert_eq!(values, vec![Value::Unsigned(7), Value::Bytes(vec![0x0A, 0xFF])]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod hex;
mod key;
mod line;
mod record;
mod schema;
mod value;

pub use error::{CodecError, CodecResult, RowError};
pub use hex::{bytes_to_hex, hex_to_bytes};
pub use key::{row_key, select_key};
pub use line::{
    format_record, format_row, header_line, parse_cell, parse_keyed_record, parse_record,
    parse_row, split_line, unquote, LineFormat, DEFAULT_DELIMITER, QUOTE,
};
pub use record::Record;
pub use schema::{
    FieldDescriptor, FieldKind, FieldSpec, Schema, BOOL_LIST, BYTES_LIST, FLOAT_LIST,
    INTEGER_LIST, TEXT_LIST, TIMESTAMP_LIST, UNSIGNED_LIST,
};
pub use value::{FromValue, Value, TIMESTAMP_FORMAT};

pub use chrono::{NaiveDate, NaiveDateTime};
