//! # DelimDB Core
//!
//! Keyed record store for DelimDB.
//!
//! This crate provides:
//! - [`CsvStore`], an insertion-ordered keyed collection persisted to
//!   delimited text
//! - Child files for collection fields, appended as an audit log or
//!   rewritten and reloaded
//! - Single-flight background saving after mutations
//! - Diagnostics for rows and saves the store absorbs instead of failing
//! - Store statistics
//!
//! Records describe themselves through [`delimdb_codec::Record`]; bytes
//! go through a [`delimdb_storage::StorageBackend`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod autosave;
mod children;
mod config;
mod diagnostics;
mod encoding;
mod error;
mod key;
mod stats;
mod store;

pub use autosave::SavePhase;
pub use children::{
    child_file_name, child_header, HEADER_THRESHOLD, OWNER_COLUMN, TIMESTAMP_COLUMN,
    TIMESTAMP_LAYOUT,
};
pub use config::StoreConfig;
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use encoding::{TextEncoding, UTF8_BOM};
pub use error::{CoreError, CoreResult};
pub use key::StoreKey;
pub use stats::{StatsSnapshot, StoreStats};
pub use store::{CsvStore, LoadSummary, SaveSummary, NEWLINE};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use delimdb_codec as codec;
pub use delimdb_storage as storage;
