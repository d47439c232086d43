//! # DelimDB Storage
//!
//! Storage backend trait and implementations for DelimDB.
//!
//! This crate provides the lowest-level storage abstraction for DelimDB.
//! Storage backends are **opaque named byte stores** - they do not interpret
//! the delimited text they hold.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores addressed by file name
//!   (exists, read, write, append, size)
//! - No knowledge of delimiters, headers, or record layouts
//! - Must be `Send + Sync` so a background save can share them
//! - DelimDB owns all text format interpretation
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use delimdb_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.write("users.csv", b"Id|Name\n").unwrap();
//! let offset = backend.append("users.csv", b"1|alice\n").unwrap();
//! assert_eq!(offset, 8);
//! assert_eq!(backend.read("users.csv").unwrap(), b"Id|Name\n1|alice\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
