//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for DelimDB.
///
/// Storage backends are **opaque byte stores** addressed by file name. They
/// provide the three capabilities the store needs - open for read, open for
/// write/append, and check existence - plus a size query used to decide
/// whether a child file still needs its header. DelimDB owns all text
/// format interpretation.
///
/// # Invariants
///
/// - `write` replaces the whole content of `name`, creating it if needed
/// - `append` returns the offset where data was written
/// - `read` returns exactly the bytes previously written or appended
/// - Backends must be `Send + Sync` for background saves
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Returns `true` if `name` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or existence cannot be checked.
    fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Reads the full content of `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist (`NotFound`)
    /// - An I/O error occurs
    fn read(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Replaces the content of `name` with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Appends `data` to the end of `name`, creating it if missing.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&self, name: &str, data: &[u8]) -> StorageResult<u64>;

    /// Returns the current size of `name` in bytes, `0` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self, name: &str) -> StorageResult<u64>;
}
