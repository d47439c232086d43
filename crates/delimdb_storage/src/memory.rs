//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory storage backend.
///
/// This backend keeps every named file in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use delimdb_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// let offset = backend.append("log.csv", b"test data").unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(backend.size("log.csv").unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend holding a single pre-existing file.
    ///
    /// Useful for testing load paths.
    #[must_use]
    pub fn with_file(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let backend = Self::new();
        backend.files.write().insert(name.into(), data.into());
        backend
    }

    /// Returns the content of `name` as text, if present.
    ///
    /// Invalid UTF-8 is replaced; this is a debugging helper.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.files
            .read()
            .get(name)
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }

    /// Returns the names of all stored files, sorted.
    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Removes a file. Returns `true` if it existed.
    pub fn remove(&self, name: &str) -> bool {
        self.files.write().remove(name).is_some()
    }

    /// Clears all files from the backend.
    pub fn clear(&self) {
        self.files.write().clear();
    }

    fn check_name(name: &str) -> StorageResult<()> {
        if name.trim().is_empty() {
            return Err(StorageError::invalid_name(name));
        }
        Ok(())
    }
}

impl StorageBackend for InMemoryBackend {
    fn exists(&self, name: &str) -> StorageResult<bool> {
        Self::check_name(name)?;
        Ok(self.files.read().contains_key(name))
    }

    fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        Self::check_name(name)?;
        self.files
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::not_found(name))
    }

    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        Self::check_name(name)?;
        self.files.write().insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn append(&self, name: &str, data: &[u8]) -> StorageResult<u64> {
        Self::check_name(name)?;
        let mut files = self.files.write();
        let file = files.entry(name.to_string()).or_default();
        let offset = file.len() as u64;
        file.extend_from_slice(data);
        Ok(offset)
    }

    fn size(&self, name: &str) -> StorageResult<u64> {
        Self::check_name(name)?;
        Ok(self
            .files
            .read()
            .get(name)
            .map_or(0, |data| data.len() as u64))
    }
}
