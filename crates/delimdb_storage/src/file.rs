//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// File names are resolved relative to a root directory. Absolute names are
/// used as given. Parent directories are created on first write.
///
/// # Durability
///
/// - Every `write`/`append` flushes the file handle before returning
/// - With [`FileBackend::sync_on_write`] enabled, `File::sync_all()` is
///   called as well
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
/// Writers are serialized by an internal lock; readers share it.
///
/// # Example
///
/// ```no_run
/// use delimdb_storage::{StorageBackend, FileBackend};
///
/// let backend = FileBackend::new("data");
/// backend.write("users.csv", b"Id|Name\n").unwrap();
/// assert!(backend.exists("users.csv").unwrap());
/// ```
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    sync_on_write: bool,
    io_lock: RwLock<()>,
}

impl FileBackend {
    /// Creates a backend rooted at `root`.
    ///
    /// The directory is not touched until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sync_on_write: false,
            io_lock: RwLock::new(()),
        }
    }

    /// Creates a backend rooted at the current working directory.
    #[must_use]
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    /// Sets whether every write is followed by `sync_all`.
    #[must_use]
    pub fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a file name onto a path under the root.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for empty or whitespace-only names.
    pub fn path_of(&self, name: &str) -> StorageResult<PathBuf> {
        if name.trim().is_empty() {
            return Err(StorageError::invalid_name(name));
        }
        Ok(self.root.join(name))
    }

    fn create_parent(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.path_of(name)?;
        let _guard = self.io_lock.read();
        Ok(path.is_file())
    }

    fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_of(name)?;
        let _guard = self.io_lock.read();

        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(name)),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.path_of(name)?;
        let _guard = self.io_lock.write();

        Self::create_parent(&path)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.write_all(data)?;
        file.flush()?;
        if self.sync_on_write {
            file.sync_all()?;
        }
        Ok(())
    }

    fn append(&self, name: &str, data: &[u8]) -> StorageResult<u64> {
        let path = self.path_of(name)?;
        let _guard = self.io_lock.write();

        Self::create_parent(&path)?;
        let mut file = OpenOptions::new().append(true).create(true).open(&path)?;
        let offset = file.metadata()?.len();
        if data.is_empty() {
            return Ok(offset);
        }

        file.write_all(data)?;
        file.flush()?;
        if self.sync_on_write {
            file.sync_all()?;
        }
        Ok(offset)
    }

    fn size(&self, name: &str) -> StorageResult<u64> {
        let path = self.path_of(name)?;
        let _guard = self.io_lock.read();

        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
