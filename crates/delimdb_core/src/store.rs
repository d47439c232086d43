//! The keyed record store.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use delimdb_codec::{format_record, header_line, parse_keyed_record, Record, Value};
use delimdb_storage::{FileBackend, StorageBackend};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::autosave::{AutoSaver, SaveJob, SavePhase};
use crate::children::{ChildFiles, TIMESTAMP_LAYOUT};
use crate::config::StoreConfig;
use crate::diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{CoreError, CoreResult};
use crate::key::StoreKey;
use crate::stats::{StatsSnapshot, StoreStats};

/// Line terminator written on save.
#[cfg(windows)]
pub const NEWLINE: &str = "\r\n";
/// Line terminator written on save.
#[cfg(not(windows))]
pub const NEWLINE: &str = "\n";

/// Extension of file names derived from a record type.
const DEFAULT_EXTENSION: &str = "csv";

/// Outcome of a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Resolved file name.
    pub file: String,
    /// Data lines read, excluding skipped, header, and blank lines.
    pub rows_read: usize,
    /// Rows that became records.
    pub rows_loaded: usize,
    /// Rows skipped for parse, key, or duplicate errors.
    pub rows_dropped: usize,
    /// Elements attached from child files.
    pub child_rows: usize,
}

/// Outcome of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    /// Resolved file name.
    pub file: String,
    /// Records written to the main file.
    pub records: usize,
    /// Elements written to child files.
    pub child_rows: usize,
}

struct StoreState<K, R> {
    records: IndexMap<K, R>,
    file_name: Option<String>,
    config: StoreConfig,
}

struct Shared<K, R> {
    state: Mutex<StoreState<K, R>>,
    backend: Arc<dyn StorageBackend>,
    sink: RwLock<Arc<dyn DiagnosticSink>>,
    stats: StoreStats,
    saver: AutoSaver,
}

/// An ordered, keyed collection of records persisted to delimited text.
///
/// `CsvStore` is a cheap handle; clones share the same records. Every
/// operation takes the store lock for its full duration, including the
/// background save. Diagnostics raised under the lock are delivered to the
/// sink after it is released.
///
/// # Example
///
/// ```rust,ignore
/// use delimdb_core::{CsvStore, StoreConfig};
///
/// let store: CsvStore<String, Machine> = CsvStore::open("data");
/// store.add(Machine { id: "1234567890".into(), ..Default::default() });
/// assert!(store.save(None)); // writes data/Machine.csv
///
/// let copy: CsvStore<String, Machine> = CsvStore::open("data");
/// assert_eq!(copy.load(None), 1);
/// ```
///
/// # Auto-save
///
/// With [`StoreConfig::auto_save`] every successful mutation schedules a
/// background save. Call [`CsvStore::close`] before the process exits to
/// wait for it; dropping the last handle does not wait.
pub struct CsvStore<K: StoreKey, R: Record> {
    shared: Arc<Shared<K, R>>,
}

impl<K: StoreKey, R: Record> Clone for CsvStore<K, R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K: StoreKey, R: Record> std::fmt::Debug for CsvStore<K, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("CsvStore")
            .field("type_name", &R::schema().type_name())
            .field("len", &state.records.len())
            .field("file_name", &state.file_name)
            .field("config", &state.config)
            .finish()
    }
}

impl<K: StoreKey, R: Record> CsvStore<K, R> {
    /// Creates an empty store over `backend` with the default configuration.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_config(backend, StoreConfig::default())
    }

    /// Creates an empty store over `backend`.
    pub fn with_config(backend: Arc<dyn StorageBackend>, config: StoreConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(StoreState {
                    records: IndexMap::new(),
                    file_name: None,
                    config,
                }),
                backend,
                sink: RwLock::new(Arc::new(TracingSink)),
                stats: StoreStats::new(),
                saver: AutoSaver::new(),
            }),
        }
    }

    /// Creates an empty store whose files live under `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(dir)))
    }

    /// Creates an empty store under `dir` with `config`.
    pub fn open_with_config(dir: impl Into<PathBuf>, config: StoreConfig) -> Self {
        Self::with_config(Arc::new(FileBackend::new(dir)), config)
    }

    /// Replaces the diagnostic sink.
    pub fn set_sink(&self, sink: Arc<dyn DiagnosticSink>) {
        *self.shared.sink.write() = sink;
    }

    /// Returns the current configuration.
    pub fn config(&self) -> StoreConfig {
        self.shared.state.lock().config
    }

    /// Replaces the configuration. Takes effect on the next operation.
    pub fn set_config(&self, config: StoreConfig) {
        self.shared.state.lock().config = config;
    }

    /// Returns the cached file name, if one was resolved or set.
    pub fn file_name(&self) -> Option<String> {
        self.shared.state.lock().file_name.clone()
    }

    /// Sets the file name used by calls that omit one.
    pub fn set_file_name(&self, name: impl Into<String>) {
        self.shared.state.lock().file_name = Some(name.into());
    }

    /// Returns the storage backend.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.shared.backend
    }

    /// Returns a snapshot of the store counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    // === Mutations ===

    /// Adds `record` under the key its fields select.
    ///
    /// Returns false, reporting why, if the key is null, cannot be
    /// converted, or is already present.
    pub fn add(&self, record: R) -> bool {
        let Some(key) = self.shared.select_key(&record) else {
            return false;
        };
        let deferred = CollectingSink::new();
        let added = {
            let mut state = self.shared.state.lock();
            self.shared.insert_new(&mut state, key, record, &deferred)
        };
        self.shared.forward(&deferred);
        self.after_mutation(added)
    }

    /// Adds `record` under `key`. Returns false if `key` is present.
    pub fn add_with_key(&self, key: K, record: R) -> bool {
        let deferred = CollectingSink::new();
        let added = {
            let mut state = self.shared.state.lock();
            self.shared.insert_new(&mut state, key, record, &deferred)
        };
        self.shared.forward(&deferred);
        self.after_mutation(added)
    }

    /// Adds `record`, replacing any record under the same selected key.
    ///
    /// A replaced record keeps its position. Returns false only if no key
    /// could be selected.
    pub fn add_or_update(&self, record: R) -> bool {
        let stored = match self.shared.select_key(&record) {
            Some(key) => {
                self.shared.state.lock().records.insert(key, record);
                true
            }
            None => false,
        };
        self.after_mutation(stored)
    }

    /// Stores `record` under `key`, replacing any previous record.
    pub fn add_or_update_with_key(&self, key: K, record: R) {
        self.shared.state.lock().records.insert(key, record);
        self.after_mutation(true);
    }

    /// Replaces the record under `record`'s selected key.
    ///
    /// Returns false if no such record exists.
    pub fn replace(&self, record: R) -> bool {
        let replaced = match self.shared.select_key(&record) {
            Some(key) => replace_existing(&mut self.shared.state.lock().records, &key, record),
            None => false,
        };
        self.after_mutation(replaced)
    }

    /// Replaces the record under `key`. Returns false if none exists.
    pub fn replace_with_key(&self, key: &K, record: R) -> bool {
        let replaced = replace_existing(&mut self.shared.state.lock().records, key, record);
        self.after_mutation(replaced)
    }

    /// Removes the record under `key`, keeping the order of the rest.
    pub fn remove(&self, key: &K) -> bool {
        let removed = self.shared.state.lock().records.shift_remove(key).is_some();
        self.after_mutation(removed)
    }

    /// Removes every record.
    pub fn clear(&self) {
        let changed = {
            let mut state = self.shared.state.lock();
            let had_records = !state.records.is_empty();
            state.records.clear();
            had_records
        };
        self.after_mutation(changed);
    }

    // === Queries ===

    /// Returns true if a record is stored under `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.shared.state.lock().records.contains_key(key)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.shared.state.lock().records.len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().records.is_empty()
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> Vec<K> {
        self.shared.state.lock().records.keys().cloned().collect()
    }

    /// Runs `f` on the record under `key`.
    pub fn with_record<T>(&self, key: &K, f: impl FnOnce(&R) -> T) -> Option<T> {
        self.shared.state.lock().records.get(key).map(f)
    }

    // === Persistence ===

    /// Loads `file` (or the cached or type-derived name), replacing the
    /// current records.
    ///
    /// Returns the number of data rows read; 0 when the file is missing
    /// or the load fails. Failures go to the diagnostic sink.
    pub fn load(&self, file: Option<&str>) -> usize {
        match self.try_load(file) {
            Ok(summary) => summary.rows_read,
            Err(e) => {
                self.shared.report(Diagnostic::LoadFailed {
                    error: e.to_string(),
                });
                0
            }
        }
    }

    /// Loads like [`CsvStore::load`], returning errors instead of
    /// reporting them.
    ///
    /// # Errors
    ///
    /// Returns an error if no file name resolves, the backend fails, or
    /// the text does not decode. Row-level problems are reported, not
    /// returned.
    pub fn try_load(&self, file: Option<&str>) -> CoreResult<LoadSummary> {
        let deferred = CollectingSink::new();
        let result = {
            let mut state = self.shared.state.lock();
            self.shared.load_locked(&mut state, file, &deferred)
        };
        self.shared.forward(&deferred);
        result
    }

    /// Saves every record to `file` (or the cached or type-derived name).
    ///
    /// Returns false if the store is empty or the save fails.
    pub fn save(&self, file: Option<&str>) -> bool {
        match self.try_save(file) {
            Ok(_) => true,
            Err(CoreError::EmptyStore) => false,
            Err(e) => {
                self.shared.report(Diagnostic::SaveFailed {
                    error: e.to_string(),
                    background: false,
                });
                false
            }
        }
    }

    /// Saves like [`CsvStore::save`], returning errors instead of
    /// reporting them.
    ///
    /// # Errors
    ///
    /// Returns `EmptyStore` for an empty store, or the first file name,
    /// encoding, or backend error.
    pub fn try_save(&self, file: Option<&str>) -> CoreResult<SaveSummary> {
        let deferred = CollectingSink::new();
        let result = {
            let mut state = self.shared.state.lock();
            self.shared.save_locked(&mut state, file, &deferred)
        };
        self.shared.forward(&deferred);
        self.shared.record_save(&result, false);
        result
    }

    /// Saves to the cached file and loads it back under one lock.
    ///
    /// Returns false if either step fails.
    pub fn flush_and_reload(&self) -> bool {
        let deferred = CollectingSink::new();
        let result = {
            let mut state = self.shared.state.lock();
            let saved = self.shared.save_locked(&mut state, None, &deferred);
            self.shared.record_save(&saved, false);
            match saved {
                Ok(_) => self
                    .shared
                    .load_locked(&mut state, None, &deferred)
                    .map_err(|e| {
                        Some(Diagnostic::LoadFailed {
                            error: e.to_string(),
                        })
                    }),
                Err(CoreError::EmptyStore) => Err(None),
                Err(e) => Err(Some(Diagnostic::SaveFailed {
                    error: e.to_string(),
                    background: false,
                })),
            }
        };
        self.shared.forward(&deferred);
        match result {
            Ok(_) => true,
            Err(failure) => {
                if let Some(diagnostic) = failure {
                    self.shared.report(diagnostic);
                }
                false
            }
        }
    }

    /// Waits for any background save, then stops scheduling new ones.
    ///
    /// The store stays usable; later mutations are not saved
    /// automatically.
    pub fn close(&self) {
        self.shared.saver.close();
    }

    /// Returns true once [`CsvStore::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.shared.saver.is_closed()
    }

    /// Returns the auto-save coordinator's phase.
    pub fn save_phase(&self) -> SavePhase {
        self.shared.saver.phase()
    }

    fn after_mutation(&self, changed: bool) -> bool {
        if !changed {
            return false;
        }
        self.shared.stats.record_mutation();

        let auto_save = self.shared.state.lock().config.auto_save;
        if auto_save {
            let weak: Weak<Shared<K, R>> = Arc::downgrade(&self.shared);
            let job: SaveJob = Arc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.background_save();
                }
            });
            self.shared.saver.schedule(job);
        }
        true
    }
}

impl<K: StoreKey, R: Record + Clone> CsvStore<K, R> {
    /// Returns a copy of the record under `key`.
    pub fn try_get(&self, key: &K) -> Option<R> {
        self.shared.state.lock().records.get(key).cloned()
    }

    /// Returns copies of all entries in insertion order.
    pub fn records(&self) -> Vec<(K, R)> {
        self.shared
            .state
            .lock()
            .records
            .iter()
            .map(|(k, r)| (k.clone(), r.clone()))
            .collect()
    }
}

fn replace_existing<K: StoreKey, R>(records: &mut IndexMap<K, R>, key: &K, record: R) -> bool {
    match records.get_mut(key) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

/// Converts a selected key value, reporting null or unconvertible keys.
fn convert_key<K: StoreKey>(
    value: Value,
    line: Option<usize>,
    sink: &dyn DiagnosticSink,
) -> Option<K> {
    if value.is_null() {
        sink.report(Diagnostic::NullKey { line });
        return None;
    }
    let text = value.to_cell();
    match K::from_value(value) {
        Ok(key) => Some(key),
        Err(e) => {
            sink.report(Diagnostic::KeyRejected {
                line,
                value: text,
                reason: e.to_string(),
            });
            None
        }
    }
}

/// Picks the file name: explicit, then cached, then `{TypeName}.csv`.
/// The result is cached.
fn resolve_file_name<R: Record>(
    cached: &mut Option<String>,
    explicit: Option<&str>,
) -> CoreResult<String> {
    let name = match explicit.filter(|n| !n.trim().is_empty()) {
        Some(name) => name.to_string(),
        None => match cached.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let type_name = R::schema().type_name();
                if type_name.trim().is_empty() {
                    return Err(CoreError::FileNameUnresolved);
                }
                format!("{type_name}.{DEFAULT_EXTENSION}")
            }
        },
    };
    *cached = Some(name.clone());
    Ok(name)
}

impl<K: StoreKey, R: Record> Shared<K, R> {
    fn sink(&self) -> Arc<dyn DiagnosticSink> {
        Arc::clone(&self.sink.read())
    }

    fn report(&self, diagnostic: Diagnostic) {
        self.sink().report(diagnostic);
    }

    /// Delivers diagnostics held back while the store lock was taken.
    fn forward(&self, deferred: &CollectingSink) {
        let events = deferred.take();
        if events.is_empty() {
            return;
        }
        let sink = self.sink();
        for diagnostic in events {
            sink.report(diagnostic);
        }
    }

    /// Converts the key `record` selects. Call without the store lock.
    fn select_key(&self, record: &R) -> Option<K> {
        let sink = self.sink();
        convert_key(record.key(), None, sink.as_ref())
    }

    fn insert_new(
        &self,
        state: &mut StoreState<K, R>,
        key: K,
        record: R,
        sink: &dyn DiagnosticSink,
    ) -> bool {
        if state.records.contains_key(&key) {
            sink.report(Diagnostic::DuplicateKey {
                line: None,
                key: key.to_cell(),
            });
            return false;
        }
        state.records.insert(key, record);
        true
    }

    fn record_save(&self, result: &CoreResult<SaveSummary>, background: bool) {
        match result {
            Err(CoreError::EmptyStore) => {}
            other => self.stats.record_save(other.is_ok(), background),
        }
    }

    fn load_locked(
        &self,
        state: &mut StoreState<K, R>,
        file: Option<&str>,
        sink: &dyn DiagnosticSink,
    ) -> CoreResult<LoadSummary> {
        let file = resolve_file_name::<R>(&mut state.file_name, file)?;
        let mut summary = LoadSummary {
            file: file.clone(),
            rows_read: 0,
            rows_loaded: 0,
            rows_dropped: 0,
            child_rows: 0,
        };

        if !self.backend.exists(&file)? {
            sink.report(Diagnostic::FileMissing { file });
            return Ok(summary);
        }
        let bytes = self.backend.read(&file)?;
        let text = state.config.encoding.decode(&bytes)?;
        state.records.clear();

        let format = state.config.line_format();
        let mut header_pending = state.config.header;
        for (index, line) in text.lines().enumerate() {
            if index < state.config.line_skip {
                continue;
            }
            if header_pending {
                header_pending = false;
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            summary.rows_read += 1;
            let number = index + 1;
            let (key, record) = match parse_keyed_record::<R>(line, &format) {
                Ok(parsed) => parsed,
                Err(reason) => {
                    sink.report(Diagnostic::RowDropped {
                        file: file.clone(),
                        line: number,
                        reason,
                    });
                    summary.rows_dropped += 1;
                    continue;
                }
            };
            let Some(key) = convert_key::<K>(key, Some(number), sink) else {
                summary.rows_dropped += 1;
                continue;
            };
            if state.records.contains_key(&key) {
                sink.report(Diagnostic::DuplicateKey {
                    line: Some(number),
                    key: key.to_cell(),
                });
                summary.rows_dropped += 1;
                continue;
            }
            state.records.insert(key, record);
            summary.rows_loaded += 1;
        }

        if state.config.load_children {
            let children = ChildFiles {
                backend: self.backend.as_ref(),
                sink,
                config: &state.config,
                base: &file,
                newline: NEWLINE,
            };
            summary.child_rows = children.load(&mut state.records)?;
        }

        self.stats
            .record_load(summary.rows_loaded as u64, summary.rows_dropped as u64);
        tracing::debug!(
            file = %summary.file,
            read = summary.rows_read,
            loaded = summary.rows_loaded,
            dropped = summary.rows_dropped,
            "store loaded"
        );
        Ok(summary)
    }

    fn save_locked(
        &self,
        state: &mut StoreState<K, R>,
        file: Option<&str>,
        sink: &dyn DiagnosticSink,
    ) -> CoreResult<SaveSummary> {
        let file = resolve_file_name::<R>(&mut state.file_name, file)?;
        if state.records.is_empty() {
            return Err(CoreError::EmptyStore);
        }

        let config = state.config;
        let mut text = String::new();
        if config.header {
            text.push_str(&header_line(R::schema(), config.delimiter));
            text.push_str(NEWLINE);
        }
        for record in state.records.values() {
            text.push_str(&format_record(record, config.delimiter));
            text.push_str(NEWLINE);
        }
        let bytes = config.encoding.encode(&text, true)?;
        self.backend.write(&file, &bytes)?;

        let timestamp = chrono::Local::now().format(TIMESTAMP_LAYOUT).to_string();
        let children = ChildFiles {
            backend: self.backend.as_ref(),
            sink,
            config: &config,
            base: &file,
            newline: NEWLINE,
        };
        let child_rows = children.save(&mut state.records, &timestamp)?;

        let records = state.records.len();
        tracing::debug!(file = %file, records, child_rows, "store saved");
        Ok(SaveSummary {
            file,
            records,
            child_rows,
        })
    }

    fn background_save(&self) {
        let deferred = CollectingSink::new();
        let result = {
            let mut state = self.state.lock();
            self.save_locked(&mut state, None, &deferred)
        };
        self.forward(&deferred);
        self.record_save(&result, true);
        match result {
            Ok(_) => {}
            Err(CoreError::EmptyStore) => {
                tracing::debug!("background save skipped: store is empty");
            }
            Err(e) => self.report(Diagnostic::SaveFailed {
                error: e.to_string(),
                background: true,
            }),
        }
    }
}
