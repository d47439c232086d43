//! Store statistics.
//!
//! # Usage
//!
//! ```rust,ignore
//! let store: CsvStore<String, User> = CsvStore::open(".");
//! store.load(None);
//!
//! let stats = store.stats();
//! println!("Rows loaded: {}", stats.rows_loaded);
//! println!("Rows dropped: {}", stats.rows_dropped);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Store counters.
///
/// All counters are atomic and monotonically increasing.
#[derive(Debug, Default)]
pub struct StoreStats {
    loads: AtomicU64,
    saves: AtomicU64,
    failed_saves: AtomicU64,
    background_saves: AtomicU64,
    rows_loaded: AtomicU64,
    rows_dropped: AtomicU64,
    mutations: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    // === Increment methods (internal use) ===

    /// Records a completed load.
    pub(crate) fn record_load(&self, loaded: u64, dropped: u64) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.rows_loaded.fetch_add(loaded, Ordering::Relaxed);
        self.rows_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Records a save attempt.
    pub(crate) fn record_save(&self, succeeded: bool, background: bool) {
        if succeeded {
            self.saves.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_saves.fetch_add(1, Ordering::Relaxed);
        }
        if background {
            self.background_saves.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a successful mutation.
    pub(crate) fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
    }

    // === Getter methods (public API) ===

    /// Returns the number of completed loads.
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Returns the number of successful saves.
    pub fn saves(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    /// Returns the number of failed saves.
    pub fn failed_saves(&self) -> u64 {
        self.failed_saves.load(Ordering::Relaxed)
    }

    /// Returns the number of saves run by the auto-save worker.
    pub fn background_saves(&self) -> u64 {
        self.background_saves.load(Ordering::Relaxed)
    }

    /// Returns the number of rows that became records.
    pub fn rows_loaded(&self) -> u64 {
        self.rows_loaded.load(Ordering::Relaxed)
    }

    /// Returns the number of rows skipped during loads.
    pub fn rows_dropped(&self) -> u64 {
        self.rows_dropped.load(Ordering::Relaxed)
    }

    /// Returns the number of mutations applied.
    pub fn mutations(&self) -> u64 {
        self.mutations.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            loads: self.loads(),
            saves: self.saves(),
            failed_saves: self.failed_saves(),
            background_saves: self.background_saves(),
            rows_loaded: self.rows_loaded(),
            rows_dropped: self.rows_dropped(),
            mutations: self.mutations(),
        }
    }
}

/// A point-in-time snapshot of store statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Completed loads.
    pub loads: u64,
    /// Successful saves.
    pub saves: u64,
    /// Failed saves.
    pub failed_saves: u64,
    /// Saves run by the auto-save worker, successful or not.
    pub background_saves: u64,
    /// Rows that became records.
    pub rows_loaded: u64,
    /// Rows skipped during loads.
    pub rows_dropped: u64,
    /// Mutations applied.
    pub mutations: u64,
}
