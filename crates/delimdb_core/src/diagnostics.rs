//! Reporting of failures the store absorbs instead of returning.
//!
//! Dropped rows, rejected keys, and failed background saves never surface
//! as errors from the call that caused them. They are handed to a
//! [`DiagnosticSink`] instead. The default sink logs through `tracing`;
//! tests install a [`CollectingSink`] and inspect what was reported.
//!
//! # Usage
//!
//! ```rust,ignore
//! let sink = Arc::new(CollectingSink::new());
//! store.set_sink(sink.clone());
//! store.load(None);
//!
//! for event in sink.take() {
//!     println!("{event}");
//! }
//! ```

use std::fmt;

use delimdb_codec::RowError;
use parking_lot::Mutex;

/// An absorbed failure or notable event.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A line could not become a record and was skipped.
    RowDropped {
        /// File the line came from.
        file: String,
        /// 1-based line number.
        line: usize,
        /// Why the row was dropped.
        reason: RowError,
    },

    /// A record had no key value and was not stored.
    NullKey {
        /// Source line, when the record came from a file.
        line: Option<usize>,
    },

    /// A key value could not be converted to the store's key type.
    KeyRejected {
        /// Source line, when the record came from a file.
        line: Option<usize>,
        /// The offending value as text.
        value: String,
        /// Conversion failure.
        reason: String,
    },

    /// A record's key was already present.
    DuplicateKey {
        /// Source line, when the record came from a file.
        line: Option<usize>,
        /// The key as text.
        key: String,
    },

    /// A child row named an owner key that is not in the store.
    OrphanChildRow {
        /// Child file name.
        file: String,
        /// 1-based line number.
        line: usize,
        /// The owner key cell.
        owner: String,
    },

    /// The file to load does not exist.
    FileMissing {
        /// Resolved file name.
        file: String,
    },

    /// A load failed as a whole.
    LoadFailed {
        /// Error description.
        error: String,
    },

    /// A save failed as a whole.
    SaveFailed {
        /// Error description.
        error: String,
        /// Whether the auto-save worker ran it.
        background: bool,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = |line: &Option<usize>| line.map(|l| format!(" at line {l}")).unwrap_or_default();
        match self {
            Diagnostic::RowDropped { file, line, reason } => {
                write!(f, "{file}:{line}: row dropped: {reason}")
            }
            Diagnostic::NullKey { line } => write!(f, "record without key{}", at(line)),
            Diagnostic::KeyRejected {
                line,
                value,
                reason,
            } => write!(f, "key {value:?} rejected{}: {reason}", at(line)),
            Diagnostic::DuplicateKey { line, key } => {
                write!(f, "duplicate key {key:?}{}", at(line))
            }
            Diagnostic::OrphanChildRow { file, line, owner } => {
                write!(f, "{file}:{line}: no record with key {owner:?}")
            }
            Diagnostic::FileMissing { file } => write!(f, "{file} does not exist"),
            Diagnostic::LoadFailed { error } => write!(f, "load failed: {error}"),
            Diagnostic::SaveFailed { error, background } => {
                let kind = if *background { "background save" } else { "save" };
                write!(f, "{kind} failed: {error}")
            }
        }
    }
}

/// Receiver of [`Diagnostic`]s.
///
/// The store delivers diagnostics after releasing its lock, so a sink may
/// read from or mutate the store that reported them.
pub trait DiagnosticSink: Send + Sync {
    /// Accepts one diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}

/// Logs diagnostics through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::FileMissing { .. } => tracing::debug!("{diagnostic}"),
            _ => tracing::warn!("{diagnostic}"),
        }
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected diagnostics.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    /// Removes and returns the collected diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Returns the number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.events.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.report(Diagnostic::NullKey { line: Some(3) });
        sink.report(Diagnostic::FileMissing {
            file: "User.csv".into(),
        });

        assert_eq!(sink.len(), 2);
        let events = sink.take();
        assert_eq!(events[0], Diagnostic::NullKey { line: Some(3) });
        assert!(sink.is_empty());
    }

    #[test]
    fn display_includes_location() {
        let event = Diagnostic::RowDropped {
            file: "Machine.csv".into(),
            line: 4,
            reason: RowError::MissingKeyCell,
        };
        assert_eq!(
            event.to_string(),
            "Machine.csv:4: row dropped: first column is empty"
        );

        let event = Diagnostic::DuplicateKey {
            line: None,
            key: "7".into(),
        };
        assert_eq!(event.to_string(), "duplicate key \"7\"");
    }

    #[test]
    fn tracing_sink_accepts_everything() {
        TracingSink.report(Diagnostic::SaveFailed {
            error: "disk full".into(),
            background: true,
        });
    }
}
