//! Child files for collection fields.
//!
//! A collection field never appears in the main file. Its elements are
//! written to a sibling file named after the base file and the field,
//! one row per element, prefixed with the owner's key:
//!
//! ```text
//! Machine.csv           Id|Name|Age|BytesArray
//! Machine.Disks.csv     Id|Label|SizeGb
//!                       1234567890|C|256
//!                       1234567890|D|1024
//! ```
//!
//! Without child loading the files are append-only logs and the in-memory
//! collections are emptied after each save. With child loading each file
//! is rewritten on save and read back on load.

use std::collections::HashMap;

use delimdb_codec::{
    format_row, header_line, parse_row, split_line, unquote, Record, RowError, Schema, Value,
};
use delimdb_storage::StorageBackend;
use indexmap::IndexMap;

use crate::config::StoreConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::CoreResult;
use crate::key::StoreKey;

/// Child files at or below this size get a header before the first row.
pub const HEADER_THRESHOLD: u64 = 3;

/// Header name of the owner key column.
pub const OWNER_COLUMN: &str = "Id";

/// Header name of the timestamp column.
pub const TIMESTAMP_COLUMN: &str = "Date";

/// Layout of the timestamp column.
pub const TIMESTAMP_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

/// Returns the child file name for `field` next to `base`.
///
/// The extension of `base`'s final path component is replaced by
/// `.{field}.csv`; directories are kept.
///
/// ```
/// use delimdb_core::child_file_name;
///
/// assert_eq!(child_file_name("Machine.csv", "Disks"), "Machine.Disks.csv");
/// assert_eq!(child_file_name("data/v1.2/hosts", "Tags"), "data/v1.2/hosts.Tags.csv");
/// ```
#[must_use]
pub fn child_file_name(base: &str, field: &str) -> String {
    let name_start = base.rfind(|c| c == '/' || c == '\\').map_or(0, |i| i + 1);
    let stem_end = match base[name_start..].rfind('.') {
        Some(dot) if dot > 0 => name_start + dot,
        _ => base.len(),
    };
    format!("{}.{}.csv", &base[..stem_end], field)
}

/// Renders a child file header for `element`.
#[must_use]
pub fn child_header(element: &Schema, delimiter: char, timestamp: bool) -> String {
    let mut line = String::from(OWNER_COLUMN);
    if element.column_count() > 0 {
        line.push(delimiter);
        line.push_str(&header_line(element, delimiter));
    }
    if timestamp {
        line.push(delimiter);
        line.push_str(TIMESTAMP_COLUMN);
    }
    line
}

/// Shared inputs of one save or load pass over the child files.
pub(crate) struct ChildFiles<'a> {
    pub backend: &'a dyn StorageBackend,
    pub sink: &'a dyn DiagnosticSink,
    pub config: &'a StoreConfig,
    pub base: &'a str,
    pub newline: &'a str,
}

impl ChildFiles<'_> {
    /// Writes every collection field of `records` to its child file.
    ///
    /// Returns the number of element rows written.
    pub fn save<K: StoreKey, R: Record>(
        &self,
        records: &mut IndexMap<K, R>,
        timestamp: &str,
    ) -> CoreResult<usize> {
        let schema = R::schema();
        let mut total = 0;

        for (field_index, field) in schema.collections() {
            let Some(element) = field.kind().element_schema() else {
                continue;
            };
            let name = child_file_name(self.base, field.name());
            let written = self.save_field(records, field_index, element, &name, timestamp)?;
            tracing::debug!(file = %name, rows = written, "child file saved");
            total += written;

            if !self.config.load_children {
                for record in records.values_mut() {
                    record.set(field_index, Value::List(Vec::new()))?;
                }
            }
        }

        Ok(total)
    }

    fn save_field<K: StoreKey, R: Record>(
        &self,
        records: &IndexMap<K, R>,
        field_index: usize,
        element: &Schema,
        name: &str,
        timestamp: &str,
    ) -> CoreResult<usize> {
        let delimiter = self.config.delimiter;
        let rewrite = self.config.load_children;
        let existing = if rewrite {
            0
        } else {
            self.backend.size(name)?
        };

        let mut text = String::new();
        if self.config.header && existing <= HEADER_THRESHOLD {
            text.push_str(&child_header(element, delimiter, self.config.add_timestamp));
            text.push_str(self.newline);
        }

        let mut rows = 0;
        for (key, record) in records {
            let Value::List(elements) = record.get(field_index) else {
                continue;
            };
            let owner = key.to_cell();
            for values in &elements {
                text.push_str(&owner);
                text.push(delimiter);
                text.push_str(&format_row(element, values, delimiter));
                if self.config.add_timestamp {
                    text.push(delimiter);
                    text.push_str(timestamp);
                }
                text.push_str(self.newline);
                rows += 1;
            }
        }

        if rewrite {
            let bytes = self.config.encoding.encode(&text, true)?;
            self.backend.write(name, &bytes)?;
        } else if rows > 0 {
            let bytes = self.config.encoding.encode(&text, existing == 0)?;
            self.backend.append(name, &bytes)?;
        }
        Ok(rows)
    }

    /// Reads every collection field's child file into `records`.
    ///
    /// Returns the number of element rows attached.
    pub fn load<K: StoreKey, R: Record>(&self, records: &mut IndexMap<K, R>) -> CoreResult<usize> {
        let schema = R::schema();
        let owners: HashMap<String, usize> = records
            .keys()
            .enumerate()
            .map(|(i, key)| (key.to_cell(), i))
            .collect();

        let mut total = 0;
        for (field_index, field) in schema.collections() {
            let Some(element) = field.kind().element_schema() else {
                continue;
            };
            let name = child_file_name(self.base, field.name());
            if !self.backend.exists(&name)? {
                continue;
            }
            let bytes = self.backend.read(&name)?;
            let text = self.config.encoding.decode(&bytes)?;

            let grouped = self.parse_field(&name, &text, element, &owners);
            for (owner_index, rows) in grouped {
                let Some((_, record)) = records.get_index_mut(owner_index) else {
                    continue;
                };
                let mut all = match record.get(field_index) {
                    Value::List(existing) => existing,
                    _ => Vec::new(),
                };
                total += rows.len();
                all.extend(rows);
                record.set(field_index, Value::List(all))?;
            }
            tracing::debug!(file = %name, "child file loaded");
        }
        Ok(total)
    }

    /// Groups the element rows of one child file by owner position.
    fn parse_field(
        &self,
        name: &str,
        text: &str,
        element: &Schema,
        owners: &HashMap<String, usize>,
    ) -> Vec<(usize, Vec<Vec<Value>>)> {
        let format = self.config.line_format();
        let columns = element.column_count();
        let mut order: Vec<usize> = Vec::new();
        let mut groups: HashMap<usize, Vec<Vec<Value>>> = HashMap::new();
        let mut header_pending = self.config.header;

        for (number, line) in text.lines().enumerate() {
            if header_pending {
                header_pending = false;
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            let cells = split_line(line, format.delimiter);
            let owner_cell = cells[0].trim();
            let owner = unquote(owner_cell);
            if owner.is_empty() {
                self.sink.report(Diagnostic::RowDropped {
                    file: name.to_string(),
                    line: number + 1,
                    reason: RowError::MissingKeyCell,
                });
                continue;
            }
            let Some(&owner_index) = owners.get(owner.as_ref()) else {
                self.sink.report(Diagnostic::OrphanChildRow {
                    file: name.to_string(),
                    line: number + 1,
                    owner: owner.into_owned(),
                });
                continue;
            };

            let mut rest = &cells[1..];
            // The trailing timestamp cell is only expected when timestamps are on.
            if self.config.add_timestamp && rest.len() == columns + 1 {
                rest = &rest[..columns];
            }
            match parse_row(element, rest, &format) {
                Ok(values) => {
                    groups
                        .entry(owner_index)
                        .or_insert_with(|| {
                            order.push(owner_index);
                            Vec::new()
                        })
                        .push(values);
                }
                Err(reason) => self.sink.report(Diagnostic::RowDropped {
                    file: name.to_string(),
                    line: number + 1,
                    reason,
                }),
            }
        }

        order
            .into_iter()
            .filter_map(|i| groups.remove(&i).map(|rows| (i, rows)))
            .collect()
    }
}
