//! Demo command implementation.
//!
//! Fills a store with sample hosts, persists it, and loads it back into a
//! second store to show what survives the round trip.

use std::path::Path;

use delimdb_codec::{NaiveDate, Record};
use delimdb_core::{child_file_name, CsvStore, StatsSnapshot, StoreConfig};
use delimdb_storage::StorageBackend;
use serde::Serialize;

use super::{CliResult, OutputFormat};
use crate::model::{Disk, Host};

/// Demo settings.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Number of hosts to create.
    pub count: usize,
    /// Main file name; `Host.csv` when absent.
    pub file: Option<String>,
    /// Save in the background after every add.
    pub auto_save: bool,
    /// Rewrite child files and load them back.
    pub load_children: bool,
    /// Add a timestamp column to child rows.
    pub timestamp: bool,
}

impl DemoOptions {
    fn config(&self) -> StoreConfig {
        StoreConfig::new()
            .auto_save(self.auto_save)
            .load_children(self.load_children)
            .add_timestamp(self.timestamp)
    }
}

/// Demo outcome.
#[derive(Debug, Serialize)]
pub struct DemoReport {
    /// Main file name.
    pub file: String,
    /// Hosts added.
    pub added: usize,
    /// Data rows read back.
    pub rows_read: usize,
    /// Hosts loaded back.
    pub loaded: usize,
    /// Collection elements loaded back.
    pub child_rows: usize,
    /// Child files present after saving.
    pub child_files: Vec<String>,
    /// Counters of the writing store.
    pub writer: StatsReport,
}

/// Serializable store counters.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    /// Successful saves.
    pub saves: u64,
    /// Saves run in the background.
    pub background_saves: u64,
    /// Mutations applied.
    pub mutations: u64,
}

impl From<StatsSnapshot> for StatsReport {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            saves: stats.saves,
            background_saves: stats.background_saves,
            mutations: stats.mutations,
        }
    }
}

/// Builds the `index`th sample host.
pub fn sample_host(index: usize) -> Host {
    let day = u32::try_from(index % 28).unwrap_or(0) + 1;
    Host {
        id: format!("host-{index:03}"),
        name: format!("node{index}.lab"),
        age: i32::try_from(index % 10).unwrap_or(0) + 1,
        fingerprint: vec![(index % 256) as u8, 0xAB, 0xCD],
        seen: NaiveDate::from_ymd_opt(2024, 1, day).and_then(|d| d.and_hms_opt(12, 30, 0)),
        online: index % 2 == 0,
        session: index as u64,
        disks: vec![
            Disk {
                label: "C".into(),
                size_gb: 256,
            },
            Disk {
                label: "D".into(),
                size_gb: 1024 * (index as u64 % 4 + 1),
            },
        ],
        tags: vec![
            "lab".into(),
            if index % 2 == 0 { "even" } else { "odd" }.into(),
        ],
    }
}

/// Runs the demo in `dir`.
pub fn run(dir: &Path, options: &DemoOptions) -> CliResult<DemoReport> {
    let config = options.config();
    let writer: CsvStore<String, Host> = CsvStore::open_with_config(dir, config);
    if let Some(file) = &options.file {
        writer.set_file_name(file.clone());
    }

    let added = (0..options.count)
        .filter(|&i| writer.add(sample_host(i)))
        .count();
    tracing::info!(added, "hosts added");

    if options.auto_save {
        writer.close();
    } else {
        writer.try_save(None)?;
    }
    let file = writer
        .file_name()
        .unwrap_or_else(|| format!("{}.csv", Host::schema().type_name()));

    let child_files = Host::schema()
        .collections()
        .map(|(_, field)| child_file_name(&file, field.name()))
        .filter(|name| writer.backend().exists(name).unwrap_or(false))
        .collect();

    let reader: CsvStore<String, Host> = CsvStore::open_with_config(dir, config);
    let summary = reader.try_load(Some(&file))?;

    Ok(DemoReport {
        file,
        added,
        rows_read: summary.rows_read,
        loaded: summary.rows_loaded,
        child_rows: summary.child_rows,
        child_files,
        writer: writer.stats().into(),
    })
}

/// Prints a demo report.
pub fn print(report: &DemoReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("DelimDB Demo");
            println!("============");
            println!("File:          {}", report.file);
            println!("Hosts added:   {}", report.added);
            println!("Rows read:     {}", report.rows_read);
            println!("Hosts loaded:  {}", report.loaded);
            println!("Child rows:    {}", report.child_rows);
            for child in &report.child_files {
                println!("Child file:    {child}");
            }
            println!(
                "Saves:         {} ({} in background)",
                report.writer.saves, report.writer.background_saves
            );
        }
    }
    Ok(())
}
