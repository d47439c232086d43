//! Inspect command implementation.
//!
//! Reports the shape of a delimited file without knowing its record type:
//! header columns, row count, how many cells each row has, and which
//! child files sit next to it.

use std::collections::BTreeMap;
use std::path::Path;

use delimdb_codec::{split_line, unquote};
use delimdb_core::{child_file_name, TextEncoding};
use delimdb_storage::{FileBackend, StorageBackend};
use serde::Serialize;

use super::{CliError, CliResult, OutputFormat};

/// How to read the inspected file.
#[derive(Debug, Clone, Copy)]
pub struct InspectOptions {
    /// Cell separator.
    pub delimiter: char,
    /// Whether the first line after the skipped ones is a header.
    pub header: bool,
    /// Leading lines to skip before the header.
    pub line_skip: usize,
    /// Text encoding of the file.
    pub encoding: TextEncoding,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            delimiter: '|',
            header: true,
            line_skip: 0,
            encoding: TextEncoding::Utf8,
        }
    }
}

/// Shape of one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// File name relative to the data directory.
    pub file: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Header cells, unquoted.
    pub columns: Vec<String>,
    /// Non-blank data rows.
    pub rows: usize,
    /// Blank lines skipped.
    pub blank_lines: usize,
    /// Rows per cell count.
    pub cell_counts: BTreeMap<usize, usize>,
}

/// Inspection result for a main file and its child files.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    /// Encoding used to decode the files.
    pub encoding: &'static str,
    /// The main file.
    pub main: FileReport,
    /// Child files found next to it.
    pub children: Vec<FileReport>,
}

/// Inspects `file` under `dir`.
pub fn run(dir: &Path, file: &str, options: &InspectOptions) -> CliResult<InspectReport> {
    let backend = FileBackend::new(dir);
    if !backend.exists(file)? {
        return Err(CliError::FileNotFound(file.to_string()));
    }

    let main = inspect_file(&backend, file, options)?;
    // Child rows never carry skipped lines.
    let child_options = InspectOptions {
        line_skip: 0,
        ..*options
    };
    let children = find_children(dir, file)?
        .iter()
        .map(|name| inspect_file(&backend, name, &child_options))
        .collect::<CliResult<Vec<_>>>()?;

    Ok(InspectReport {
        encoding: options.encoding.name(),
        main,
        children,
    })
}

fn inspect_file(
    backend: &FileBackend,
    file: &str,
    options: &InspectOptions,
) -> CliResult<FileReport> {
    let bytes = backend.read(file)?;
    let text = options.encoding.decode(&bytes)?;
    tracing::debug!(file, bytes = bytes.len(), "inspecting");

    let mut lines = text.lines().skip(options.line_skip);
    let columns = if options.header {
        lines
            .next()
            .map(|header| {
                split_line(header, options.delimiter)
                    .into_iter()
                    .map(|cell| unquote(cell.trim()).into_owned())
                    .collect()
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let mut report = FileReport {
        file: file.to_string(),
        size_bytes: bytes.len() as u64,
        columns,
        rows: 0,
        blank_lines: 0,
        cell_counts: BTreeMap::new(),
    };
    for line in lines {
        if line.trim().is_empty() {
            report.blank_lines += 1;
            continue;
        }
        report.rows += 1;
        let cells = split_line(line, options.delimiter).len();
        *report.cell_counts.entry(cells).or_insert(0) += 1;
    }
    Ok(report)
}

/// Lists `{stem}.{field}.csv` files beside `file`, sorted by name.
fn find_children(dir: &Path, file: &str) -> CliResult<Vec<String>> {
    // The child name of a one-letter field gives the shared prefix.
    let probe = child_file_name(file, "x");
    let prefix = probe.strip_suffix("x.csv").unwrap_or(&probe);
    let (folder, name_prefix) = match prefix.rfind(['/', '\\']) {
        Some(split) => (&prefix[..split], &prefix[split + 1..]),
        None => ("", prefix),
    };

    let mut children = Vec::new();
    let entries = match std::fs::read_dir(dir.join(folder)) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(children),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let field = name
            .strip_prefix(name_prefix)
            .and_then(|rest| rest.strip_suffix(".csv"));
        if matches!(field, Some(f) if !f.is_empty() && !f.contains('.')) {
            children.push(if folder.is_empty() {
                name
            } else {
                format!("{folder}/{name}")
            });
        }
    }
    children.retain(|child| child != file);
    children.sort();
    Ok(children)
}

/// Prints an inspection report.
pub fn print(report: &InspectReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("Encoding: {}", report.encoding);
            print_file(&report.main);
            for child in &report.children {
                println!();
                print_file(child);
            }
        }
    }
    Ok(())
}

fn print_file(report: &FileReport) {
    println!("{}", report.file);
    println!("{}", "=".repeat(report.file.len()));
    println!("Size:        {} bytes", report.size_bytes);
    if report.columns.is_empty() {
        println!("Columns:     (no header)");
    } else {
        println!("Columns:     {}", report.columns.join(", "));
    }
    println!("Rows:        {}", report.rows);
    if report.blank_lines > 0 {
        println!("Blank lines: {}", report.blank_lines);
    }
    for (cells, rows) in &report.cell_counts {
        let marker = if !report.columns.is_empty() && *cells != report.columns.len() {
            "  (mismatch)"
        } else {
            ""
        };
        println!("  {cells} cells: {rows} rows{marker}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn inspect_main_and_children() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Host.csv"),
            "Id|Name|Age\nh1|one|1\n\nh2|two|2|extra\n",
        )
        .unwrap();
        fs::write(dir.path().join("Host.Disks.csv"), "Id|Label\nh1|C\n").unwrap();
        fs::write(dir.path().join("Host.Disks.csv.bak"), "ignored").unwrap();
        fs::write(dir.path().join("Other.csv"), "x\n").unwrap();

        let report = run(dir.path(), "Host.csv", &InspectOptions::default()).unwrap();
        assert_eq!(report.main.columns, vec!["Id", "Name", "Age"]);
        assert_eq!(report.main.rows, 2);
        assert_eq!(report.main.blank_lines, 1);
        assert_eq!(
            report.main.cell_counts,
            BTreeMap::from([(3, 1), (4, 1)])
        );

        assert_eq!(report.children.len(), 1);
        assert_eq!(report.children[0].file, "Host.Disks.csv");
        assert_eq!(report.children[0].rows, 1);
    }

    #[test]
    fn inspect_headerless_with_skip() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.txt"), "# exported\na;b\nc;d\n").unwrap();

        let options = InspectOptions {
            delimiter: ';',
            header: false,
            line_skip: 1,
            ..InspectOptions::default()
        };
        let report = run(dir.path(), "data.txt", &options).unwrap();
        assert!(report.main.columns.is_empty());
        assert_eq!(report.main.rows, 2);
        assert_eq!(report.main.cell_counts, BTreeMap::from([(2, 2)]));
        assert!(report.children.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), "nope.csv", &InspectOptions::default()).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(name) if name == "nope.csv"));
    }
}
