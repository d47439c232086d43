//! DelimDB CLI
//!
//! Command-line tools for DelimDB data directories.
//!
//! # Commands
//!
//! - `demo` - Fill, save and reload a sample host inventory
//! - `inspect` - Report the shape of a delimited file and its child files

mod commands;
mod model;

use clap::{Parser, Subcommand};
use commands::demo::DemoOptions;
use commands::inspect::InspectOptions;
use commands::OutputFormat;
use delimdb_core::TextEncoding;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// DelimDB command-line tools.
#[derive(Parser)]
#[command(name = "delimdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory (defaults to the current directory)
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a store with sample hosts, save it and load it back
    Demo {
        /// Number of hosts to create
        #[arg(short, long, default_value = "10")]
        count: usize,

        /// Main file name (defaults to Host.csv)
        #[arg(long)]
        file: Option<String>,

        /// Save in the background after every change
        #[arg(short, long)]
        auto_save: bool,

        /// Rewrite child files and load them back
        #[arg(short, long)]
        load_children: bool,

        /// Add a timestamp column to child rows
        #[arg(short, long)]
        timestamp: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Report the shape of a delimited file and its child files
    Inspect {
        /// File name relative to the data directory
        file: String,

        /// Cell separator
        #[arg(short, long, default_value = "|")]
        delimiter: char,

        /// Treat the first line as data
        #[arg(long)]
        no_header: bool,

        /// Leading lines to skip
        #[arg(long, default_value = "0")]
        line_skip: usize,

        /// Decode as ISO-8859-1 instead of UTF-8
        #[arg(long)]
        latin1: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = cli.path.unwrap_or_else(|| PathBuf::from("."));
    match cli.command {
        Commands::Demo {
            count,
            file,
            auto_save,
            load_children,
            timestamp,
            format,
        } => {
            let format: OutputFormat = format.parse()?;
            let options = DemoOptions {
                count,
                file,
                auto_save,
                load_children,
                timestamp,
            };
            let report = commands::demo::run(&path, &options)?;
            commands::demo::print(&report, format)?;
        }
        Commands::Inspect {
            file,
            delimiter,
            no_header,
            line_skip,
            latin1,
            format,
        } => {
            let format: OutputFormat = format.parse()?;
            let options = InspectOptions {
                delimiter,
                header: !no_header,
                line_skip,
                encoding: if latin1 {
                    TextEncoding::Latin1
                } else {
                    TextEncoding::Utf8
                },
            };
            let report = commands::inspect::run(&path, &file, &options)?;
            commands::inspect::print(&report, format)?;
        }
        Commands::Version => {
            println!("DelimDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("DelimDB Core v{}", delimdb_core::VERSION);
        }
    }

    Ok(())
}
