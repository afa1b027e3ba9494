//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Nested timesheets kept inside Markdown notes.
///
/// Reads and writes a timekeep document: a Markdown file with a ```timekeep
/// block, or a bare JSON file.
#[derive(Debug, Parser)]
#[command(name = "tk", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Timekeep document to use instead of the configured one.
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Reference time for running entries (ISO 8601 or e.g. '15 minutes ago').
    #[arg(long, global = true)]
    pub now: Option<String>,

    /// Show and read times at this UTC offset in hours instead of local time.
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an empty document if none exists.
    Init,

    /// Show entries in display order with their durations.
    Show,

    /// Print the total duration.
    Total,

    /// Start a new running entry.
    Start {
        /// Entry name. Blank names are numbered automatically.
        #[arg(long, default_value = "")]
        name: String,

        /// Nest the entry under this entry (id or unique id prefix).
        #[arg(long)]
        parent: Option<String>,
    },

    /// Stop every running entry.
    Stop,

    /// Rename an entry or change its times.
    Edit {
        /// Entry id or unique id prefix.
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// New start time, in the configured timestamp format.
        #[arg(long)]
        start: Option<String>,

        /// New end time, in the configured timestamp format.
        #[arg(long)]
        end: Option<String>,
    },

    /// Delete an entry and everything nested under it.
    Remove {
        /// Entry id or unique id prefix.
        id: String,
    },

    /// Print the timesheet as CSV, Markdown or JSON.
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,
    },
}

/// Output formats for `tk export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Markdown,
    Json,
}
