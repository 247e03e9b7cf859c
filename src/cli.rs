//! Command-line interface definitions for dupscan.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory
//! dupscan
//!
//! # Scan two trees, list every duplicate group
//! dupscan -d ~/Photos,~/Backup/Photos -l
//!
//! # Only images, compare by content regardless of file name
//! dupscan -d ~/Photos -t jpg,png -o size,hash
//!
//! # Save the duplicate list as JSON
//! dupscan -d ~/Downloads -s dupes.json --format json
//! ```

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Find duplicate files by name, size and a partial content hash.
///
/// Files are compared by basename, size and a fast hash of their first
/// 512 KiB. Files that only differ beyond that prefix are reported as
/// duplicates, which keeps scans of large files cheap.
#[derive(Debug, Parser)]
#[command(name = "dupscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (repeatable, or comma-separated). Defaults to "."
    #[arg(short = 'd', long = "dir", value_name = "DIR", value_delimiter = ',')]
    pub dirs: Vec<PathBuf>,

    /// Only check files with these extensions, e.g. "jpg,png"
    #[arg(short = 't', long = "types", value_name = "EXT", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Fields compared to detect duplicates: name, size, hash
    ///
    /// Size is always compared. Defaults to name,size,hash.
    #[arg(short = 'o', long = "compare", value_name = "FIELD", value_delimiter = ',')]
    pub compare: Vec<String>,

    /// Show the list of duplicated files
    #[arg(short, long)]
    pub list: bool,

    /// Save the list of duplicated files to a file
    #[arg(short = 's', long = "save-to", value_name = "PATH")]
    pub save_to: Option<PathBuf>,

    /// Format of the saved report
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Maximum number of files and directories open at the same time
    #[arg(long = "max-open", value_name = "N")]
    pub max_open_files: Option<usize>,

    /// Number of walker threads (0 for one per CPU)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Number of leading bytes hashed per file (e.g., 512KiB, 1MB)
    #[arg(long = "prefix-cap", value_name = "SIZE", value_parser = parse_size)]
    pub prefix_cap: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH", env = "DUPSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the final summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Do not show the live status line
    #[arg(long)]
    pub no_progress: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Format of a saved duplicate report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Plain text, one group per block
    #[default]
    Text,
    /// JSON document with groups and summary
    Json,
    /// CSV with one row per duplicated file
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Accepts plain byte counts and SI or IEC suffixes, as understood by
/// [`bytesize::ByteSize`].
///
/// # Examples
///
/// ```
/// use dupscan::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("512KiB").unwrap(), 512 * 1024);
/// assert!(parse_size("lots").is_err());
/// ```
///
/// # Errors
///
/// Returns a description of the problem if `s` is not a valid size.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    s.parse::<bytesize::ByteSize>()
        .map(|b| b.as_u64())
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}
