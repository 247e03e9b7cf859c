//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Plain text for reading and the `--list` console view
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dupscan::duplicates::DuplicateFinder;
//! use dupscan::output::json::JsonOutput;
//! use dupscan::error::ExitCode;
//!
//! let report = DuplicateFinder::with_defaults().find_duplicates(&["."]).unwrap();
//!
//! let output = JsonOutput::new(&report, ExitCode::for_report(&report));
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::cli::ReportFormat;
use crate::duplicates::ScanReport;
use crate::error::ExitCode;

// Re-export main types
pub use csv::{CsvOutput, CsvOutputError};
pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;

/// Errors that can occur while saving a report.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// I/O error creating or writing the file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON output failed
    #[error(transparent)]
    Json(#[from] JsonOutputError),

    /// CSV output failed
    #[error(transparent)]
    Csv(#[from] CsvOutputError),
}

/// Write `report` in `format` to `writer`.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or writing fails.
pub fn write_report<W: Write>(
    writer: &mut W,
    format: ReportFormat,
    report: &ScanReport,
) -> Result<(), OutputError> {
    match format {
        ReportFormat::Text => TextOutput::new(&report.groups).write_to(writer)?,
        ReportFormat::Json => {
            JsonOutput::new(report, ExitCode::for_report(report)).write_to(writer, true)?
        }
        ReportFormat::Csv => CsvOutput::new(&report.groups).write_to(&mut *writer)?,
    }
    Ok(())
}

/// Save `report` in `format` to the file at `path`, replacing it.
///
/// # Errors
///
/// Returns [`OutputError`] if the file cannot be created or written.
pub fn save_report(path: &Path, format: ReportFormat, report: &ScanReport) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_report(&mut writer, format, report)?;
    writer.flush()?;
    log::info!("Saved {} report to {}", format, path.display());
    Ok(())
}
