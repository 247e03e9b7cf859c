//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00Z",
//!   "roots": ["/home/user/Photos"],
//!   "duplicates": [
//!     {
//!       "key": "IMG_0001.jpg:1024:9c1185a5c5e9fc54",
//!       "size": 1024,
//!       "files": ["/home/user/Photos/IMG_0001.jpg", "/home/user/Photos/old/IMG_0001.jpg"]
//!     }
//!   ],
//!   "errors": [{ "path": "/home/user/Photos/locked", "message": "..." }],
//!   "summary": {
//!     "total_files": 100,
//!     "total_bytes": 1048576,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "duplicate_bytes": 1024,
//!     "scan_duration_ms": 12,
//!     "exit_code": 3,
//!     "exit_code_name": "DS003"
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanReport};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Comparison key shared by the group
    pub key: String,
    /// File size in bytes
    pub size: u64,
    /// Paths of all members, first found first
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            key: group.key.to_string(),
            size: group.size,
            files: group
                .files
                .iter()
                .map(|f| f.path().to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// A skipped file or directory.
#[derive(Debug, Clone, Serialize)]
pub struct JsonScanError {
    /// Path that could not be processed
    pub path: String,
    /// Description of the failure
    pub message: String,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_bytes: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Number of duplicate files (excluding the first of each group)
    pub duplicate_files: usize,
    /// Bytes taken up by duplicate files
    pub duplicate_bytes: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Roots that were scanned
    pub roots: Vec<String>,
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Files and directories skipped because of errors
    pub errors: Vec<JsonScanError>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from a scan report and its exit code.
    #[must_use]
    pub fn new(report: &ScanReport, exit_code: ExitCode) -> Self {
        let summary = &report.summary;
        Self {
            generated_at: Utc::now(),
            roots: report
                .roots
                .iter()
                .map(|r| r.to_string_lossy().into_owned())
                .collect(),
            duplicates: report
                .groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            errors: report
                .errors
                .iter()
                .map(|e| JsonScanError {
                    path: e.path().to_string_lossy().into_owned(),
                    message: e.to_string(),
                })
                .collect(),
            summary: JsonSummary {
                total_files: summary.total_files,
                total_bytes: summary.total_bytes,
                duplicate_groups: summary.duplicate_groups,
                duplicate_files: summary.duplicate_files,
                duplicate_bytes: summary.duplicate_bytes,
                scan_duration_ms: report.duration.as_millis() as u64,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
