//! CSV output formatter for duplicate scan results.
//!
//! One row is generated for each member of a duplicate group.
//!
//! # Columns
//!
//! - `group_id`: Numeric ID identifying the duplicate group
//! - `key`: Comparison key (`name:size:hash`, absent fields left out)
//! - `path`: Path to the file as found by the scan
//! - `size`: File size in bytes
//! - `fingerprint`: Prefix fingerprint (hexadecimal)

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow {
    group_id: usize,
    key: String,
    path: String,
    size: u64,
    fingerprint: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, group) in self.groups.iter().enumerate() {
            let key = group.key.to_string();
            for file in &group.files {
                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    key: key.clone(),
                    path: file.path().to_string_lossy().into_owned(),
                    size: file.size(),
                    fingerprint: file.fingerprint().to_string(),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
