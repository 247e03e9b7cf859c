//! Scanner module for directory traversal and prefix fingerprinting.
//!
//! This module provides functionality for:
//! - Bounded fan-out directory walking on a rayon scope
//! - Prefix fingerprinting with XxHash64
//! - A global limiter on concurrently open handles
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`fingerprint`]: Capped-prefix content hashing
//! - [`limiter`]: Counting semaphore for open files
//!
//! # Example
//!
//! ```no_run
//! use dupscan::scanner::{Fingerprinter, PREFIX_CAP};
//! use std::path::Path;
//!
//! let fingerprinter = Fingerprinter::new(PREFIX_CAP);
//! let fp = fingerprinter.fingerprint(Path::new("Cargo.toml"), 1024).unwrap();
//! println!("{}", fp);
//! ```

pub mod fingerprint;
pub mod limiter;
pub mod walker;

use std::path::{Path, PathBuf};

use serde::Serialize;

// Re-export main types
pub use fingerprint::{Fingerprint, Fingerprinter, PREFIX_CAP};
pub use limiter::{OpenFileLimiter, Permit, DEFAULT_MAX_OPEN_FILES};
pub use walker::{ScanEvent, Walker, IGNORED_DIR_NAMES};

/// A fingerprinted regular file discovered during a scan.
///
/// Immutable once created. The walker builds it and hands ownership to the
/// collector through the scan channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    path: PathBuf,
    name: String,
    size: u64,
    fingerprint: Fingerprint,
}

impl FileDescriptor {
    /// Create a new descriptor.
    ///
    /// The basename is taken from the last path component. Non UTF-8 names
    /// are converted lossily so key derivation stays total.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, fingerprint: Fingerprint) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            size,
            fingerprint,
        }
    }

    /// Full path to the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Basename of the file.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes as listed by the directory walk.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Prefix content fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Extension allow-list, lower-case and without the leading dot.
    /// Empty means every regular file is fingerprinted.
    pub extensions: Vec<String>,
}

impl WalkerConfig {
    /// Create a configuration from an extension allow-list.
    ///
    /// Entries are trimmed, lower-cased and stripped of a leading `.`;
    /// blank entries are dropped.
    #[must_use]
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    /// Check whether a file passes the extension allow-list.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.extensions.iter().any(|e| *e == extension)
    }
}

/// Errors that can occur during directory scanning.
///
/// None of these abort a scan. They are logged where they happen and
/// collected into the final report.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A scan root does not exist.
    #[error("Path not found: {0}")]
    RootNotFound(PathBuf),

    /// A scan root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A directory could not be listed.
    #[error("Cannot read directory {path}: {source}")]
    ReadDir {
        /// Directory that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be fingerprinted.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}

impl ScanError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::RootNotFound(path) | Self::NotADirectory(path) => path,
            Self::ReadDir { path, .. } => path,
            Self::Fingerprint(err) => err.path(),
        }
    }
}

/// Errors that can occur while fingerprinting a file.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The file disappeared between listing and opening.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when opening or reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The file ended before the expected prefix length was read.
    #[error("Short read for {path}: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Path of the truncated file
        path: PathBuf,
        /// Bytes that should have been available
        expected: u64,
        /// Bytes actually read
        actual: u64,
    },

    /// Any other I/O error while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl FingerprintError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Truncated { path, .. } | Self::Io { path, .. } => path,
        }
    }
}
