//! Prefix fingerprinting with XxHash64.
//!
//! # Overview
//!
//! A fingerprint is the XxHash64 of the first `min(size, cap)` bytes of a
//! file. Combined with the file size (and usually the basename) it is a cheap
//! stand-in for full content comparison: the read cost of very large files is
//! bounded by the cap, at the price of missing differences beyond it and of
//! ordinary 64-bit hash collisions.
//!
//! # Example
//!
//! ```no_run
//! use dupscan::scanner::Fingerprinter;
//! use std::path::Path;
//!
//! let fingerprinter = Fingerprinter::default();
//! let fp = fingerprinter.fingerprint(Path::new("movie.mkv"), 4_000_000_000)?;
//! println!("{fp}");
//! # Ok::<(), dupscan::scanner::FingerprintError>(())
//! ```

use std::fmt;
use std::fs::File;
use std::hash::Hasher as _;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Serialize, Serializer};
use twox_hash::XxHash64;

use super::FingerprintError;

/// Default number of leading bytes hashed per file (512 KiB).
pub const PREFIX_CAP: u64 = 512 * 1024;

/// Buffer size for streaming reads (64 KiB).
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Seed used for every fingerprint so results are stable across runs.
const SEED: u64 = 0;

/// Opaque prefix content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Wrap a raw hash value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// The raw hash value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Fingerprint of an in-memory byte slice.
    ///
    /// Hashes the whole slice; callers apply the cap themselves.
    #[must_use]
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = XxHash64::with_seed(SEED);
        hasher.write(data);
        Self(hasher.finish())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Computes capped-prefix fingerprints.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    cap: u64,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(PREFIX_CAP)
    }
}

impl Fingerprinter {
    /// Create a fingerprinter hashing at most `cap` leading bytes.
    #[must_use]
    pub fn new(cap: u64) -> Self {
        Self { cap }
    }

    /// Configured prefix cap in bytes.
    #[must_use]
    pub fn cap(&self) -> u64 {
        self.cap
    }

    /// Fingerprint the file at `path`, whose listed size is `size`.
    ///
    /// Reads exactly `min(size, cap)` bytes from the start of the file.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError`] if the file cannot be opened, a read
    /// fails, or the file yields fewer bytes than expected (for example
    /// because it was truncated after being listed).
    pub fn fingerprint(&self, path: &Path, size: u64) -> Result<Fingerprint, FingerprintError> {
        let expected = size.min(self.cap);
        let file = File::open(path).map_err(|e| FingerprintError::from_io(path, e))?;
        self.hash_reader(path, file, expected)
    }

    fn hash_reader<R: Read>(
        &self,
        path: &Path,
        reader: R,
        expected: u64,
    ) -> Result<Fingerprint, FingerprintError> {
        let mut hasher = XxHash64::with_seed(SEED);
        let mut reader = reader.take(expected);
        let mut buffer = vec![0u8; READ_BUFFER_SIZE.min(expected as usize).max(1)];
        let mut consumed = 0u64;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FingerprintError::from_io(path, e)),
            };
            hasher.write(&buffer[..n]);
            consumed += n as u64;
        }

        if consumed < expected {
            return Err(FingerprintError::Truncated {
                path: path.to_path_buf(),
                expected,
                actual: consumed,
            });
        }

        Ok(Fingerprint(hasher.finish()))
    }
}
