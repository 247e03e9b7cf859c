//! Duplicate finder orchestrating a scan.
//!
//! # Overview
//!
//! A scan runs in three stages:
//! 1. **Walk** - one walker task per root on a dedicated rayon pool, with every
//!    subdirectory spawned as its own task of the same scope
//! 2. **Collect** - a single collector thread drains the bounded event
//!    channel into the [`DuplicateIndex`]
//! 3. **Aggregate** - once the scope has joined and the collector has handed
//!    back the frozen index, duplicate groups and totals are extracted
//!
//! All state (limiter, channel, index) is created per call and dropped when
//! it returns, so a finder can be reused for any number of scans.
//!
//! # Example
//!
//! ```no_run
//! use dupscan::duplicates::{DuplicateFinder, FinderConfig, KeyFields};
//!
//! let config = FinderConfig::default()
//!     .with_max_open_files(8)
//!     .with_key_fields(KeyFields::content());
//! let finder = DuplicateFinder::new(config);
//!
//! let report = finder.find_duplicates(&["/home/user/Downloads"]).unwrap();
//! for group in &report.groups {
//!     println!("{} copies of {}", group.len(), group.key);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::aggregate::{aggregate, ScanSummary};
use super::collector::Collector;
use super::groups::{DuplicateGroup, DuplicateIndex};
use super::key::KeyFields;
use crate::progress::ProgressCallback;
use crate::scanner::{
    Fingerprinter, OpenFileLimiter, ScanError, Walker, WalkerConfig, DEFAULT_MAX_OPEN_FILES,
    PREFIX_CAP,
};

/// Default capacity of the walker-to-collector channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Configuration for a [`DuplicateFinder`].
#[derive(Clone)]
pub struct FinderConfig {
    /// Maximum number of concurrently open directories and files.
    pub max_open_files: usize,
    /// Number of leading bytes fingerprinted per file.
    pub prefix_cap: u64,
    /// Number of walker threads, 0 for one per logical CPU.
    pub threads: usize,
    /// Capacity of the event channel; producers block when it is full.
    pub channel_capacity: usize,
    /// Walker filters.
    pub walker: WalkerConfig,
    /// Components of the comparison key.
    pub key_fields: KeyFields,
    /// Optional progress callback, invoked from the collector thread.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("max_open_files", &self.max_open_files)
            .field("prefix_cap", &self.prefix_cap)
            .field("threads", &self.threads)
            .field("channel_capacity", &self.channel_capacity)
            .field("walker", &self.walker)
            .field("key_fields", &self.key_fields)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            max_open_files: DEFAULT_MAX_OPEN_FILES,
            prefix_cap: PREFIX_CAP,
            threads: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            walker: WalkerConfig::default(),
            key_fields: KeyFields::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the open-file bound (at least 1).
    #[must_use]
    pub fn with_max_open_files(mut self, max: usize) -> Self {
        self.max_open_files = max.max(1);
        self
    }

    /// Set the fingerprint prefix cap in bytes.
    #[must_use]
    pub fn with_prefix_cap(mut self, cap: u64) -> Self {
        self.prefix_cap = cap;
        self
    }

    /// Set the number of walker threads (0 for automatic).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the event channel capacity (at least 1).
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Restrict fingerprinting to the given extensions.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.walker = WalkerConfig::with_extensions(extensions);
        self
    }

    /// Set the comparison key components.
    #[must_use]
    pub fn with_key_fields(mut self, fields: KeyFields) -> Self {
        self.key_fields = fields;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Errors of the scan machinery itself.
///
/// Per-file and per-directory problems are not errors at this level; they
/// are recorded in [`ScanReport::errors`].
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No root directory was given.
    #[error("No directories to scan")]
    NoRoots,

    /// The walker thread pool could not be created.
    #[error("Failed to build walker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The collector thread could not be started.
    #[error("Failed to start collector thread: {0}")]
    CollectorSpawn(#[source] std::io::Error),

    /// The collector thread panicked before handing back the index.
    #[error("Collector thread panicked")]
    CollectorPanicked,
}

/// Raw result of the walk and collect stages.
#[derive(Debug)]
pub struct CollectedScan {
    /// Frozen duplicate index
    pub index: DuplicateIndex,
    /// Non-fatal errors in arrival order
    pub errors: Vec<ScanError>,
    /// Roots actually walked, after removing overlaps
    pub roots: Vec<PathBuf>,
    /// Highest number of simultaneously open handles
    pub peak_open_files: usize,
    /// Wall-clock time of walk and collect
    pub duration: Duration,
}

/// Final result of a scan.
#[derive(Debug)]
pub struct ScanReport {
    /// Duplicate groups in index order
    pub groups: Vec<DuplicateGroup>,
    /// Totals derived from the index
    pub summary: ScanSummary,
    /// Non-fatal errors encountered during the scan
    pub errors: Vec<ScanError>,
    /// Roots actually walked, after removing overlaps
    pub roots: Vec<PathBuf>,
    /// Number of roots that could not be read at all
    pub unreadable_roots: usize,
    /// Wall-clock time of the whole scan
    pub duration: Duration,
}

impl ScanReport {
    /// Check whether some files or directories were skipped due to errors.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check whether none of the roots could be read.
    #[must_use]
    pub fn no_readable_root(&self) -> bool {
        !self.roots.is_empty() && self.unreadable_roots == self.roots.len()
    }
}

/// Duplicate finder running the walk, collect and aggregate stages.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Configuration of this finder.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Walk every root and collect all files into a frozen index.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if `roots` is empty or the scan threads cannot
    /// be started. Unreadable roots, directories and files are not errors;
    /// they end up in [`CollectedScan::errors`].
    pub fn collect<P: AsRef<Path>>(&self, roots: &[P]) -> Result<CollectedScan, FinderError> {
        if roots.is_empty() {
            return Err(FinderError::NoRoots);
        }

        let start = Instant::now();
        let roots = non_overlapping_roots(roots);
        log::info!("Scanning {} root(s): {:?}", roots.len(), roots);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("dupscan-walker-{i}"))
            .build()?;
        let limiter = OpenFileLimiter::new(self.config.max_open_files);
        let (tx, rx) = crossbeam_channel::bounded(self.config.channel_capacity.max(1));

        let collector = Collector::spawn(
            rx,
            self.config.key_fields,
            self.config.progress_callback.clone(),
        )
        .map_err(FinderError::CollectorSpawn)?;

        {
            let walker = Walker::new(
                &self.config.walker,
                Fingerprinter::new(self.config.prefix_cap),
                &limiter,
                tx,
            );
            pool.scope(|s| {
                for root in &roots {
                    walker.walk(s, root);
                }
            });
            // Dropping the walker drops the last sender and closes the stream
        }
        log::debug!("All walkers joined after {:.2?}", start.elapsed());

        let collected = collector
            .finish()
            .map_err(|_| FinderError::CollectorPanicked)?;

        Ok(CollectedScan {
            index: collected.index,
            errors: collected.errors,
            roots,
            peak_open_files: limiter.peak(),
            duration: start.elapsed(),
        })
    }

    /// Find all duplicate files under the given roots.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::collect`].
    pub fn find_duplicates<P: AsRef<Path>>(&self, roots: &[P]) -> Result<ScanReport, FinderError> {
        let start = Instant::now();
        let scan = self.collect(roots)?;

        let (groups, summary) = aggregate(&scan.index);
        let unreadable_roots = scan
            .roots
            .iter()
            .filter(|root| scan.errors.iter().any(|e| is_root_failure(e, root)))
            .count();

        if !scan.roots.is_empty() && unreadable_roots == scan.roots.len() {
            log::error!("None of the requested directories could be read");
        }

        log::info!(
            "Scanned {} files ({} bytes): {} duplicate groups, {} errors",
            summary.total_files,
            summary.total_bytes,
            summary.duplicate_groups,
            scan.errors.len()
        );

        Ok(ScanReport {
            groups,
            summary,
            errors: scan.errors,
            roots: scan.roots,
            unreadable_roots,
            duration: start.elapsed(),
        })
    }
}

fn is_root_failure(err: &ScanError, root: &Path) -> bool {
    match err {
        ScanError::RootNotFound(path) | ScanError::NotADirectory(path) => path == root,
        ScanError::ReadDir { path, .. } => path == root,
        ScanError::Fingerprint(_) => false,
    }
}

/// Drop repeated roots and roots nested inside another root.
///
/// Roots are compared by canonical path where it can be resolved; roots that
/// cannot be resolved are kept unchanged so the walker reports them.
fn non_overlapping_roots<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    let resolved: Vec<(PathBuf, PathBuf)> = roots
        .iter()
        .map(|r| {
            let given = r.as_ref().to_path_buf();
            let canonical = given.canonicalize().unwrap_or_else(|_| given.clone());
            (given, canonical)
        })
        .collect();

    let mut kept: Vec<&(PathBuf, PathBuf)> = Vec::new();
    for candidate in &resolved {
        if kept.iter().any(|k| candidate.1.starts_with(&k.1)) {
            log::debug!(
                "Skipping {} (already covered by another root)",
                candidate.0.display()
            );
            continue;
        }
        kept.retain(|k| {
            let nested = k.1.starts_with(&candidate.1);
            if nested {
                log::debug!("Skipping {} (covered by {})", k.0.display(), candidate.0.display());
            }
            !nested
        });
        kept.push(candidate);
    }

    kept.into_iter().map(|(given, _)| given.clone()).collect()
}
