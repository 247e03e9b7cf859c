//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] trait, through which the
//! collector publishes its running totals, and [`Progress`], an indicatif
//! status line that renders them on the terminal while a scan runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

/// Name of the collection phase reported by the collector.
pub const PHASE_COLLECT: &str = "collect";

/// Progress callback for scan phases.
///
/// Implement this trait to receive progress updates during a scan.
/// Callbacks are invoked from the collector thread only.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., [`PHASE_COLLECT`])
    /// * `total` - Total number of items to process, 0 if unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items processed so far (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been processed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Live status line using indicatif.
///
/// Shows the number of files collected and their byte total, refreshed on
/// a steady 250 ms tick.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    bytes: AtomicU64,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupscan::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            bytes: AtomicU64::new(0),
            quiet,
        }
    }

    /// Bytes reported so far.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} files of total {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, _phase: &str, _total: usize) {
        self.bytes.store(0, Ordering::Relaxed);
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::style());
        pb.set_message(ByteSize::b(0).to_string());
        pb.enable_steady_tick(Duration::from_millis(250));
        *self.bar.lock() = Some(pb);
    }

    fn on_progress(&self, current: usize, _path: &str) {
        if let Some(ref pb) = *self.bar.lock() {
            pb.set_position(current as u64);
        }
    }

    fn on_item_completed(&self, bytes: u64) {
        let total = self.bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        if let Some(ref pb) = *self.bar.lock() {
            pb.set_message(ByteSize::b(total).to_string());
        }
    }

    fn on_phase_end(&self, _phase: &str) {
        if let Some(pb) = self.bar.lock().take() {
            pb.finish_and_clear();
        }
    }
}
