//! Single-consumer collector for scan events.
//!
//! The collector is the only writer of the [`DuplicateIndex`] and the running
//! totals of a scan. It runs on its own thread, drains the shared event
//! channel in arrival order and hands the finished index back through its
//! join handle once every sender has been dropped. Joining the collector is
//! therefore the point after which the index is frozen.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use super::groups::DuplicateIndex;
use super::key::KeyFields;
use crate::progress::{ProgressCallback, PHASE_COLLECT};
use crate::scanner::{ScanError, ScanEvent};

/// Everything the collector gathered during a scan.
#[derive(Debug)]
pub struct Collected {
    /// Frozen duplicate index
    pub index: DuplicateIndex,
    /// Non-fatal errors in arrival order
    pub errors: Vec<ScanError>,
    /// Byte total of all collected files
    pub total_bytes: u64,
}

/// Handle to a running collector thread.
#[derive(Debug)]
pub struct Collector {
    handle: JoinHandle<Collected>,
}

impl Collector {
    /// Start a collector thread draining `events`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the thread cannot be spawned.
    pub fn spawn(
        events: Receiver<ScanEvent>,
        fields: KeyFields,
        progress: Option<Arc<dyn ProgressCallback>>,
    ) -> std::io::Result<Self> {
        let handle = thread::Builder::new()
            .name("dupscan-collector".to_string())
            .spawn(move || collect(events, fields, progress.as_deref()))?;
        Ok(Self { handle })
    }

    /// Wait for the event stream to close and return the frozen results.
    ///
    /// Only returns once every sender of the channel has been dropped.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the collector thread panicked.
    pub fn finish(self) -> thread::Result<Collected> {
        self.handle.join()
    }
}

/// Drain `events` into a fresh index.
///
/// Runs until the iterator ends. Used by [`Collector`] on its own thread and
/// directly by callers that already hold every event.
pub fn collect<I>(
    events: I,
    fields: KeyFields,
    progress: Option<&dyn ProgressCallback>,
) -> Collected
where
    I: IntoIterator<Item = ScanEvent>,
{
    let mut index = DuplicateIndex::new(fields);
    let mut errors = Vec::new();
    let mut total_files = 0usize;
    let mut total_bytes = 0u64;

    if let Some(cb) = progress {
        cb.on_phase_start(PHASE_COLLECT, 0);
    }

    for event in events {
        match event {
            ScanEvent::File(file) => {
                total_files += 1;
                total_bytes += file.size();
                if let Some(cb) = progress {
                    cb.on_progress(total_files, &file.path().to_string_lossy());
                    cb.on_item_completed(file.size());
                }
                index.insert(file);
            }
            ScanEvent::Error(err) => errors.push(err),
        }
    }

    if let Some(cb) = progress {
        cb.on_phase_end(PHASE_COLLECT);
    }

    log::debug!(
        "Collector drained {} files ({} bytes), {} keys, {} errors",
        total_files,
        total_bytes,
        index.len(),
        errors.len()
    );

    Collected {
        index,
        errors,
        total_bytes,
    }
}
