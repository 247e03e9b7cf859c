//! Counting semaphore bounding concurrently open handles.
//!
//! Every walker task acquires a [`Permit`] before opening a directory or a
//! file and drops it as soon as the handle is closed. The limiter is shared
//! by all walkers of a scan, so the bound holds globally no matter how many
//! directories are being traversed at once.

use parking_lot::{Condvar, Mutex};

/// Default maximum number of concurrently open handles.
pub const DEFAULT_MAX_OPEN_FILES: usize = 20;

#[derive(Debug, Default)]
struct State {
    held: usize,
    peak: usize,
}

/// Global open-file limiter.
#[derive(Debug)]
pub struct OpenFileLimiter {
    capacity: usize,
    state: Mutex<State>,
    released: Condvar,
}

impl Default for OpenFileLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OPEN_FILES)
    }
}

impl OpenFileLimiter {
    /// Create a limiter with `capacity` permits (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(State::default()),
            released: Condvar::new(),
        }
    }

    /// Maximum number of permits.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Block until a permit is free and take it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self.state.lock();
        while state.held >= self.capacity {
            self.released.wait(&mut state);
        }
        state.held += 1;
        state.peak = state.peak.max(state.held);
        Permit { limiter: self }
    }

    /// Highest number of permits held at the same time since creation.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.state.lock().peak
    }

    fn release(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.held > 0, "permit released twice");
        state.held -= 1;
        drop(state);
        self.released.notify_one();
    }
}

/// A held slot of an [`OpenFileLimiter`], returned on drop.
#[must_use = "the permit is released as soon as it is dropped"]
#[derive(Debug)]
pub struct Permit<'a> {
    limiter: &'a OpenFileLimiter,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.limiter.release();
    }
}
