//! Bounded fan-out directory walker.
//!
//! # Overview
//!
//! This module provides the [`Walker`], which traverses a directory tree on a
//! rayon scope. Every subdirectory becomes its own scope task, so independent
//! subtrees are listed and fingerprinted in parallel, and the scope only
//! returns once every task spawned beneath it has finished.
//!
//! Parallelism on the file system is bounded separately from the task count:
//! listing a directory and fingerprinting a file both hold a permit of the
//! shared [`OpenFileLimiter`] for as long as the handle is open.
//!
//! Results are streamed as [`ScanEvent`]s into a channel owned by the
//! collector. Errors never stop traversal; they are logged and sent along
//! with the descriptors.
//!
//! # Example
//!
//! ```no_run
//! use dupscan::scanner::{Fingerprinter, OpenFileLimiter, ScanEvent, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let config = WalkerConfig::default();
//! let limiter = OpenFileLimiter::default();
//! let walker = Walker::new(&config, Fingerprinter::default(), &limiter, tx);
//!
//! rayon::scope(|s| walker.walk(s, Path::new(".")));
//! drop(walker);
//!
//! for event in rx {
//!     if let ScanEvent::File(file) = event {
//!         println!("{} {}", file.fingerprint(), file.path().display());
//!     }
//! }
//! ```

use std::fs::{self, FileType};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use rayon::Scope;

use super::{
    FileDescriptor, FingerprintError, Fingerprinter, OpenFileLimiter, ScanError, WalkerConfig,
};

/// Directory names that are never descended into (version-control metadata).
pub const IGNORED_DIR_NAMES: &[&str] = &[".git", ".hg", ".svn", ".bzr", "_darcs", "CVS"];

/// An item produced by a walker.
#[derive(Debug)]
pub enum ScanEvent {
    /// A fingerprinted regular file.
    File(FileDescriptor),
    /// A non-fatal error encountered while walking.
    Error(ScanError),
}

/// One listed directory entry, captured while the directory handle is open.
struct Listed {
    path: PathBuf,
    file_type: FileType,
}

/// Directory walker for one scan.
///
/// A single walker is shared by reference between all scope tasks of a scan
/// and can be started on any number of roots.
#[derive(Debug)]
pub struct Walker<'a> {
    config: &'a WalkerConfig,
    fingerprinter: Fingerprinter,
    limiter: &'a OpenFileLimiter,
    events: Sender<ScanEvent>,
}

impl<'a> Walker<'a> {
    /// Create a walker sending its results to `events`.
    #[must_use]
    pub fn new(
        config: &'a WalkerConfig,
        fingerprinter: Fingerprinter,
        limiter: &'a OpenFileLimiter,
        events: Sender<ScanEvent>,
    ) -> Self {
        Self {
            config,
            fingerprinter,
            limiter,
            events,
        }
    }

    /// Walk `root` within `scope`.
    ///
    /// Returns after spawning the root task; the walk is complete when the
    /// enclosing scope returns. A missing or non-directory root is reported as
    /// an error event and contributes nothing.
    pub fn walk<'s>(&'s self, scope: &Scope<'s>, root: &Path) {
        match fs::metadata(root) {
            Ok(metadata) if metadata.is_dir() => {
                log::debug!("Walking root {}", root.display());
                let root = root.to_path_buf();
                scope.spawn(move |s| self.visit(s, root));
            }
            Ok(_) => {
                log::error!("Not a directory: {}", root.display());
                self.emit(ScanEvent::Error(ScanError::NotADirectory(
                    root.to_path_buf(),
                )));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::error!("Path not found: {}", root.display());
                self.emit(ScanEvent::Error(ScanError::RootNotFound(root.to_path_buf())));
            }
            Err(e) => {
                log::error!("Cannot access {}: {}", root.display(), e);
                self.emit(ScanEvent::Error(ScanError::ReadDir {
                    path: root.to_path_buf(),
                    source: e,
                }));
            }
        }
    }

    /// Process one directory: spawn its subdirectories, fingerprint its files.
    fn visit<'s>(&'s self, scope: &Scope<'s>, dir: PathBuf) {
        let entries = match self.list(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot read directory {}: {}", dir.display(), e);
                self.emit(ScanEvent::Error(ScanError::ReadDir {
                    path: dir,
                    source: e,
                }));
                return;
            }
        };

        log::trace!("{}: {} entries", dir.display(), entries.len());

        for Listed { path, file_type } in entries {
            if file_type.is_dir() {
                if is_ignored_dir(&path) {
                    log::trace!("Ignoring directory: {}", path.display());
                    continue;
                }
                scope.spawn(move |s| self.visit(s, path));
            } else if file_type.is_file() {
                self.visit_file(path);
            } else {
                log::trace!("Skipping non-regular entry: {}", path.display());
            }
        }
    }

    /// List a directory while holding a permit.
    fn list(&self, dir: &Path) -> std::io::Result<Vec<Listed>> {
        let _permit = self.limiter.acquire();
        let mut entries = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            entries.push(Listed {
                path: entry.path(),
                file_type,
            });
        }

        Ok(entries)
    }

    fn visit_file(&self, path: PathBuf) {
        if !self.config.accepts(&path) {
            log::trace!("Skipping file due to type filter: {}", path.display());
            return;
        }

        match self.describe(path) {
            Ok(descriptor) => self.emit(ScanEvent::File(descriptor)),
            Err(e) => {
                log::warn!("{}", e);
                self.emit(ScanEvent::Error(ScanError::Fingerprint(e)));
            }
        }
    }

    /// Stat and fingerprint a file while holding a permit.
    fn describe(&self, path: PathBuf) -> Result<FileDescriptor, FingerprintError> {
        let _permit = self.limiter.acquire();
        let size = fs::symlink_metadata(&path)
            .map_err(|e| FingerprintError::from_io(&path, e))?
            .len();
        let fingerprint = self.fingerprinter.fingerprint(&path, size)?;
        Ok(FileDescriptor::new(path, size, fingerprint))
    }

    fn emit(&self, event: ScanEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Collector disconnected, dropping scan event");
        }
    }
}

fn is_ignored_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| IGNORED_DIR_NAMES.contains(&name))
}
