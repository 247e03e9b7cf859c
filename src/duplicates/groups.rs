//! Duplicate index and duplicate groups.
//!
//! # Overview
//!
//! The [`DuplicateIndex`] maps every [`ComparisonKey`] seen during a scan to
//! the files that produced it, in arrival order. Every file lives in exactly
//! one entry: single-member entries are unique files, entries with two or
//! more members are [`DuplicateGroup`]s.
//!
//! Entries are kept in first-arrival order of their key, so iterating the
//! same index always yields the same sequence.
//!
//! # Example
//!
//! ```
//! use dupscan::duplicates::{DuplicateIndex, KeyFields};
//! use dupscan::scanner::{FileDescriptor, Fingerprint};
//! use std::path::PathBuf;
//!
//! let mut index = DuplicateIndex::new(KeyFields::content());
//! for path in ["/a.txt", "/b.txt", "/c.txt"] {
//!     let content: &[u8] = if path == "/c.txt" { b"other" } else { b"dupe!" };
//!     index.insert(FileDescriptor::new(PathBuf::from(path), 5, Fingerprint::of_bytes(content)));
//! }
//!
//! assert_eq!(index.file_count(), 3);
//! assert_eq!(index.len(), 2);  // Two distinct keys
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use super::key::{ComparisonKey, KeyFields};
use crate::scanner::FileDescriptor;

/// Files sharing one comparison key, in arrival order.
#[derive(Debug, Clone)]
struct IndexEntry {
    key: ComparisonKey,
    files: Vec<FileDescriptor>,
}

/// Mapping from comparison key to the files that share it.
#[derive(Debug, Clone)]
pub struct DuplicateIndex {
    fields: KeyFields,
    slots: HashMap<ComparisonKey, usize>,
    entries: Vec<IndexEntry>,
    file_count: usize,
}

impl DuplicateIndex {
    /// Create an empty index keyed by `fields`.
    #[must_use]
    pub fn new(fields: KeyFields) -> Self {
        Self {
            fields,
            slots: HashMap::new(),
            entries: Vec::new(),
            file_count: 0,
        }
    }

    /// Key fields this index groups by.
    #[must_use]
    pub fn key_fields(&self) -> KeyFields {
        self.fields
    }

    /// Append `file` to the entry for its key, creating the entry if absent.
    pub fn insert(&mut self, file: FileDescriptor) {
        let key = ComparisonKey::derive(&file, self.fields);
        match self.slots.entry(key) {
            Entry::Occupied(slot) => self.entries[*slot.get()].files.push(file),
            Entry::Vacant(slot) => {
                self.entries.push(IndexEntry {
                    key: slot.key().clone(),
                    files: vec![file],
                });
                slot.insert(self.entries.len() - 1);
            }
        }
        self.file_count += 1;
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of files across all entries.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Files recorded under `key`, in arrival order.
    #[must_use]
    pub fn get(&self, key: &ComparisonKey) -> Option<&[FileDescriptor]> {
        self.slots
            .get(key)
            .map(|&i| self.entries[i].files.as_slice())
    }

    /// Iterate over all entries in first-arrival order of their key.
    pub fn iter(&self) -> impl Iterator<Item = (&ComparisonKey, &[FileDescriptor])> + '_ {
        self.entries
            .iter()
            .map(|entry| (&entry.key, entry.files.as_slice()))
    }

    /// Iterate over entries with two or more members.
    pub fn duplicate_entries(
        &self,
    ) -> impl Iterator<Item = (&ComparisonKey, &[FileDescriptor])> + '_ {
        self.iter().filter(|(_, files)| files.len() > 1)
    }
}

/// A set of two or more files sharing one comparison key.
///
/// The first member is the first one the collector received and is treated
/// as the original; the others count as duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// Shared comparison key
    pub key: ComparisonKey,
    /// Size in bytes of each member
    pub size: u64,
    /// Members in arrival order
    pub files: Vec<FileDescriptor>,
}

impl DuplicateGroup {
    /// Create a group from its key and members.
    #[must_use]
    pub fn new(key: ComparisonKey, files: Vec<FileDescriptor>) -> Self {
        Self {
            size: key.size,
            key,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes taken up by the duplicate copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path().to_path_buf()).collect()
    }
}
