//! Post-processing of a frozen duplicate index.

use serde::Serialize;

use super::groups::{DuplicateGroup, DuplicateIndex};

/// Summary statistics derived from a duplicate index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_bytes: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Number of duplicate files (members beyond the first of each group)
    pub duplicate_files: usize,
    /// Bytes taken up by duplicate files
    pub duplicate_bytes: u64,
}

impl ScanSummary {
    /// Percentage of scanned bytes taken up by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            (self.duplicate_bytes as f64 / self.total_bytes as f64) * 100.0
        }
    }

    /// Check if any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.duplicate_groups > 0
    }
}

/// Extract duplicate groups and summary statistics from `index`.
///
/// Groups are returned in index order. The first member of each group is
/// the original; every other member counts toward the duplicate totals.
#[must_use]
pub fn aggregate(index: &DuplicateIndex) -> (Vec<DuplicateGroup>, ScanSummary) {
    let mut summary = ScanSummary::default();
    let mut groups = Vec::new();

    for (key, files) in index.iter() {
        summary.total_files += files.len();
        summary.total_bytes += files.iter().map(|f| f.size()).sum::<u64>();

        if files.len() > 1 {
            let group = DuplicateGroup::new(key.clone(), files.to_vec());
            summary.duplicate_groups += 1;
            summary.duplicate_files += group.duplicate_count();
            summary.duplicate_bytes += group.wasted_space();
            groups.push(group);
        }
    }

    (groups, summary)
}
