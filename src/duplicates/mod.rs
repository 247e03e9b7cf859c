//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Comparison key derivation ([`key`])
//! - Fan-in collection into the duplicate index ([`collector`], [`groups`])
//! - Duplicate group extraction and totals ([`aggregate`])
//! - Scan orchestration ([`finder`])

pub mod aggregate;
pub mod collector;
pub mod finder;
pub mod groups;
pub mod key;

// Re-export main types
pub use aggregate::{aggregate, ScanSummary};
pub use collector::{collect, Collected, Collector};
pub use finder::{
    CollectedScan, DuplicateFinder, FinderConfig, FinderError, ScanReport,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use groups::{DuplicateGroup, DuplicateIndex};
pub use key::{ComparisonKey, KeyFields, KeyFieldsError};
