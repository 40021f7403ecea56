//! Result types returned by a successful conversion.

use crate::error::EntryWarning;
use crate::pipeline::input::ImageEntry;
use serde::Serialize;
use std::path::PathBuf;

/// Everything a caller may want to know about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// Path of the written document.
    pub output: PathBuf,
    /// The entries written, in page order.
    pub entries: Vec<ImageEntry>,
    /// Entries that were skipped during collection.
    pub warnings: Vec<EntryWarning>,
    pub stats: ConversionStats,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Pages written (one per entry).
    pub pages: usize,
    /// Entries excluded with a warning.
    pub skipped: usize,
    pub collect_duration_ms: u64,
    pub assemble_duration_ms: u64,
    pub total_duration_ms: u64,
}
