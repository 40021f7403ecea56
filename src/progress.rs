//! Progress-callback trait for collection and per-page events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as entries are skipped and pages are written. The CLI uses this to
//! drive its progress bar; tests use it to assert on skipped entries without
//! capturing process output.
//!
//! # Example
//!
//! ```rust
//! use img2pdf::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} written", page_num, total_pages);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { written: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::EntryWarning;
use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it collects entries and writes pages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is single-threaded; `Send + Sync` is
/// required only so the callback can live in a shared [`Arc`].
pub trait ConversionProgressCallback: Send + Sync {
    /// Called for every input entry that was excluded.
    fn on_entry_skipped(&self, warning: &EntryWarning) {
        let _ = warning;
    }

    /// Called once before the first page is written.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be written
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before an image is decoded and placed.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    /// * `path`        — the image going onto this page
    fn on_page_start(&self, page_num: usize, total_pages: usize, path: &Path) {
        let _ = (page_num, total_pages, path);
    }

    /// Called after an image has been placed on its page.
    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once after the document has been written.
    fn on_conversion_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
