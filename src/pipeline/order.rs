//! Page ordering.
//!
//! All orderings use the standard library's stable sort, so entries with
//! equal keys (same base name in different directories, identical
//! timestamps) keep their discovery order.

use crate::config::SortOrder;
use crate::pipeline::input::ImageEntry;
use tracing::debug;

/// Reorder `entries` in place according to `order`.
pub fn apply_order(entries: &mut [ImageEntry], order: SortOrder) {
    match order {
        SortOrder::Sequential => {}
        SortOrder::ByName => entries.sort_by(|a, b| a.name_bytes().cmp(b.name_bytes())),
        SortOrder::ByModTime => entries.sort_by_key(|e| e.modified),
    }
    debug!("Ordered {} entries ({})", entries.len(), order.as_flag());
}
