//! # img2pdf
//!
//! Collect image files from a mix of paths and directories, order them, and
//! combine them into a single PDF, one image per page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! "scans/,cover.png"
//!  │
//!  ├─ 1. Input     split on ',', walk directories, filter by extension, stat
//!  ├─ 2. Order     sequential | by name | by modification time (stable)
//!  ├─ 3. Assemble  decode → compress → lopdf page tree
//!  └─ 4. Output    atomic write + per-run stats and skipped entries
//! ```
//!
//! Entries that cannot be used (wrong extension, missing file, failed stat)
//! are skipped with an [`EntryWarning`]; only an unreadable directory, an
//! empty result or a failed write abort the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use img2pdf::{convert_to_file, ConversionConfig, SortOrder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .order(SortOrder::ByName)
//!         .build()?;
//!     let output = convert_to_file("photos/,extra/cover.jpg", "album.pdf", &config)?;
//!     for warning in &output.warnings {
//!         eprintln!("warning: {warning}");
//!     }
//!     println!("{} pages written", output.stats.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! img2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSize, SortOrder};
pub use convert::{collect, convert_to_file, convert_with};
pub use error::{AssemblyError, EntryWarning, Img2PdfError};
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::assemble::{Assembler, PdfAssembler};
pub use pipeline::input::{is_image_file, ImageEntry, Resolution, IMAGE_EXTENSIONS};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
