//! Error types for the img2pdf library.
//!
//! Three types cover three distinct failure modes:
//!
//! * [`Img2PdfError`] — **Fatal**: the run cannot produce a document (blank
//!   input, nothing collected, unreadable directory, assembler failure).
//!   Returned as `Err(Img2PdfError)` from the top-level functions.
//!
//! * [`EntryWarning`] — **Non-fatal**: one input entry was skipped (bad
//!   extension, missing file, failed stat). Collected in
//!   [`crate::pipeline::input::Resolution`] and in
//!   [`crate::output::ConversionOutput`] so callers can inspect or report them.
//!
//! * [`AssemblyError`] — raised inside an [`crate::pipeline::assemble::Assembler`]
//!   and wrapped into [`Img2PdfError::AssemblyFailed`] together with the
//!   output path.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the img2pdf library.
#[derive(Debug, Error)]
pub enum Img2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input string is empty or contains only whitespace.
    #[error("Invalid input '{input}': expected a comma-separated list of files and/or directories")]
    InvalidInput { input: String },

    /// Collection finished without a single usable image.
    #[error("No images found ({skipped} entries skipped)")]
    NoImagesFound { skipped: usize },

    /// A directory could not be read while walking an input.
    #[error("Failed to read directory '{path}': {reason}")]
    DirectoryTraversal { path: PathBuf, reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The assembler could not produce the output document.
    #[error("Failed to build '{output}': {source}")]
    AssemblyFailed {
        output: PathBuf,
        #[source]
        source: AssemblyError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Img2PdfError {
    /// True for [`Img2PdfError::NoImagesFound`].
    pub fn is_no_images_found(&self) -> bool {
        matches!(self, Img2PdfError::NoImagesFound { .. })
    }

    /// True for [`Img2PdfError::DirectoryTraversal`].
    pub fn is_directory_error(&self) -> bool {
        matches!(self, Img2PdfError::DirectoryTraversal { .. })
    }
}

/// Failure reported by an assembler.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// An image could not be opened or decoded.
    #[error("cannot decode image '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    /// The PDF object model rejected the document.
    #[error("PDF serialisation failed: {0}")]
    Pdf(String),

    /// File-system failure while writing the output.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The assembler was handed nothing to write.
    #[error("no images to assemble")]
    Empty,
}

/// A non-fatal reason an input entry was excluded.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryWarning {
    /// The file's extension is not one of the recognised image formats.
    #[error("skipping '{}': unsupported extension {extension:?}", path.display())]
    UnsupportedExtension { path: PathBuf, extension: String },

    /// The path does not exist.
    #[error("skipping '{}': file not found", path.display())]
    NotFound { path: PathBuf },

    /// The path exists but its metadata could not be read.
    #[error("skipping '{}': {detail}", path.display())]
    StatFailed { path: PathBuf, detail: String },

    /// The path is neither a regular file nor a directory.
    #[error("skipping '{}': not a regular file", path.display())]
    NotAFile { path: PathBuf },

    /// The same file was already collected from an earlier token.
    #[error("skipping '{}': already collected", path.display())]
    Duplicate { path: PathBuf },
}

impl EntryWarning {
    /// The path the warning refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            EntryWarning::UnsupportedExtension { path, .. }
            | EntryWarning::NotFound { path }
            | EntryWarning::StatFailed { path, .. }
            | EntryWarning::NotAFile { path }
            | EntryWarning::Duplicate { path } => path,
        }
    }
}
