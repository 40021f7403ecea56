//! Conversion entry points.
//!
//! [`collect`] resolves and orders the input without writing anything;
//! [`convert_to_file`] additionally hands the ordered paths to the default
//! [`PdfAssembler`]; [`convert_with`] accepts any [`Assembler`].

use crate::config::ConversionConfig;
use crate::error::Img2PdfError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::assemble::{Assembler, PdfAssembler};
use crate::pipeline::input::{self, Resolution};
use crate::pipeline::order;
use crate::progress::{ConversionProgressCallback, NoopProgressCallback};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Resolve `input` into an ordered list of image entries.
///
/// Skipped entries are reported through the configured progress callback and
/// returned in [`Resolution::warnings`].
///
/// # Errors
/// - [`Img2PdfError::InvalidInput`] when `input` is empty or whitespace
/// - [`Img2PdfError::DirectoryTraversal`] when a directory cannot be read
pub fn collect(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<Resolution, Img2PdfError> {
    let input_str = input_str.as_ref();
    if input_str.trim().is_empty() {
        return Err(Img2PdfError::InvalidInput {
            input: input_str.to_string(),
        });
    }

    let mut resolution = input::resolve_inputs(input_str, config.follow_symlinks)?;

    if let Some(ref cb) = config.progress_callback {
        for warning in &resolution.warnings {
            cb.on_entry_skipped(warning);
        }
    }

    order::apply_order(&mut resolution.entries, config.order);
    Ok(resolution)
}

/// Collect the images named by `input_str` and write them to a PDF at `output_path`.
///
/// This is the primary entry point for the library.
///
/// # Example
/// ```rust,no_run
/// use img2pdf::{convert_to_file, ConversionConfig, SortOrder};
///
/// let config = ConversionConfig::builder()
///     .order(SortOrder::ByModTime)
///     .build()?;
/// let output = convert_to_file("scans/,cover.png", "book.pdf", &config)?;
/// println!("{} pages, {} skipped", output.stats.pages, output.stats.skipped);
/// # Ok::<(), img2pdf::Img2PdfError>(())
/// ```
///
/// # Errors
/// Everything [`collect`] returns, plus:
/// - [`Img2PdfError::NoImagesFound`] when nothing usable was collected
/// - [`Img2PdfError::AssemblyFailed`] when the PDF could not be written
pub fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Img2PdfError> {
    convert_with(&PdfAssembler::new(config), input_str, output_path, config)
}

/// Like [`convert_to_file`], with a caller-supplied assembler.
pub fn convert_with<A: Assembler + ?Sized>(
    assembler: &A,
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Img2PdfError> {
    let total_start = Instant::now();
    let output = output_path.as_ref();
    info!("Starting conversion → {}", output.display());

    // ── Step 1: Collect and order ────────────────────────────────────────
    let resolution = collect(input_str, config)?;
    let collect_duration_ms = total_start.elapsed().as_millis() as u64;

    if resolution.entries.is_empty() {
        return Err(Img2PdfError::NoImagesFound {
            skipped: resolution.warnings.len(),
        });
    }

    // ── Step 2: Assemble ─────────────────────────────────────────────────
    let paths: Vec<PathBuf> = resolution.entries.iter().map(|e| e.path.clone()).collect();
    let noop = NoopProgressCallback;
    let progress: &dyn ConversionProgressCallback = match config.progress_callback {
        Some(ref cb) => cb.as_ref(),
        None => &noop,
    };

    let assemble_start = Instant::now();
    assembler
        .assemble(&paths, output, progress)
        .map_err(|source| Img2PdfError::AssemblyFailed {
            output: output.to_path_buf(),
            source,
        })?;
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        pages: resolution.entries.len(),
        skipped: resolution.warnings.len(),
        collect_duration_ms,
        assemble_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} pages, {} skipped, {}ms total",
        stats.pages, stats.skipped, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        output: output.to_path_buf(),
        entries: resolution.entries,
        warnings: resolution.warnings,
        stats,
    })
}
