//! Input resolution: turn a comma-separated list of files and directories
//! into a flat, validated list of [`ImageEntry`] values.
//!
//! Each token is trimmed; blank tokens are ignored. Directories are walked
//! recursively with entries visited in file-name order, so discovery order is
//! reproducible across runs. Problems with a single entry never abort the
//! run: they are recorded as [`EntryWarning`]s and logged. Only a directory
//! that cannot be read is fatal.

use crate::error::{EntryWarning, Img2PdfError};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions (lower-case, without the dot) accepted as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tif", "tiff"];

/// One image file destined for the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    /// Path as given on the command line or as discovered by the walk.
    pub path: PathBuf,
    /// Last-modified time at collection time.
    pub modified: SystemTime,
}

impl ImageEntry {
    /// Base name of the file as raw bytes, used for name ordering.
    pub fn name_bytes(&self) -> &[u8] {
        self.path
            .file_name()
            .map(|n| n.as_encoded_bytes())
            .unwrap_or_default()
    }
}

/// Result of resolving an input string.
#[derive(Debug, Default, Serialize)]
pub struct Resolution {
    /// Entries in discovery order.
    pub entries: Vec<ImageEntry>,
    /// Every entry that was excluded, in the order it was encountered.
    pub warnings: Vec<EntryWarning>,
}

/// Check whether `path` carries one of the recognised image extensions.
///
/// The comparison is case-insensitive: `scan.TIFF` counts.
pub fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        IMAGE_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Resolve a comma-separated input string into image entries.
///
/// Zero entries is not an error here; the caller decides what an empty
/// result means.
///
/// # Errors
/// Returns [`Img2PdfError::DirectoryTraversal`] when a directory named in the
/// input, or one found beneath it, cannot be read.
pub fn resolve_inputs(input: &str, follow_symlinks: bool) -> Result<Resolution, Img2PdfError> {
    let mut collector = Collector::default();

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let path = PathBuf::from(token);
        if path.is_dir() {
            collector.walk(&path, follow_symlinks)?;
        } else {
            collector.add_file(path);
        }
    }

    info!(
        "Collected {} images ({} skipped)",
        collector.resolution.entries.len(),
        collector.resolution.warnings.len()
    );
    Ok(collector.resolution)
}

#[derive(Default)]
struct Collector {
    resolution: Resolution,
    seen: HashSet<PathBuf>,
}

impl Collector {
    /// A file named directly in the input.
    fn add_file(&mut self, path: PathBuf) {
        if !is_image_file(&path) {
            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.skip(EntryWarning::UnsupportedExtension { path, extension });
            return;
        }
        self.stat_and_push(path);
    }

    fn walk(&mut self, root: &Path, follow_symlinks: bool) -> Result<(), Img2PdfError> {
        debug!("Walking directory: {}", root.display());
        let walker = WalkDir::new(root)
            .follow_links(follow_symlinks)
            .sort_by_file_name();

        for item in walker {
            let entry = match item {
                Ok(entry) => entry,
                Err(err) => {
                    self.walk_error(root, err)?;
                    continue;
                }
            };

            if entry.file_type().is_dir() || !is_image_file(entry.path()) {
                continue;
            }
            // An unfollowed link to a directory is not a file, whatever its name.
            if entry.path_is_symlink() && entry.path().is_dir() {
                debug!("Not following directory link: {}", entry.path().display());
                continue;
            }
            self.stat_and_push(entry.into_path());
        }
        Ok(())
    }

    /// Classify a walk error: entries that vanished or loop back are skipped,
    /// anything else means a directory could not be read.
    fn walk_error(&mut self, root: &Path, err: walkdir::Error) -> Result<(), Img2PdfError> {
        let path = err.path().unwrap_or(root).to_path_buf();

        if err.loop_ancestor().is_some() {
            self.skip(EntryWarning::StatFailed {
                path,
                detail: "symbolic link loop".into(),
            });
            return Ok(());
        }

        if let Some(io_err) = err.io_error() {
            if io_err.kind() == io::ErrorKind::NotFound {
                self.skip(EntryWarning::NotFound { path });
                return Ok(());
            }
        }

        let reason = err
            .io_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| err.to_string());
        Err(Img2PdfError::DirectoryTraversal { path, reason })
    }

    fn stat_and_push(&mut self, path: PathBuf) {
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.skip(EntryWarning::NotFound { path });
                return;
            }
            Err(e) => {
                self.skip(EntryWarning::StatFailed {
                    path,
                    detail: e.to_string(),
                });
                return;
            }
        };

        if !metadata.is_file() {
            self.skip(EntryWarning::NotAFile { path });
            return;
        }

        let modified = match metadata.modified() {
            Ok(t) => t,
            Err(e) => {
                self.skip(EntryWarning::StatFailed {
                    path,
                    detail: e.to_string(),
                });
                return;
            }
        };

        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if !self.seen.insert(key) {
            self.skip(EntryWarning::Duplicate { path });
            return;
        }

        debug!("Collected {}", path.display());
        self.resolution.entries.push(ImageEntry { path, modified });
    }

    fn skip(&mut self, warning: EntryWarning) {
        warn!("{}", warning);
        self.resolution.warnings.push(warning);
    }
}
