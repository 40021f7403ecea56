//! Configuration types for image-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The CLI maps its flags onto the
//! builder once at startup; the library never reads global state.

use crate::error::Img2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Configuration for an image-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use img2pdf::{ConversionConfig, PageSize, SortOrder};
///
/// let config = ConversionConfig::builder()
///     .order(SortOrder::ByName)
///     .page_size(PageSize::A4)
///     .margin(18.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.order, SortOrder::ByName);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Ordering applied to the collected images. Default: [`SortOrder::Sequential`].
    pub order: SortOrder,

    /// Page geometry. Default: [`PageSize::Image`].
    pub page_size: PageSize,

    /// Blank border around each image, in points. Default: 0.
    pub margin: f32,

    /// Resolution used to turn pixels into points when the page follows the
    /// image size. Range: 72–600. Default: 72 (one pixel per point).
    pub dpi: u32,

    /// Follow symbolic links to directories while walking. Default: false.
    ///
    /// Symlinks to files are always resolved when they are stat'ed.
    pub follow_symlinks: bool,

    /// Document title written to the PDF info dictionary.
    pub title: Option<String>,

    /// Optional progress callback for per-page events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            order: SortOrder::default(),
            page_size: PageSize::default(),
            margin: 0.0,
            dpi: 72,
            follow_symlinks: false,
            title: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("order", &self.order)
            .field("page_size", &self.page_size)
            .field("margin", &self.margin)
            .field("dpi", &self.dpi)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("title", &self.title)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn order(mut self, order: SortOrder) -> Self {
        self.config.order = order;
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn margin(mut self, points: f32) -> Self {
        self.config.margin = points;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn follow_symlinks(mut self, v: bool) -> Self {
        self.config.follow_symlinks = v;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Img2PdfError> {
        let c = &self.config;
        if !(72..=600).contains(&c.dpi) {
            return Err(Img2PdfError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if !c.margin.is_finite() || c.margin < 0.0 {
            return Err(Img2PdfError::InvalidConfig(format!(
                "Margin must be a non-negative number of points, got {}",
                c.margin
            )));
        }
        if let Some((w, h)) = c.page_size.dimensions() {
            if c.margin * 2.0 >= w.min(h) {
                return Err(Img2PdfError::InvalidConfig(format!(
                    "Margin {}pt leaves no drawable area on a {}x{}pt page",
                    c.margin, w, h
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Order in which collected images become pages.
///
/// All sorts are stable: entries with equal keys keep their discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Discovery order: input-list order, then directory-walk order. (default)
    #[default]
    Sequential,
    /// Byte-wise, case-sensitive comparison of the file's base name.
    ByName,
    /// Ascending last-modified time.
    ByModTime,
}

impl SortOrder {
    /// Map a command-line order flag (`seq`, `nam`, `mod`) to a sort order.
    ///
    /// Unrecognised values fall back to [`SortOrder::Sequential`].
    pub fn from_flag(flag: &str) -> Self {
        match flag.trim() {
            "seq" => SortOrder::Sequential,
            "nam" => SortOrder::ByName,
            "mod" => SortOrder::ByModTime,
            other => {
                tracing::debug!("Unknown order '{}', using sequential", other);
                SortOrder::Sequential
            }
        }
    }

    /// The short flag spelling of this order.
    pub fn as_flag(&self) -> &'static str {
        match self {
            SortOrder::Sequential => "seq",
            SortOrder::ByName => "nam",
            SortOrder::ByModTime => "mod",
        }
    }
}

/// Page geometry for the assembled document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    /// Each page is as large as its image at the configured DPI. (default)
    #[default]
    Image,
    /// ISO A4, 595 × 842 pt. Images are scaled to fit and centred.
    A4,
    /// US Letter, 612 × 792 pt. Images are scaled to fit and centred.
    Letter,
}

impl PageSize {
    /// Fixed paper dimensions in points, or `None` when the page follows the image.
    pub fn dimensions(&self) -> Option<(f32, f32)> {
        match self {
            PageSize::Image => None,
            PageSize::A4 => Some((595.0, 842.0)),
            PageSize::Letter => Some((612.0, 792.0)),
        }
    }
}
