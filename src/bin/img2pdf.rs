//! CLI binary for img2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use img2pdf::{
    collect, convert_to_file, ConversionConfig, ConversionProgressCallback, EntryWarning,
    Img2PdfError, PageSize, ProgressCallback, SortOrder,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────
// Every coloured string goes to stderr, so colour only when stderr is a tty.

fn paint(code: &str, s: &str) -> String {
    if io::stderr().is_terminal() {
        format!("\x1b[{code}m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}
fn green(s: &str) -> String {
    paint("32", s)
}
fn yellow(s: &str) -> String {
    paint("33", s)
}
fn dim(s: &str) -> String {
    paint("2", s)
}
fn bold(s: &str) -> String {
    paint("1", s)
}
fn cyan(s: &str) -> String {
    paint("36", s)
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while inputs are collected, then a
/// page bar with one log line per embedded image.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-page start time and file name, keyed by page number.
    pages: Mutex<HashMap<usize, (Instant, String)>>,
}

impl CliProgressCallback {
    /// Create a callback whose bar length is set by `on_conversion_start`.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Collecting");
        bar.set_message("Scanning inputs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            pages: Mutex::new(HashMap::new()),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Assembling");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_entry_skipped(&self, warning: &EntryWarning) {
        let line = format!("  {} {}", yellow("⚠"), dim(&warning.to_string()));
        // `println` is a no-op on a hidden bar.
        if self.bar.is_hidden() {
            eprintln!("{line}");
        } else {
            self.bar.println(line);
        }
    }

    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Assembling {total_pages} images…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.bar.set_message(name.clone());
        self.pages
            .lock()
            .unwrap()
            .insert(page_num, (Instant::now(), name));
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        let (elapsed_ms, name) = self
            .pages
            .lock()
            .unwrap()
            .remove(&page_num)
            .map(|(t, name)| (t.elapsed().as_millis(), name))
            .unwrap_or_default();

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            green("✓"),
            page_num,
            total_pages,
            name,
            dim(&format!("{:.2}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages assembled",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"SUPPORTED FORMATS:
  JPG, JPEG, PNG, WEBP, TIF, TIFF (extension match is case-insensitive)

ORDER:
  seq   input order; directory contents in file-name order (default)
  nam   by file name, byte-wise and case-sensitive
  mod   by last-modified time, oldest first
  Any other value falls back to seq.

EXAMPLES:
  # A directory and a single file, in input order
  img2pdf -i "images/,photo.jpg" -o result.pdf

  # Oldest photo first
  img2pdf -i "images/,photo.jpg" -o result.pdf --order mod

  # Legacy single-dash flags are accepted too
  img2pdf -input scans/ -output book.pdf -order nam

  # Print the page order without writing anything
  img2pdf -i scans/ --order nam --dry-run

  # Fit every image onto A4 with a half-inch border
  img2pdf -i scans/ --page-size a4 --margin 36 -o book.pdf

ENVIRONMENT VARIABLES:
  IMG2PDF_INPUT, IMG2PDF_OUTPUT, IMG2PDF_ORDER, ...  Defaults for each flag
  RUST_LOG                                           Override the log filter
"#;

/// Combine JPG, PNG, WEBP and TIFF images into a single PDF.
#[derive(Parser, Debug)]
#[command(
    name = "img2pdf",
    version,
    about = "Combine images from files and directories into a single PDF",
    long_about = "Combine images into a single PDF, one image per page. Inputs are a \
comma-separated list of image files and directories; directories are searched recursively. \
Entries that are not supported images, or cannot be read, are skipped with a warning.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Comma-separated list of image files and/or directories.
    #[arg(short, long, env = "IMG2PDF_INPUT")]
    input: Option<String>,

    /// Path of the PDF to write.
    #[arg(short, long, env = "IMG2PDF_OUTPUT", default_value = "output.pdf")]
    output: PathBuf,

    /// Page order: seq, nam or mod.
    #[arg(long, env = "IMG2PDF_ORDER", default_value = "seq")]
    order: String,

    /// Page geometry: follow each image, or a fixed paper size.
    #[arg(long, env = "IMG2PDF_PAGE_SIZE", value_enum, default_value = "image")]
    page_size: PageSizeArg,

    /// Blank border around each image, in points.
    #[arg(long, env = "IMG2PDF_MARGIN", default_value_t = 0.0)]
    margin: f32,

    /// Pixels per inch used to size pages that follow the image (72–600).
    #[arg(long, env = "IMG2PDF_DPI", default_value_t = 72,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Document title stored in the PDF metadata.
    #[arg(long, env = "IMG2PDF_TITLE")]
    title: Option<String>,

    /// Follow symbolic links to directories.
    #[arg(long, env = "IMG2PDF_FOLLOW_SYMLINKS")]
    follow_symlinks: bool,

    /// Print the resolved, ordered image list and exit without writing.
    #[arg(long, env = "IMG2PDF_DRY_RUN")]
    dry_run: bool,

    /// Print structured JSON instead of the plain summary.
    #[arg(long, env = "IMG2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "IMG2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress progress and log output; errors are still printed.
    #[arg(short, long, env = "IMG2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
enum PageSizeArg {
    Image,
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::Image => PageSize::Image,
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
        }
    }
}

/// Long flags that older invocations spell with a single dash.
const LEGACY_FLAGS: &[&str] = &["input", "output", "order", "help"];

/// Rewrite `-input`, `-output`, `-order` and `-help` (and their `=value`
/// forms) to the double-dash spelling clap expects.
///
/// Without this, clap reads `-order` as `-o rder`. Arguments after a bare
/// `--` are left alone.
fn normalize_legacy_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;

    for arg in args {
        if passthrough {
            out.push(arg);
            continue;
        }
        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if s == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }
        let rewritten = s
            .strip_prefix('-')
            .filter(|rest| !rest.starts_with('-'))
            .filter(|rest| {
                let name = rest.split_once('=').map_or(*rest, |(name, _)| name);
                LEGACY_FLAGS.contains(&name)
            })
            .map(|rest| OsString::from(format!("--{rest}")));
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_legacy_args(std::env::args_os()));

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress callback prints skipped entries itself, so library logs
    // are limited to errors while the bar is active. Without a terminal the
    // bar is never drawn and warnings go through the log instead.
    let stderr_is_tty = io::stderr().is_terminal();
    let show_progress =
        stderr_is_tty && !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_ansi(stderr_is_tty)
        .init();

    // ── Input check ──────────────────────────────────────────────────────
    let input = match cli.input.as_deref() {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        other => {
            eprintln!("{}", Cli::command().render_usage());
            return Err(Img2PdfError::InvalidInput {
                input: other.unwrap_or_default().to_string(),
            }
            .into());
        }
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let resolution = collect(&input, &config).context("Failed to collect images")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&resolution).context("Failed to serialise output")?
            );
        } else {
            for entry in &resolution.entries {
                println!("{}", entry.path.display());
            }
        }

        if resolution.entries.is_empty() {
            return Err(Img2PdfError::NoImagesFound {
                skipped: resolution.warnings.len(),
            }
            .into());
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_to_file(&input, &cli.output, &config).context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        println!(
            "Successfully converted {} images to {}",
            output.stats.pages,
            output.output.display()
        );
        if !cli.quiet && output.stats.skipped > 0 {
            eprintln!(
                "   {} entries skipped, {}ms total",
                yellow(&output.stats.skipped.to_string()),
                output.stats.total_duration_ms,
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .order(SortOrder::from_flag(&cli.order))
        .page_size(cli.page_size.into())
        .margin(cli.margin)
        .dpi(cli.dpi)
        .follow_symlinks(cli.follow_symlinks);

    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
