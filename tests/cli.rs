//! Integration tests for the `img2pdf` binary.
//!
//! These run the compiled executable as a child process, so stdout and
//! stderr are pipes rather than a terminal: no progress bar is drawn and
//! skipped entries are reported through the log on stderr.
//!
//! Run with:
//!   cargo test --test cli

#![cfg(feature = "cli")]

use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

const ENV_VARS: &[&str] = &[
    "RUST_LOG",
    "IMG2PDF_INPUT",
    "IMG2PDF_OUTPUT",
    "IMG2PDF_ORDER",
    "IMG2PDF_PAGE_SIZE",
    "IMG2PDF_MARGIN",
    "IMG2PDF_DPI",
    "IMG2PDF_TITLE",
    "IMG2PDF_FOLLOW_SYMLINKS",
    "IMG2PDF_DRY_RUN",
    "IMG2PDF_JSON",
    "IMG2PDF_NO_PROGRESS",
    "IMG2PDF_VERBOSE",
    "IMG2PDF_QUIET",
];

fn img2pdf(dir: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_img2pdf"));
    cmd.current_dir(dir).args(args);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.output().expect("failed to spawn img2pdf")
}

fn write_image(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(w, h, Rgb([120, 60, 200]))
        .save(&path)
        .unwrap();
    path
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ── Success ──────────────────────────────────────────────────────────────────

#[test]
fn converts_and_reports_success() {
    let tmp = TempDir::new().unwrap();
    write_image(tmp.path(), "a.png", 10, 10);
    write_image(tmp.path(), "b.jpg", 12, 12);
    let pdf = tmp.path().join("book.pdf");

    let out = img2pdf(
        tmp.path(),
        &["-i", "a.png,b.jpg", "-o", &pdf.to_string_lossy()],
    );

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out).trim(),
        format!("Successfully converted 2 images to {}", pdf.display())
    );
    assert!(pdf.exists());
}

#[test]
fn legacy_single_dash_flags_are_accepted() {
    let tmp = TempDir::new().unwrap();
    write_image(tmp.path(), "z.png", 8, 8);
    write_image(tmp.path(), "a.png", 9, 9);

    let out = img2pdf(
        tmp.path(),
        &["-input", "z.png,a.png", "-output", "legacy.pdf", "-order", "nam"],
    );

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Successfully converted 2 images to legacy.pdf"));
    assert!(tmp.path().join("legacy.pdf").exists());
}

#[test]
fn help_exits_zero() {
    let tmp = TempDir::new().unwrap();
    let out = img2pdf(tmp.path(), &["-help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("--input"), "stdout: {}", stdout(&out));
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[test]
fn missing_input_flag_fails_with_usage() {
    let tmp = TempDir::new().unwrap();
    let out = img2pdf(tmp.path(), &[]);

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("Usage"), "stderr: {err}");
    assert!(err.contains("Error:"), "stderr: {err}");
    assert!(!tmp.path().join("output.pdf").exists());
}

#[test]
fn blank_input_fails() {
    let tmp = TempDir::new().unwrap();
    let out = img2pdf(tmp.path(), &["-i", "  "]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Error:"), "stderr: {}", stderr(&out));
}

#[test]
fn no_images_found_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let out = img2pdf(tmp.path(), &["-i", "gone.jpg,also-gone.png", "-o", "x.pdf"]);

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("Error:"), "stderr: {err}");
    assert!(err.contains("No images found"), "stderr: {err}");
    assert!(!tmp.path().join("x.pdf").exists());
}

// ── Warnings on a non-terminal stderr ────────────────────────────────────────

#[test]
fn skipped_entry_is_reported_on_stderr() {
    let tmp = TempDir::new().unwrap();
    write_image(tmp.path(), "a.png", 10, 10);
    std::fs::write(tmp.path().join("notes.txt"), "hello").unwrap();

    let out = img2pdf(tmp.path(), &["-i", "a.png,notes.txt,missing.jpg"]);

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let err = stderr(&out);
    assert!(err.contains("notes.txt"), "stderr: {err}");
    assert!(err.contains("missing.jpg"), "stderr: {err}");
    assert!(stdout(&out).contains("Successfully converted 1 images"));
}

#[test]
fn piped_stderr_has_no_colour_codes() {
    let tmp = TempDir::new().unwrap();
    write_image(tmp.path(), "a.png", 10, 10);

    let out = img2pdf(tmp.path(), &["-i", "a.png,missing.jpg"]);

    assert_eq!(out.status.code(), Some(0));
    let err = stderr(&out);
    assert!(err.contains("missing.jpg"), "stderr: {err}");
    assert!(!err.contains('\x1b'), "stderr: {err:?}");
}

#[test]
fn quiet_keeps_success_line() {
    let tmp = TempDir::new().unwrap();
    write_image(tmp.path(), "a.png", 10, 10);

    let out = img2pdf(tmp.path(), &["-i", "a.png,missing.jpg", "--quiet"]);

    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("Successfully converted 1 images"));
    assert!(!stderr(&out).contains("missing.jpg"), "stderr: {}", stderr(&out));
}

// ── Dry run ──────────────────────────────────────────────────────────────────

#[test]
fn dry_run_lists_order_without_writing() {
    let tmp = TempDir::new().unwrap();
    write_image(tmp.path(), "b.png", 10, 10);
    write_image(tmp.path(), "a.png", 10, 10);

    let out = img2pdf(tmp.path(), &["-i", "b.png,a.png", "--order", "nam", "--dry-run"]);

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let lines: Vec<String> = stdout(&out).lines().map(str::to_string).collect();
    assert_eq!(lines, ["a.png", "b.png"]);
    assert!(!tmp.path().join("output.pdf").exists());
}
