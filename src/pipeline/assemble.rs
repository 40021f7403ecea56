//! Document assembly: an ordered list of image paths → one PDF file.
//!
//! The [`Assembler`] trait is the seam between the collection pipeline and
//! whatever produces the document. [`PdfAssembler`] is the default
//! implementation: JPEG files are embedded byte-for-byte as `/DCTDecode`
//! streams, other formats are decoded with `image` and compressed with
//! `flate2`, and the document is built with `lopdf`, one image per page.
//!
//! The file is written to a temporary sibling of the destination and renamed
//! into place only after serialisation succeeds, so a failed run never leaves
//! a truncated PDF behind.

use crate::config::{ConversionConfig, PageSize, POINTS_PER_INCH};
use crate::error::AssemblyError;
use crate::pipeline::encode::{self, EncodedImage, StreamFilter};
use crate::progress::ConversionProgressCallback;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Produces a single output document from an ordered list of images.
pub trait Assembler {
    /// Write `images`, in order, to `output`.
    ///
    /// Implementations must not leave a file at `output` when they fail.
    fn assemble(
        &self,
        images: &[PathBuf],
        output: &Path,
        progress: &dyn ConversionProgressCallback,
    ) -> Result<(), AssemblyError>;
}

/// Where an image lands on its page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page_width: f32,
    pub page_height: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Compute the page box and image rectangle for a `px_width × px_height` image.
///
/// With [`PageSize::Image`] the page wraps the image at `dpi` plus the margin.
/// With fixed paper the image is scaled to fit inside the margins, keeping its
/// aspect ratio, and centred.
pub fn layout(page_size: PageSize, margin: f32, dpi: u32, px_width: u32, px_height: u32) -> Placement {
    let px_w = px_width.max(1) as f32;
    let px_h = px_height.max(1) as f32;

    match page_size.dimensions() {
        None => {
            let scale = POINTS_PER_INCH / dpi as f32;
            let (width, height) = (px_w * scale, px_h * scale);
            Placement {
                page_width: width + 2.0 * margin,
                page_height: height + 2.0 * margin,
                x: margin,
                y: margin,
                width,
                height,
            }
        }
        Some((page_width, page_height)) => {
            let avail_w = page_width - 2.0 * margin;
            let avail_h = page_height - 2.0 * margin;
            let scale = (avail_w / px_w).min(avail_h / px_h);
            let (width, height) = (px_w * scale, px_h * scale);
            Placement {
                page_width,
                page_height,
                x: (page_width - width) / 2.0,
                y: (page_height - height) / 2.0,
                width,
                height,
            }
        }
    }
}

/// The default assembler, backed by `lopdf`.
#[derive(Debug, Clone)]
pub struct PdfAssembler {
    page_size: PageSize,
    margin: f32,
    dpi: u32,
    title: Option<String>,
}

impl PdfAssembler {
    /// Take page geometry and metadata from `config`.
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            page_size: config.page_size,
            margin: config.margin,
            dpi: config.dpi,
            title: config.title.clone(),
        }
    }

    /// Load `path` and append it as a page under `pages_id`.
    fn add_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        path: &Path,
    ) -> Result<ObjectId, AssemblyError> {
        let encoded = load_image(path)?;

        let placement = layout(
            self.page_size,
            self.margin,
            self.dpi,
            encoded.width,
            encoded.height,
        );
        let image_id = add_image_xobject(doc, encoded);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        placement.width.into(),
                        0.into(),
                        0.into(),
                        placement.height.into(),
                        placement.x.into(),
                        placement.y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content = content
            .encode()
            .map_err(|e| AssemblyError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            placement.page_width.into(),
            placement.page_height.into(),
        ];
        page.set("MediaBox", Object::Array(media_box));
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Dictionary(resources));

        debug!(
            "Placed {} on {:.1}x{:.1}pt page",
            path.display(),
            placement.page_width,
            placement.page_height
        );
        Ok(doc.add_object(page))
    }

    fn info_dictionary(&self) -> Dictionary {
        let mut info = Dictionary::new();
        info.set(
            "Producer",
            Object::string_literal(format!("img2pdf {}", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(ref title) = self.title {
            info.set("Title", text_string(title));
        }
        info
    }
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new(&ConversionConfig::default())
    }
}

impl Assembler for PdfAssembler {
    fn assemble(
        &self,
        images: &[PathBuf],
        output: &Path,
        progress: &dyn ConversionProgressCallback,
    ) -> Result<(), AssemblyError> {
        if images.is_empty() {
            return Err(AssemblyError::Empty);
        }

        let total = images.len();
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        progress.on_conversion_start(total);
        let mut kids = Vec::with_capacity(total);
        for (idx, path) in images.iter().enumerate() {
            progress.on_page_start(idx + 1, total, path);
            let page_id = self.add_page(&mut doc, pages_id, path)?;
            kids.push(Object::Reference(page_id));
            progress.on_page_complete(idx + 1, total);
        }

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(total as i64));
        pages.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let info_id = doc.add_object(self.info_dictionary());
        doc.trailer.set("Info", Object::Reference(info_id));

        write_atomically(&mut doc, output)?;
        info!("Wrote {} pages to {}", total, output.display());
        progress.on_conversion_complete(total);
        Ok(())
    }
}

fn decode_error(path: &Path, reason: impl ToString) -> AssemblyError {
    AssemblyError::Decode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn has_jpeg_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        ext == "jpg" || ext == "jpeg"
    })
}

/// JPEG files are embedded verbatim; everything else is decoded.
fn load_image(path: &Path) -> Result<EncodedImage, AssemblyError> {
    if has_jpeg_extension(path) {
        let bytes = fs::read(path).map_err(|e| decode_error(path, e))?;
        if let Some(encoded) = encode::encode_jpeg(bytes).map_err(|e| decode_error(path, e))? {
            return Ok(encoded);
        }
        debug!("Re-encoding {} losslessly", path.display());
    }

    let img = image::open(path).map_err(|e| decode_error(path, e))?;
    encode::encode_image(&img).map_err(|e| decode_error(path, format!("compression failed: {e}")))
}

/// A PDF text string: literal for ASCII, UTF-16BE with a byte-order mark
/// otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::string_literal(s);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(s.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Add the image (and its soft mask, if any) and return the image's id.
fn add_image_xobject(doc: &mut Document, encoded: EncodedImage) -> ObjectId {
    let smask_id = encoded.alpha.map(|alpha| {
        let dict = image_dictionary(
            encoded.width,
            encoded.height,
            b"DeviceGray",
            StreamFilter::Flate,
        );
        doc.add_object(Stream::new(dict, alpha))
    });

    let mut dict = image_dictionary(
        encoded.width,
        encoded.height,
        encoded.color_space.pdf_name(),
        encoded.filter,
    );
    if let Some(id) = smask_id {
        dict.set("SMask", Object::Reference(id));
    }
    doc.add_object(Stream::new(dict, encoded.data))
}

fn image_dictionary(
    width: u32,
    height: u32,
    color_space: &[u8],
    filter: StreamFilter,
) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(filter.pdf_name().to_vec()));
    dict
}

/// Serialise `doc` next to `output`, then rename it into place.
fn write_atomically(doc: &mut Document, output: &Path) -> Result<(), AssemblyError> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| AssemblyError::Io {
        path: parent.clone(),
        source,
    })?;

    let mut tmp = NamedTempFile::new_in(&parent).map_err(|source| AssemblyError::Io {
        path: parent.clone(),
        source,
    })?;
    doc.save_to(&mut tmp)
        .map_err(|e| AssemblyError::Pdf(e.to_string()))?;
    tmp.persist(output).map_err(|e| AssemblyError::Io {
        path: output.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgressCallback;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn write_rgb(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb([200, 100, 50])).save(&path).unwrap();
        path
    }

    fn number(obj: &Object) -> f32 {
        match obj {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r as f32,
            other => panic!("not a number: {other:?}"),
        }
    }

    fn page_sizes(path: &Path) -> Vec<(f32, f32)> {
        let doc = Document::load(path).unwrap();
        doc.get_pages()
            .values()
            .map(|id| {
                let page = doc.get_object(*id).unwrap().as_dict().unwrap();
                let media = page.get(b"MediaBox").unwrap().as_array().unwrap();
                (number(&media[2]), number(&media[3]))
            })
            .collect()
    }

    #[test]
    fn layout_follows_image_at_72_dpi() {
        let p = layout(PageSize::Image, 0.0, 72, 300, 200);
        assert_eq!((p.page_width, p.page_height), (300.0, 200.0));
        assert_eq!((p.x, p.y, p.width, p.height), (0.0, 0.0, 300.0, 200.0));
    }

    #[test]
    fn layout_image_mode_honours_dpi_and_margin() {
        let p = layout(PageSize::Image, 10.0, 144, 300, 200);
        assert_eq!((p.width, p.height), (150.0, 100.0));
        assert_eq!((p.page_width, p.page_height), (170.0, 120.0));
        assert_eq!((p.x, p.y), (10.0, 10.0));
    }

    #[test]
    fn layout_fits_and_centres_on_paper() {
        // A wide image on A4: width-bound.
        let p = layout(PageSize::A4, 0.0, 72, 1190, 100);
        assert_eq!((p.page_width, p.page_height), (595.0, 842.0));
        assert!((p.width - 595.0).abs() < 0.01);
        assert!((p.height - 50.0).abs() < 0.01);
        assert!((p.y - (842.0 - 50.0) / 2.0).abs() < 0.01);

        // A tall image on Letter with a margin: height-bound.
        let p = layout(PageSize::Letter, 36.0, 72, 100, 1000);
        assert!((p.height - 720.0).abs() < 0.01);
        assert!((p.width - 72.0).abs() < 0.01);
        assert!((p.x - (612.0 - 72.0) / 2.0).abs() < 0.01);
    }

    #[test]
    fn one_page_per_image_in_order() {
        let tmp = TempDir::new().unwrap();
        let a = write_rgb(tmp.path(), "a.png", 30, 10);
        let b = write_rgb(tmp.path(), "b.jpg", 20, 40);
        let c = write_rgb(tmp.path(), "c.tiff", 50, 50);
        let out = tmp.path().join("out.pdf");

        PdfAssembler::default()
            .assemble(&[b, c, a], &out, &NoopProgressCallback)
            .unwrap();

        assert_eq!(
            page_sizes(&out),
            vec![(20.0, 40.0), (50.0, 50.0), (30.0, 10.0)]
        );
    }

    #[test]
    fn fixed_paper_pages_have_paper_size() {
        let tmp = TempDir::new().unwrap();
        let a = write_rgb(tmp.path(), "a.png", 30, 10);
        let out = tmp.path().join("a4.pdf");
        let config = ConversionConfig::builder()
            .page_size(PageSize::A4)
            .build()
            .unwrap();

        PdfAssembler::new(&config)
            .assemble(&[a], &out, &NoopProgressCallback)
            .unwrap();
        assert_eq!(page_sizes(&out), vec![(595.0, 842.0)]);
    }

    #[test]
    fn translucent_png_gets_soft_mask() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("logo.png");
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img.save(&path).unwrap();
        let out = tmp.path().join("logo.pdf");

        PdfAssembler::default()
            .assemble(&[path], &out, &NoopProgressCallback)
            .unwrap();

        let doc = Document::load(&out).unwrap();
        let masked = doc.objects.values().any(|obj| match obj {
            Object::Stream(s) => s.dict.has(b"SMask"),
            _ => false,
        });
        assert!(masked);
    }

    #[test]
    fn title_and_producer_are_recorded() {
        let tmp = TempDir::new().unwrap();
        let a = write_rgb(tmp.path(), "a.png", 5, 5);
        let out = tmp.path().join("titled.pdf");
        let config = ConversionConfig::builder().title("Field notes").build().unwrap();

        PdfAssembler::new(&config)
            .assemble(&[a], &out, &NoopProgressCallback)
            .unwrap();

        let doc = Document::load(&out).unwrap();
        let info_id = match doc.trailer.get(b"Info").unwrap() {
            Object::Reference(id) => *id,
            other => panic!("Info is not a reference: {other:?}"),
        };
        let info = doc.get_object(info_id).unwrap().as_dict().unwrap();
        match info.get(b"Title").unwrap() {
            Object::String(bytes, _) => assert_eq!(bytes.as_slice(), b"Field notes"),
            other => panic!("Title is not a string: {other:?}"),
        }
        assert!(info.has(b"Producer"));
    }

    fn image_streams(doc: &Document) -> Vec<&Stream> {
        doc.objects
            .values()
            .filter_map(|obj| match obj {
                Object::Stream(s) if s.dict.has(b"Width") => Some(s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn jpeg_is_embedded_verbatim() {
        let tmp = TempDir::new().unwrap();
        let photo = write_rgb(tmp.path(), "photo.jpg", 40, 30);
        let source = fs::read(&photo).unwrap();
        let out = tmp.path().join("photo.pdf");

        PdfAssembler::default()
            .assemble(&[photo], &out, &NoopProgressCallback)
            .unwrap();

        let doc = Document::load(&out).unwrap();
        let images = image_streams(&doc);
        assert_eq!(images.len(), 1);
        let filter = images[0].dict.get(b"Filter").unwrap().as_name().unwrap();
        assert_eq!(filter, b"DCTDecode");
        assert_eq!(images[0].content, source);
        assert_eq!(page_sizes(&out), vec![(40.0, 30.0)]);
    }

    #[test]
    fn png_is_stored_with_flate() {
        let tmp = TempDir::new().unwrap();
        let a = write_rgb(tmp.path(), "a.png", 4, 4);
        let out = tmp.path().join("a.pdf");

        PdfAssembler::default()
            .assemble(&[a], &out, &NoopProgressCallback)
            .unwrap();

        let doc = Document::load(&out).unwrap();
        let images = image_streams(&doc);
        let filter = images[0].dict.get(b"Filter").unwrap().as_name().unwrap();
        assert_eq!(filter, b"FlateDecode");
    }

    #[test]
    fn non_ascii_title_is_utf16() {
        match text_string("Café") {
            Object::String(bytes, _) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                let units: Vec<u16> = bytes[2..]
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                assert_eq!(String::from_utf16(&units).unwrap(), "Café");
            }
            other => panic!("not a string: {other:?}"),
        }
        match text_string("Plain") {
            Object::String(bytes, _) => assert_eq!(bytes, b"Plain"),
            other => panic!("not a string: {other:?}"),
        }
    }

    #[test]
    fn creates_missing_output_directories() {
        let tmp = TempDir::new().unwrap();
        let a = write_rgb(tmp.path(), "a.png", 5, 5);
        let out = tmp.path().join("nested/deeper/out.pdf");

        PdfAssembler::default()
            .assemble(&[a], &out, &NoopProgressCallback)
            .unwrap();
        assert!(out.is_file());
    }

    #[test]
    fn undecodable_image_fails_without_output() {
        let tmp = TempDir::new().unwrap();
        let good = write_rgb(tmp.path(), "good.png", 5, 5);
        let bad = tmp.path().join("bad.jpg");
        fs::write(&bad, b"definitely not a jpeg").unwrap();
        let out = tmp.path().join("out.pdf");

        let err = PdfAssembler::default()
            .assemble(&[good, bad.clone()], &out, &NoopProgressCallback)
            .unwrap_err();
        match err {
            AssemblyError::Decode { path, .. } => assert_eq!(path, bad),
            other => panic!("expected Decode, got {other:?}"),
        }
        assert!(!out.exists());
        // No temp file left behind either.
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(true, |x| x != "png" && x != "jpg"))
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
    }

    #[test]
    fn existing_output_survives_failed_run() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out.pdf");
        fs::write(&out, b"previous contents").unwrap();
        let bad = tmp.path().join("bad.png");
        fs::write(&bad, b"garbage").unwrap();

        assert!(PdfAssembler::default()
            .assemble(&[bad], &out, &NoopProgressCallback)
            .is_err());
        assert_eq!(fs::read(&out).unwrap(), b"previous contents");
    }

    #[test]
    fn empty_list_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out.pdf");
        let err = PdfAssembler::default()
            .assemble(&[], &out, &NoopProgressCallback)
            .unwrap_err();
        assert!(matches!(err, AssemblyError::Empty));
        assert!(!out.exists());
    }

    #[test]
    fn progress_sees_every_page() {
        struct Counter(AtomicUsize, AtomicUsize);
        impl ConversionProgressCallback for Counter {
            fn on_page_complete(&self, _page_num: usize, _total_pages: usize) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            fn on_conversion_complete(&self, total_pages: usize) {
                self.1.store(total_pages, Ordering::SeqCst);
            }
        }

        let tmp = TempDir::new().unwrap();
        let a = write_rgb(tmp.path(), "a.png", 5, 5);
        let b = write_rgb(tmp.path(), "b.png", 6, 6);
        let out = tmp.path().join("out.pdf");
        let counter = Counter(AtomicUsize::new(0), AtomicUsize::new(0));

        PdfAssembler::default()
            .assemble(&[a, b], &out, &counter)
            .unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
        assert_eq!(counter.1.load(Ordering::SeqCst), 2);
    }
}
