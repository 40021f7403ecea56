//! Image encoding: source image → stream payload for a PDF image XObject.
//!
//! JPEG files are embedded as-is under `/DCTDecode`; only their header is
//! read. Formats PDF cannot carry natively (PNG, TIFF, WebP) are decoded and
//! their samples stored losslessly under `/FlateDecode`. Grayscale sources
//! stay single-channel (`DeviceGray`); everything else becomes 8-bit RGB. An
//! alpha channel is split out into a separate soft mask, and dropped entirely
//! when every pixel is opaque.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageResult};
use std::io::{self, Cursor, Write};
use tracing::debug;

/// PDF colour space of the encoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
}

impl ColorSpace {
    /// The PDF name for this colour space.
    pub fn pdf_name(&self) -> &'static [u8] {
        match self {
            ColorSpace::Gray => b"DeviceGray",
            ColorSpace::Rgb => b"DeviceRGB",
        }
    }
}

/// PDF stream filter of the encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFilter {
    /// Zlib-compressed raw samples.
    Flate,
    /// A complete baseline or progressive JPEG file.
    Dct,
}

impl StreamFilter {
    pub fn pdf_name(&self) -> &'static [u8] {
        match self {
            StreamFilter::Flate => b"FlateDecode",
            StreamFilter::Dct => b"DCTDecode",
        }
    }
}

/// Image payload ready to be wrapped in a PDF stream.
#[derive(Debug)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub filter: StreamFilter,
    /// Colour data, encoded as `filter` says.
    pub data: Vec<u8>,
    /// Zlib-compressed 8-bit alpha samples, present only when some pixel is
    /// not fully opaque.
    pub alpha: Option<Vec<u8>>,
}

/// Encode a decoded image for embedding.
pub fn encode_image(img: &DynamicImage) -> io::Result<EncodedImage> {
    let (width, height) = (img.width(), img.height());
    let color = img.color();

    let (color_space, samples, alpha) = match (color.has_color(), color.has_alpha()) {
        (false, false) => (ColorSpace::Gray, img.to_luma8().into_raw(), None),
        (true, false) => (ColorSpace::Rgb, img.to_rgb8().into_raw(), None),
        (false, true) => {
            let (samples, alpha) = split_alpha(&img.to_luma_alpha8().into_raw(), 2);
            (ColorSpace::Gray, samples, Some(alpha))
        }
        (true, true) => {
            let (samples, alpha) = split_alpha(&img.to_rgba8().into_raw(), 4);
            (ColorSpace::Rgb, samples, Some(alpha))
        }
    };

    let alpha = alpha.filter(|a| a.iter().any(|&v| v != u8::MAX));
    let data = deflate(&samples)?;
    let alpha = alpha.map(|a| deflate(&a)).transpose()?;

    debug!(
        "Encoded {}x{} {:?} image → {} bytes{}",
        width,
        height,
        color_space,
        data.len(),
        if alpha.is_some() { " + soft mask" } else { "" }
    );

    Ok(EncodedImage {
        width,
        height,
        color_space,
        filter: StreamFilter::Flate,
        data,
        alpha,
    })
}

/// Wrap the bytes of a JPEG file for embedding without decoding its pixels.
///
/// Returns `Ok(None)` for JPEGs whose colour model has no direct PDF
/// counterpart here (CMYK, 16-bit); callers fall back to [`encode_image`].
///
/// # Errors
/// Fails when `data` does not start with a readable JPEG header.
pub fn encode_jpeg(data: Vec<u8>) -> ImageResult<Option<EncodedImage>> {
    let (width, height, original) = {
        let decoder = JpegDecoder::new(Cursor::new(data.as_slice()))?;
        let (w, h) = decoder.dimensions();
        (w, h, decoder.original_color_type())
    };

    let color_space = match original {
        ExtendedColorType::L8 => ColorSpace::Gray,
        ExtendedColorType::Rgb8 => ColorSpace::Rgb,
        other => {
            debug!("JPEG colour type {:?} cannot be passed through", other);
            return Ok(None);
        }
    };

    debug!(
        "Passing through {}x{} {:?} JPEG ({} bytes)",
        width,
        height,
        color_space,
        data.len()
    );
    Ok(Some(EncodedImage {
        width,
        height,
        color_space,
        filter: StreamFilter::Dct,
        data,
        alpha: None,
    }))
}

/// Split interleaved pixels whose last channel is alpha.
fn split_alpha(raw: &[u8], channels: usize) -> (Vec<u8>, Vec<u8>) {
    let pixels = raw.len() / channels;
    let mut samples = Vec::with_capacity(pixels * (channels - 1));
    let mut alpha = Vec::with_capacity(pixels);
    for px in raw.chunks_exact(channels) {
        samples.extend_from_slice(&px[..channels - 1]);
        alpha.push(px[channels - 1]);
    }
    (samples, alpha)
}

fn deflate(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}
