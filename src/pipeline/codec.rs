//! Image container codec: the seam between pixels and bytes.
//!
//! Every decode and encode in the crate goes through these three functions,
//! so the raster and recolor stages operate on pixels alone and the choice of
//! container stays in one place.
//!
//! ## Why JPEG for pages but PNG for recolored output?
//! Rasterised pages can carry photographic content, where JPEG at quality 0.8
//! is a fraction of the PNG size with no visible loss. Recolored output is
//! the end of the line: encoding it lossily would stack a second generation
//! of artefacts on top of the page JPEG, so it is always PNG.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Decode an encoded image (JPEG, PNG, ...) into pixels.
///
/// Format is sniffed from the bytes; the caller's claimed format is not
/// trusted.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
    image::load_from_memory(bytes)
}

/// Encode pixels losslessly as PNG.
pub fn encode_png(pixels: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    pixels.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} px → {} bytes PNG",
        pixels.width(),
        pixels.height(),
        buf.len()
    );
    Ok(buf)
}

/// Encode pixels as JPEG at the given quality in (0, 1].
///
/// JPEG has no alpha channel, so the image is flattened to RGB first;
/// pdfium renders pages fully opaque, making the drop lossless in practice.
pub fn encode_jpeg(image: &DynamicImage, quality: f64) -> Result<Vec<u8>, image::ImageError> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
    rgb.write_with_encoder(encoder)?;
    debug!(
        "Encoded {}x{} px → {} bytes JPEG (q={})",
        rgb.width(),
        rgb.height(),
        buf.len(),
        jpeg_quality(quality)
    );
    Ok(buf)
}

/// Maps the unit-interval quality knob onto JPEG's 1-100 scale.
fn jpeg_quality(quality: f64) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}
