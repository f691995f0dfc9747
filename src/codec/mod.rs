//! Encoded-image snapshots.
//!
//! Encoding and decoding delegate to the [`image`] crate; snapshots carry
//! the compressed bytes as base64 together with their MIME type.

use crate::foundation::error::{RasterError, RasterResult};
use crate::render::backend::Raster;
use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::ImageEncoder;

/// Supported encode formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EncodeFormat {
    /// Lossless PNG. The quality parameter is ignored.
    Png,
    /// Lossy JPEG at a 0-100 quality. Alpha is flattened away.
    Jpeg,
}

impl EncodeFormat {
    /// MIME type of the encoded bytes.
    pub fn mime(self) -> &'static str {
        match self {
            EncodeFormat::Png => "image/png",
            EncodeFormat::Jpeg => "image/jpeg",
        }
    }
}

/// A base64 snapshot of an encoded raster.
///
/// Independent of the image it was produced from; disposing the image does
/// not invalidate it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncodedImage {
    /// Base64 of the compressed bytes.
    pub base64: String,
    /// MIME type, `image/png` or `image/jpeg`.
    pub mime: String,
}

impl EncodedImage {
    /// Decode the base64 payload back into compressed bytes.
    pub fn bytes(&self) -> RasterResult<Vec<u8>> {
        BASE64
            .decode(&self.base64)
            .map_err(|e| RasterError::encoding_failed(format!("invalid base64 payload: {e}")))
    }
}

/// Encode a raster into compressed bytes and wrap them as base64.
///
/// `quality` applies to JPEG only and must be 0-100; PNG ignores it.
pub fn encode_raster(
    raster: &Raster,
    format: EncodeFormat,
    quality: u8,
) -> RasterResult<EncodedImage> {
    let bytes = match format {
        EncodeFormat::Png => encode_png(raster)?,
        EncodeFormat::Jpeg => encode_jpeg(raster, quality)?,
    };
    if bytes.is_empty() {
        return Err(RasterError::encoding_failed(format!(
            "{} codec produced no bytes",
            format.mime()
        )));
    }
    Ok(EncodedImage {
        base64: BASE64.encode(&bytes),
        mime: format.mime().to_string(),
    })
}

/// Decode PNG or JPEG bytes into a straight RGBA8 raster.
///
/// Bytes in any other recognized container are rejected with
/// [`RasterError::UnsupportedFormat`].
pub fn decode_raster(bytes: &[u8]) -> RasterResult<Raster> {
    let format = image::guess_format(bytes)
        .map_err(|e| RasterError::unsupported_format(format!("unrecognized image data: {e}")))?;
    match format {
        image::ImageFormat::Png | image::ImageFormat::Jpeg => {}
        other => {
            return Err(RasterError::unsupported_format(format!(
                "{other:?} images are not supported"
            )));
        }
    }
    let decoded =
        image::load_from_memory_with_format(bytes, format).context("decode image from memory")?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Raster::from_raw(width, height, rgba.into_raw())
}

fn encode_png(raster: &Raster) -> RasterResult<Vec<u8>> {
    let mut buffer: Vec<u8> = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(
            raster.data(),
            raster.width(),
            raster.height(),
            image::ExtendedColorType::Rgba8,
        )
        .context("encode png")?;
    Ok(buffer)
}

fn encode_jpeg(raster: &Raster, quality: u8) -> RasterResult<Vec<u8>> {
    if quality > 100 {
        return Err(RasterError::validation(format!(
            "jpeg quality must be 0-100, got {quality}"
        )));
    }

    // JPEG has no alpha channel; drop it.
    let mut rgb = Vec::with_capacity(raster.data().len() / 4 * 3);
    for px in raster.data().chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }

    let mut buffer: Vec<u8> = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.max(1))
        .write_image(
            &rgb,
            raster.width(),
            raster.height(),
            image::ExtendedColorType::Rgb8,
        )
        .context("encode jpeg")?;
    Ok(buffer)
}
