//! Image encoding, comparison and thumbnail generation.

use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Output format for generated thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailFormat {
    Jpeg,
    Png,
}

impl ThumbnailFormat {
    /// File extension for the format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailOptions {
    /// Maximum output width in pixels.
    pub max_width: u32,
    /// Maximum output height in pixels.
    pub max_height: u32,
    /// Output image format.
    pub format: ThumbnailFormat,
    /// JPEG quality (only used when `format` is [`ThumbnailFormat::Jpeg`]).
    pub jpeg_quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            max_width: 300,
            max_height: 300,
            format: ThumbnailFormat::Jpeg,
            jpeg_quality: 80,
        }
    }
}

/// A board cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ThumbnailFormat,
}

/// Generate a thumbnail from encoded image bytes.
///
/// The image is resized to fit within `max_width` x `max_height` while preserving
/// aspect ratio. Images smaller than the target bounds are not upscaled.
pub fn generate_thumbnail(source_bytes: &[u8], options: ThumbnailOptions) -> Result<Thumbnail> {
    if options.max_width == 0 || options.max_height == 0 {
        return Err(Error::InvalidInput(
            "Thumbnail max dimensions must be greater than zero".to_string(),
        ));
    }

    let source = decode_image(source_bytes)?;
    let (source_width, source_height) = source.dimensions();
    let resized = if source_width <= options.max_width && source_height <= options.max_height {
        source
    } else {
        source.thumbnail(options.max_width, options.max_height)
    };
    let (width, height) = resized.dimensions();

    let bytes = match options.format {
        ThumbnailFormat::Jpeg => encode_jpeg(&resized, options.jpeg_quality)?,
        ThumbnailFormat::Png => encode_png(&resized)?,
    };

    Ok(Thumbnail {
        bytes,
        width,
        height,
        format: options.format,
    })
}

/// Decode image bytes in any supported format.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(Error::Image("image bytes are empty".to_string()));
    }
    image::load_from_memory(bytes)
        .map_err(|error| Error::Image(format!("Failed to decode image: {error}")))
}

/// Encode an image as JPEG at the given quality (1-100).
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality.clamp(1, 100));
    // JPEG carries no alpha channel.
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    encoder
        .encode_image(&rgb)
        .map_err(|error| Error::Image(format!("Failed to encode JPEG: {error}")))?;
    Ok(cursor.into_inner())
}

/// Encode an image as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|error| Error::Image(format!("Failed to encode PNG: {error}")))?;
    Ok(cursor.into_inner())
}

/// Whether two decoded images have the same dimensions and RGBA pixels.
pub fn pixels_match(left: &DynamicImage, right: &DynamicImage) -> bool {
    left.dimensions() == right.dimensions() && left.to_rgba8().as_raw() == right.to_rgba8().as_raw()
}
