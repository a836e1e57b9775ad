//! Image decoding and thumbnail generation
//!
//! Both operations take the data URL produced by the reader, so the pixels
//! reported here are always those of a full decode, never a header guess.

use std::io::Cursor;

use fast_image_resize as fr;
use fr::images::Image as FrImage;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data_url;
use crate::error::{DecodeError, ResizeError};

/// Thumbnails are always re-encoded as PNG.
pub const THUMBNAIL_MIME_TYPE: &str = "image/png";

/// Pixel dimensions of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Decode a data URL into a full raster.
pub fn decode_image(encoded: &str) -> Result<DynamicImage, DecodeError> {
    let url = data_url::parse(encoded)?;
    let img = image::load_from_memory(&url.bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::Empty { width: img.width(), height: img.height() });
    }
    Ok(img)
}

/// Decode a data URL and report its pixel dimensions.
pub fn decode_resolution(encoded: &str) -> Result<Resolution, DecodeError> {
    let img = decode_image(encoded)?;
    Ok(Resolution { width: img.width(), height: img.height() })
}

/// Target size for a thumbnail.
///
/// Height is pinned to `max_dimension` and width follows the aspect ratio,
/// whichever source axis is longer. Portrait sources therefore come out
/// narrower than `max_dimension`, landscape ones wider.
pub fn thumbnail_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let scaled = (width as f64 / height as f64) * max_dimension as f64;
    let new_width = (scaled.round() as u32).max(1);
    (new_width, max_dimension)
}

/// Produce a downscaled PNG data URL from a source data URL.
pub fn resize(encoded: &str, max_dimension: u32) -> Result<String, ResizeError> {
    if max_dimension == 0 {
        return Err(ResizeError::InvalidSize(max_dimension));
    }

    let img = decode_image(encoded)?;
    let (width, height) = (img.width(), img.height());
    let (new_width, new_height) = thumbnail_dimensions(width, height, max_dimension);

    // Full-resolution raster lives only for the duration of this call
    let raster = img.into_rgba8();
    let src_image = FrImage::from_vec_u8(width, height, raster.into_raw(), fr::PixelType::U8x4)
        .map_err(|e| ResizeError::Raster(format!("Failed to create source raster: {:?}", e)))?;

    let mut dst_image = FrImage::new(new_width, new_height, src_image.pixel_type());

    let mut resizer = fr::Resizer::new();
    resizer.resize(&src_image, &mut dst_image, None)
        .map_err(|e| ResizeError::Raster(format!("Resize failed: {:?}", e)))?;

    let thumbnail = RgbaImage::from_raw(new_width, new_height, dst_image.buffer().to_vec())
        .ok_or_else(|| ResizeError::Raster("Resized buffer does not match target size".to_string()))?;

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(thumbnail)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(ResizeError::Encode)?;

    debug!("Resized {}x{} -> {}x{} ({} bytes)", width, height, new_width, new_height, png.len());
    Ok(data_url::encode(THUMBNAIL_MIME_TYPE, &png))
}
