//! Downscaling and re-encoding for network transport.
//!
//! The remote provider downloads referenced images (and inspects them)
//! before running a job, and inline data URLs ride inside the request
//! body; both get cheaper and far less timeout-prone when the image is
//! shrunk and recompressed first.

use super::{decode_blob, encode_jpeg};
use crate::error::Result;
use crate::types::ImageBlob;
use image::imageops::FilterType;
use image::GenericImageView;

/// Longer-side cap used by both call sites.
pub const TRANSPORT_MAX_SIDE: u32 = 1024;

/// JPEG quality for try-on inputs (provider fetches these by URL).
pub const TRYON_JPEG_QUALITY: u8 = 90;

/// JPEG quality for the tagging inline-data fallback.
pub const TAGGING_JPEG_QUALITY: u8 = 85;

/// Decode `blob`, scale it down so the longer side is at most
/// `max_side` (never upscaling), and re-encode as JPEG at `quality`.
///
/// Aspect ratio is preserved; when scaling happens the longer side
/// lands on `max_side` exactly. Alpha is flattened away by the JPEG
/// encode.
pub fn shrink(blob: &ImageBlob, max_side: u32, quality: u8) -> Result<ImageBlob> {
    let image = decode_blob(blob)?;
    let (width, height) = image.dimensions();

    let resized = if width.max(height) > max_side {
        image.resize(max_side, max_side, FilterType::Triangle)
    } else {
        image
    };

    Ok(ImageBlob::jpeg(encode_jpeg(&resized, quality)?))
}
