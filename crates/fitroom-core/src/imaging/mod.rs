//! Local image work: transport preprocessing and the mock compositor.

pub mod compositor;
pub mod preprocess;

pub use compositor::MockCompositor;
pub use preprocess::{shrink, TAGGING_JPEG_QUALITY, TRYON_JPEG_QUALITY, TRANSPORT_MAX_SIDE};

use crate::error::{FitroomError, Result};
use image::DynamicImage;

/// Decode a blob, sniffing the format from the bytes rather than
/// trusting the declared content type.
pub(crate) fn decode_blob(blob: &crate::types::ImageBlob) -> Result<DynamicImage> {
    let reader = image::ImageReader::new(std::io::Cursor::new(&blob.bytes))
        .with_guessed_format()
        .map_err(|e| FitroomError::decode(format!("cannot sniff image format: {e}")))?;
    reader
        .decode()
        .map_err(|e| FitroomError::decode(e.to_string()))
}

/// Flatten to 8-bit RGB (dropping any alpha) and encode as JPEG.
pub(crate) fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| FitroomError::decode(format!("jpeg encode failed: {e}")))?;
    Ok(buffer)
}
