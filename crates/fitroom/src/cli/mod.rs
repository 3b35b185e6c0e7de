//! Command implementations.

pub mod recommend;
pub mod tag;
pub mod tryon;

use anyhow::Context;
use fitroom_core::ImageBlob;
use std::path::Path;

/// Read an image file into a blob, deriving the content type from the
/// file extension (the decoder sniffs real bytes anyway).
pub fn read_image(path: &Path) -> anyhow::Result<ImageBlob> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image file {}", path.display()))?;
    let content_type = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    Ok(ImageBlob::new(bytes, content_type))
}
