//! Deterministic local try-on compositor.
//!
//! Used when no remote provider is configured: pastes the garment over
//! the person photo at a fixed anchor so the rest of the flow (and the
//! app against it) can be exercised without credentials or network.

use super::{decode_blob, encode_jpeg};
use crate::error::Result;
use crate::types::ImageBlob;
use image::imageops::FilterType;
use image::GenericImageView;

/// Garment width as a share of the person image's width.
const GARMENT_WIDTH_RATIO: f32 = 0.55;

/// Vertical anchor for the garment's top edge, as a share of the
/// person image's height (roughly chest level).
const GARMENT_ANCHOR_RATIO: f32 = 0.35;

/// JPEG quality of the composited output.
const OUTPUT_JPEG_QUALITY: u8 = 92;

pub struct MockCompositor;

impl MockCompositor {
    /// Overlay `garment` onto `person` and return the flattened JPEG.
    ///
    /// The garment is scaled so its width is 55 % of the person image's
    /// width (aspect preserved), then pasted horizontally centered with
    /// its top edge at 35 % of the person image's height.
    pub fn compose(person: &ImageBlob, garment: &ImageBlob) -> Result<ImageBlob> {
        let person = decode_blob(person)?;
        let garment = decode_blob(garment)?;

        let (pw, ph) = person.dimensions();
        let (gw, gh) = garment.dimensions();

        let target_w = ((pw as f32 * GARMENT_WIDTH_RATIO) as u32).max(1);
        let scale = target_w as f32 / gw.max(1) as f32;
        let target_h = ((gh as f32 * scale) as u32).max(1);
        let garment = garment.resize_exact(target_w, target_h, FilterType::Triangle);

        let x = i64::from((pw - target_w) / 2);
        let y = (ph as f32 * GARMENT_ANCHOR_RATIO) as i64;

        let mut canvas = person.to_rgba8();
        image::imageops::overlay(&mut canvas, &garment.to_rgba8(), x, y);

        let merged = image::DynamicImage::ImageRgba8(canvas);
        Ok(ImageBlob::jpeg(encode_jpeg(&merged, OUTPUT_JPEG_QUALITY)?))
    }
}
