//! RGB frame helpers.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use rwatch_models::BoundingBox;

use crate::error::{DetectionError, DetectionResult};

/// JPEG quality for encoded report images.
const JPEG_QUALITY: u8 = 90;

/// Encode a frame as JPEG bytes.
pub fn encode_jpeg(frame: &RgbImage) -> DetectionResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    encoder
        .encode(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            image::ColorType::Rgb8,
        )
        .map_err(|e| DetectionError::EncodingFailed(e.to_string()))?;
    Ok(buf)
}

/// Crop a frame to a detection's bounding box, clamped to frame bounds.
///
/// Returns `None` when the clamped region is empty (a box entirely outside
/// the frame, or degenerate); callers treat that as a skipped crop.
pub fn crop_to_box(frame: &RgbImage, bbox: &BoundingBox) -> Option<RgbImage> {
    let (x, y, w, h) = bbox.to_pixel_rect(frame.width(), frame.height())?;
    Some(image::imageops::crop_imm(frame, x, y, w, h).to_image())
}
