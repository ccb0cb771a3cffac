//! Frame-differencing pothole detection.
//!
//! Fallback for deployments without a model: blur the current frame,
//! difference it against the previous one, threshold and dilate to a binary
//! mask, and emit a detection for every changed region above a minimum
//! area. No learned confidence exists, so detections carry a fixed nominal
//! score.

use std::collections::HashMap;

use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::debug;

use rwatch_models::{BoundingBox, Detection};

use crate::detector::{Detector, DetectorConfig};
use crate::error::DetectionResult;

/// Nominal confidence assigned to frame-difference detections.
const MOTION_CONFIDENCE: f64 = 0.7;

/// Gaussian blur sigma applied before differencing.
const BLUR_SIGMA: f32 = 3.5;

/// Simple frame-diff detector.
pub struct MotionDetector {
    /// Previous processed (blurred grayscale) frame.
    prev_frame: Option<GrayImage>,
    /// Minimum per-pixel intensity change to count as motion (0-255).
    delta_threshold: u8,
    /// Minimum changed-region area in px^2.
    min_area: u32,
}

impl MotionDetector {
    /// Create a new detector from config.
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            prev_frame: None,
            delta_threshold: config.motion_delta_threshold,
            min_area: config.min_motion_area,
        }
    }

    /// Blurred grayscale version of a frame, as stored between calls.
    fn process(frame: &RgbImage) -> GrayImage {
        let gray = image::imageops::grayscale(frame);
        image::imageops::blur(&gray, BLUR_SIGMA)
    }

    /// Binary mask of pixels that changed more than the threshold.
    fn diff_mask(&self, prev: &GrayImage, current: &GrayImage) -> GrayImage {
        let (w, h) = current.dimensions();
        let mut mask = GrayImage::new(w, h);
        for (x, y, pixel) in mask.enumerate_pixels_mut() {
            let a = prev.get_pixel(x, y).0[0];
            let b = current.get_pixel(x, y).0[0];
            if a.abs_diff(b) > self.delta_threshold {
                *pixel = Luma([255u8]);
            }
        }
        mask
    }
}

impl Detector for MotionDetector {
    fn detect(&mut self, frame: &RgbImage) -> DetectionResult<Vec<Detection>> {
        let current = Self::process(frame);

        // First frame: nothing to difference against yet.
        let Some(prev) = self.prev_frame.replace(current.clone()) else {
            return Ok(Vec::new());
        };

        let mask = self.diff_mask(&prev, &current);
        let mask = dilate(&mask, Norm::LInf, 2);

        let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

        // Bounding box and pixel count per changed region.
        let mut regions: HashMap<u32, (u32, u32, u32, u32, u32)> = HashMap::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let id = label.0[0];
            if id == 0 {
                continue;
            }
            let entry = regions.entry(id).or_insert((x, y, x, y, 0));
            entry.0 = entry.0.min(x);
            entry.1 = entry.1.min(y);
            entry.2 = entry.2.max(x);
            entry.3 = entry.3.max(y);
            entry.4 += 1;
        }

        let mut detections: Vec<Detection> = regions
            .into_values()
            .filter(|&(_, _, _, _, count)| count > self.min_area)
            .map(|(min_x, min_y, max_x, max_y, _)| {
                let bbox = BoundingBox::new(
                    min_x as f64,
                    min_y as f64,
                    (max_x - min_x + 1) as f64,
                    (max_y - min_y + 1) as f64,
                );
                Detection::new(bbox, MOTION_CONFIDENCE)
            })
            .collect();

        // Deterministic ordering for downstream consumers
        detections.sort_by(|a, b| {
            (a.bbox.x, a.bbox.y)
                .partial_cmp(&(b.bbox.x, b.bbox.y))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(count = detections.len(), "Motion detection completed");
        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "motion"
    }
}
