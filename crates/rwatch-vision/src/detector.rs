//! Detector strategy contract.
//!
//! Both detector variants satisfy the same trait so the capture loop stays
//! detector-agnostic; which one runs is a static configuration choice
//! resolved once at startup.

use std::str::FromStr;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use rwatch_models::Detection;

use crate::error::DetectionResult;
use crate::model::ModelDetector;
use crate::motion::MotionDetector;

/// Core trait for pothole detectors.
///
/// Implementations may keep internal state between calls (the motion
/// variant keeps the previous processed frame).
pub trait Detector: Send {
    /// Run detection on one frame, returning candidate regions with
    /// confidence scores. An empty vector means no candidates.
    fn detect(&mut self, frame: &RgbImage) -> DetectionResult<Vec<Detection>>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Static configuration choice between detector variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// ONNX model inference
    Model,
    /// Frame differencing
    Motion,
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "model" => Ok(DetectorKind::Model),
            "motion" => Ok(DetectorKind::Motion),
            other => Err(format!("unknown detector kind: {other}")),
        }
    }
}

/// Detector tuning configuration.
///
/// The thresholds are tuning constants carried over from the original
/// deployment, not invariants.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Path to the ONNX model file (model variant)
    pub model_path: String,
    /// Confidence threshold for model detections
    pub confidence_threshold: f32,
    /// IoU threshold for NMS (model variant)
    pub nms_threshold: f32,
    /// Model input size (square)
    pub input_size: u32,
    /// Minimum changed-region area in px^2 (motion variant)
    pub min_motion_area: u32,
    /// Minimum per-pixel intensity change, 0-255 (motion variant)
    pub motion_delta_threshold: u8,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: "models/pothole/yolov8n.onnx".to_string(),
            confidence_threshold: 0.5,
            nms_threshold: 0.45,
            input_size: 640,
            min_motion_area: 1000,
            motion_delta_threshold: 25,
        }
    }
}

/// Build the configured detector variant.
pub fn create_detector(kind: DetectorKind, config: &DetectorConfig) -> DetectionResult<Box<dyn Detector>> {
    match kind {
        DetectorKind::Model => Ok(Box::new(ModelDetector::new(config.clone())?)),
        DetectorKind::Motion => Ok(Box::new(MotionDetector::new(config))),
    }
}
