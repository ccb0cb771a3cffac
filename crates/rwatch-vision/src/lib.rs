//! Video frames, frame sources, and pothole detectors.
//!
//! This crate provides:
//! - RGB frame helpers (JPEG encoding, detection crops)
//! - FFmpeg-backed frame acquisition from files, streams, and V4L2 devices
//! - The `Detector` strategy trait with model-inference and
//!   frame-differencing implementations
//! - Overlay rendering for observability

pub mod detector;
pub mod error;
pub mod frame;
pub mod model;
pub mod motion;
pub mod overlay;
pub mod source;

pub use detector::{create_detector, Detector, DetectorConfig, DetectorKind};
pub use error::{CaptureError, CaptureResult, DetectionError, DetectionResult};
pub use frame::{crop_to_box, encode_jpeg};
pub use model::ModelDetector;
pub use motion::MotionDetector;
pub use overlay::annotate_frame;
pub use source::{FfmpegSource, FrameSource};
