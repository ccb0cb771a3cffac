//! Error types for frame acquisition and detection.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for frame source operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Result type for detection operations.
pub type DetectionResult<T> = Result<T, DetectionError>;

/// Errors that make the video source unusable.
///
/// Fatal to the capture loop; end-of-stream is signalled by an `Ok(None)`
/// frame, not an error.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("Video source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Failed to open video source: {message}")]
    SourceOpenFailed { message: String },

    #[error("Video source read failed: {0}")]
    SourceReadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    pub fn source_open_failed(message: impl Into<String>) -> Self {
        Self::SourceOpenFailed {
            message: message.into(),
        }
    }
}

/// Per-frame detection/processing failures.
///
/// Callers log these, skip the frame, and continue.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Frame processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Image encoding failed: {0}")]
    EncodingFailed(String),
}

impl DetectionError {
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    pub fn inference_failed(message: impl Into<String>) -> Self {
        Self::InferenceFailed(message.into())
    }

    pub fn processing_failed(message: impl Into<String>) -> Self {
        Self::ProcessingFailed(message.into())
    }
}
