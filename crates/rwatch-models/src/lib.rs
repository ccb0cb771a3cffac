//! Shared data models for the RoadWatch backend.
//!
//! This crate provides Serde-serializable types for:
//! - Detections (bounding box + confidence) produced per frame
//! - Severity tiers and the severity classifier
//! - Reports queued for transmission to the collector
//! - Persisted pothole records served by the collector

pub mod detection;
pub mod record;
pub mod report;
pub mod severity;

// Re-export common types
pub use detection::{BoundingBox, Detection};
pub use record::PotholeRecord;
pub use report::Report;
pub use severity::{SeverityTier, MANUAL_SEVERITY_LABEL};
