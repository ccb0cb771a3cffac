//! Capture configuration.

use std::path::PathBuf;
use std::time::Duration;

use rwatch_vision::{DetectorConfig, DetectorKind};

/// Capture loop configuration.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Collector base URL
    pub collector_url: String,
    /// Video input: file path, stream URL, or /dev/video* device
    pub video_input: String,
    /// Processing frame width
    pub frame_width: u32,
    /// Processing frame height
    pub frame_height: u32,
    /// Detector variant
    pub detector: DetectorKind,
    /// Detector tuning
    pub detector_config: DetectorConfig,
    /// Minimum time between successive transmissions
    pub cooldown: Duration,
    /// HTTP timeout for a single transmission attempt
    pub request_timeout: Duration,
    /// Simulated GPS base latitude
    pub base_latitude: f64,
    /// Simulated GPS base longitude
    pub base_longitude: f64,
    /// Simulated GPS jitter amplitude in degrees
    pub gps_jitter: f64,
    /// Directory for annotated overlay frames (disabled when unset)
    pub overlay_dir: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            collector_url: "http://localhost:8000".to_string(),
            video_input: "/dev/video0".to_string(),
            frame_width: 640,
            frame_height: 480,
            detector: DetectorKind::Model,
            detector_config: DetectorConfig::default(),
            cooldown: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
            base_latitude: 40.7128,
            base_longitude: -74.0060,
            gps_jitter: 0.01,
            overlay_dir: None,
        }
    }
}

impl CaptureConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let detector_defaults = DetectorConfig::default();

        Self {
            collector_url: std::env::var("RWATCH_COLLECTOR_URL")
                .unwrap_or(defaults.collector_url),
            video_input: std::env::var("RWATCH_VIDEO_INPUT").unwrap_or(defaults.video_input),
            frame_width: env_parse("RWATCH_FRAME_WIDTH", defaults.frame_width),
            frame_height: env_parse("RWATCH_FRAME_HEIGHT", defaults.frame_height),
            detector: std::env::var("RWATCH_DETECTOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.detector),
            detector_config: DetectorConfig {
                model_path: std::env::var("RWATCH_MODEL_PATH")
                    .unwrap_or(detector_defaults.model_path),
                confidence_threshold: env_parse(
                    "RWATCH_CONFIDENCE_THRESHOLD",
                    detector_defaults.confidence_threshold,
                ),
                min_motion_area: env_parse(
                    "RWATCH_MIN_MOTION_AREA",
                    detector_defaults.min_motion_area,
                ),
                ..detector_defaults
            },
            cooldown: Duration::from_secs(env_parse("RWATCH_COOLDOWN_SECONDS", 5)),
            request_timeout: Duration::from_secs(env_parse("RWATCH_REQUEST_TIMEOUT", 5)),
            base_latitude: env_parse("RWATCH_BASE_LATITUDE", defaults.base_latitude),
            base_longitude: env_parse("RWATCH_BASE_LONGITUDE", defaults.base_longitude),
            gps_jitter: env_parse("RWATCH_GPS_JITTER", defaults.gps_jitter),
            overlay_dir: std::env::var("RWATCH_OVERLAY_DIR").ok().map(PathBuf::from),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.cooldown, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.base_latitude, 40.7128);
        assert_eq!(config.base_longitude, -74.0060);
        assert_eq!(config.detector, DetectorKind::Model);
        assert!(config.overlay_dir.is_none());
    }
}
