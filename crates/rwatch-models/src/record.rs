//! Persisted pothole records.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted, immutable entry representing one accepted report.
///
/// Created on successful ingestion, never updated individually, destroyed
/// only by the clear-all operation. Identifiers are unique across the
/// store's lifetime. The severity is kept as the opaque label the reporter
/// sent (a tier name, or `"Manual"` for operator captures); the collector
/// does not re-derive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PotholeRecord {
    /// Globally unique record identifier (UUID v4)
    pub id: String,
    /// ISO-8601 creation timestamp
    pub timestamp: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Severity label as received
    pub severity: String,
    /// URL path of the stored image resource
    pub image_url: String,
}

impl PotholeRecord {
    /// Build a fresh record with a new identifier and the current UTC time.
    ///
    /// `image_url_prefix` is the public path under which images are served
    /// (e.g. `/images`); the filename is derived from the identifier.
    pub fn create(
        latitude: f64,
        longitude: f64,
        severity: impl Into<String>,
        image_url_prefix: &str,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        let image_url = format!("{}/{}.jpg", image_url_prefix.trim_end_matches('/'), id);
        Self {
            id,
            timestamp: Utc::now().to_rfc3339(),
            latitude,
            longitude,
            severity: severity.into(),
            image_url,
        }
    }

    /// Image filename derived from the record identifier.
    pub fn image_filename(&self) -> String {
        format!("{}.jpg", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_derives_image_url_from_id() {
        let record = PotholeRecord::create(40.7128, -74.0060, "High", "/images");
        assert_eq!(record.image_url, format!("/images/{}.jpg", record.id));
        assert_eq!(record.image_filename(), format!("{}.jpg", record.id));
        assert_eq!(record.severity, "High");
    }

    #[test]
    fn test_create_ids_are_distinct() {
        let a = PotholeRecord::create(0.0, 0.0, "Low", "/images");
        let b = PotholeRecord::create(0.0, 0.0, "Low", "/images");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_json_shape() {
        let record = PotholeRecord::create(40.7128, -74.0060, "High", "/images");
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["id", "timestamp", "latitude", "longitude", "severity", "image_url"] {
            assert!(obj.contains_key(key), "missing field {key}");
        }
        assert_eq!(obj.len(), 6);
        assert_eq!(obj["latitude"].as_f64().unwrap(), 40.7128);
    }

    #[test]
    fn test_serde_round_trip() {
        let record = PotholeRecord::create(51.5, -0.12, "Medium", "/images");
        let json = serde_json::to_string(&record).unwrap();
        let back: PotholeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
