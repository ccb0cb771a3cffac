//! Outbound report payload.

use crate::severity::SeverityTier;

/// The payload queued for transmission to the collector: one JPEG crop plus
/// geotag and severity label.
///
/// Constructed by the capture loop, consumed once by the transmission
/// client, then discarded. The severity is a label rather than a tier so
/// manual captures can carry their distinct `"Manual"` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Severity label (tier name or `"Manual"`)
    pub severity: String,
    /// JPEG-encoded image bytes
    pub image: Vec<u8>,
}

impl Report {
    /// Build a report for a classified detection.
    pub fn classified(latitude: f64, longitude: f64, tier: SeverityTier, image: Vec<u8>) -> Self {
        Self {
            latitude,
            longitude,
            severity: tier.to_string(),
            image,
        }
    }

    /// Build a report for an operator-triggered manual capture.
    pub fn manual(latitude: f64, longitude: f64, image: Vec<u8>) -> Self {
        Self {
            latitude,
            longitude,
            severity: crate::severity::MANUAL_SEVERITY_LABEL.to_string(),
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classified_report_carries_tier_label() {
        let report = Report::classified(1.0, 2.0, SeverityTier::High, vec![0xff, 0xd8]);
        assert_eq!(report.severity, "High");
        assert_eq!(report.image, vec![0xff, 0xd8]);
    }

    #[test]
    fn test_manual_report_label() {
        let report = Report::manual(1.0, 2.0, vec![]);
        assert_eq!(report.severity, "Manual");
    }
}
