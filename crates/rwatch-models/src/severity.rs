//! Severity tiers and the severity classifier.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity label used by operator-triggered manual captures.
///
/// Manual reports bypass detection entirely, so they carry this distinct
/// label instead of a classified tier.
pub const MANUAL_SEVERITY_LABEL: &str = "Manual";

/// Area above which a detection is classified High (px^2).
const HIGH_AREA: f64 = 15_000.0;
/// Confidence above which a detection is classified High.
const HIGH_CONFIDENCE: f64 = 0.8;
/// Area above which a detection is classified Medium (px^2).
const MEDIUM_AREA: f64 = 8_000.0;
/// Confidence above which a detection is classified Medium.
const MEDIUM_CONFIDENCE: f64 = 0.6;

/// Pothole severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

impl SeverityTier {
    /// Classify a detection's geometry and confidence into a tier.
    ///
    /// A simple threshold ladder evaluated top to bottom, first match wins:
    /// High when `width * height > 15000` or `confidence > 0.8`, else Medium
    /// when `width * height > 8000` or `confidence > 0.6`, else Low. The
    /// thresholds are tuning constants, not invariants.
    pub fn classify(width: f64, height: f64, confidence: f64) -> Self {
        let area = width * height;
        if area > HIGH_AREA || confidence > HIGH_CONFIDENCE {
            SeverityTier::High
        } else if area > MEDIUM_AREA || confidence > MEDIUM_CONFIDENCE {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }

    /// Tier name as used on the wire and in stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Low => "Low",
            SeverityTier::Medium => "Medium",
            SeverityTier::High => "High",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown severity tier name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown severity tier: {0}")]
pub struct ParseSeverityError(pub String);

impl FromStr for SeverityTier {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(SeverityTier::Low),
            "Medium" => Ok(SeverityTier::Medium),
            "High" => Ok(SeverityTier::High),
            other => Err(ParseSeverityError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_by_area() {
        assert_eq!(SeverityTier::classify(150.0, 101.0, 0.1), SeverityTier::High);
    }

    #[test]
    fn test_high_by_confidence() {
        assert_eq!(SeverityTier::classify(10.0, 10.0, 0.81), SeverityTier::High);
    }

    #[test]
    fn test_area_boundary_15000_is_not_high() {
        // area == 15000 exactly: not strictly greater, falls through to Medium
        assert_eq!(SeverityTier::classify(150.0, 100.0, 0.1), SeverityTier::Medium);
        assert_eq!(SeverityTier::classify(150.0, 100.01, 0.1), SeverityTier::High);
    }

    #[test]
    fn test_confidence_boundary_08_is_not_high() {
        // area below the medium threshold so only confidence decides
        assert_eq!(SeverityTier::classify(10.0, 10.0, 0.8), SeverityTier::Medium);
        assert_eq!(SeverityTier::classify(10.0, 10.0, 0.800001), SeverityTier::High);
    }

    #[test]
    fn test_medium_by_area() {
        assert_eq!(SeverityTier::classify(100.0, 81.0, 0.1), SeverityTier::Medium);
    }

    #[test]
    fn test_area_boundary_8000_is_not_medium() {
        assert_eq!(SeverityTier::classify(100.0, 80.0, 0.1), SeverityTier::Low);
        assert_eq!(SeverityTier::classify(100.0, 80.01, 0.1), SeverityTier::Medium);
    }

    #[test]
    fn test_confidence_boundary_06_is_not_medium() {
        assert_eq!(SeverityTier::classify(10.0, 10.0, 0.6), SeverityTier::Low);
        assert_eq!(SeverityTier::classify(10.0, 10.0, 0.600001), SeverityTier::Medium);
    }

    #[test]
    fn test_low_otherwise() {
        assert_eq!(SeverityTier::classify(10.0, 10.0, 0.5), SeverityTier::Low);
    }

    #[test]
    fn test_total_over_sample_grid() {
        // Pure and total: every input yields exactly one tier.
        for w in [0.0, 50.0, 90.0, 123.0, 200.0] {
            for h in [0.0, 50.0, 90.0, 123.0, 200.0] {
                for c in [0.0, 0.3, 0.6, 0.61, 0.8, 0.81, 1.0] {
                    let _ = SeverityTier::classify(w, h, c);
                }
            }
        }
    }

    #[test]
    fn test_display_round_trip() {
        for tier in [SeverityTier::Low, SeverityTier::Medium, SeverityTier::High] {
            assert_eq!(tier.to_string().parse::<SeverityTier>().unwrap(), tier);
        }
        assert!("Manual".parse::<SeverityTier>().is_err());
    }
}
