//! Simulated GPS fixes.
//!
//! Real GPS hardware integration is out of scope; fixes are a configured
//! base coordinate plus uniform jitter, matching the field-test rig.

use rand::Rng;

/// Simulated GPS source.
#[derive(Debug, Clone)]
pub struct GpsSimulator {
    base_latitude: f64,
    base_longitude: f64,
    jitter: f64,
}

impl GpsSimulator {
    /// Create a simulator around a base coordinate with the given jitter
    /// amplitude in degrees.
    pub fn new(base_latitude: f64, base_longitude: f64, jitter: f64) -> Self {
        Self {
            base_latitude,
            base_longitude,
            jitter,
        }
    }

    /// Produce a `(latitude, longitude)` fix.
    pub fn fix(&self) -> (f64, f64) {
        if self.jitter == 0.0 {
            return (self.base_latitude, self.base_longitude);
        }
        let mut rng = rand::rng();
        (
            self.base_latitude + rng.random_range(-self.jitter..=self.jitter),
            self.base_longitude + rng.random_range(-self.jitter..=self.jitter),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_stays_within_jitter() {
        let gps = GpsSimulator::new(40.7128, -74.0060, 0.01);
        for _ in 0..100 {
            let (lat, lon) = gps.fix();
            assert!((lat - 40.7128).abs() <= 0.01);
            assert!((lon + 74.0060).abs() <= 0.01);
        }
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let gps = GpsSimulator::new(51.5074, -0.1278, 0.0);
        assert_eq!(gps.fix(), (51.5074, -0.1278));
    }
}
