//! Global transmission cooldown.

use std::time::{Duration, Instant};

/// Single global gate limiting how often reports leave the capture loop.
///
/// One timestamp shared across all detections and the whole stream: at most
/// one report per window, regardless of how many detections occur. The
/// timestamp advances only on confirmed successful transmission, so a
/// failed send permits an immediate retry on the next eligible cycle.
#[derive(Debug)]
pub struct CooldownGate {
    window: Duration,
    last_sent: Option<Instant>,
}

impl CooldownGate {
    /// Create a gate with the given cooldown window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_sent: None,
        }
    }

    /// Whether a transmission is currently allowed.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_sent {
            None => true,
            Some(sent) => now.duration_since(sent) > self.window,
        }
    }

    /// Record a confirmed successful transmission.
    pub fn mark_sent(&mut self, now: Instant) {
        self.last_sent = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_starts_ready() {
        let gate = CooldownGate::new(Duration::from_secs(5));
        assert!(gate.is_ready(Instant::now()));
    }

    #[test]
    fn test_gate_closes_after_send() {
        let mut gate = CooldownGate::new(Duration::from_secs(5));
        let t0 = Instant::now();
        gate.mark_sent(t0);

        assert!(!gate.is_ready(t0));
        assert!(!gate.is_ready(t0 + Duration::from_secs(4)));
        // Boundary: exactly the window is still closed (strictly greater)
        assert!(!gate.is_ready(t0 + Duration::from_secs(5)));
        assert!(gate.is_ready(t0 + Duration::from_millis(5001)));
    }

    #[test]
    fn test_many_detections_one_window_one_send() {
        let mut gate = CooldownGate::new(Duration::from_secs(5));
        let t0 = Instant::now();

        let mut sent = 0;
        for i in 0..100u64 {
            let now = t0 + Duration::from_millis(i * 10);
            if gate.is_ready(now) {
                gate.mark_sent(now);
                sent += 1;
            }
        }
        assert_eq!(sent, 1);
    }

    #[test]
    fn test_failed_send_does_not_advance() {
        let mut gate = CooldownGate::new(Duration::from_secs(5));
        let t0 = Instant::now();

        // A failed attempt never calls mark_sent, so the gate stays open
        assert!(gate.is_ready(t0));
        assert!(gate.is_ready(t0 + Duration::from_millis(1)));

        gate.mark_sent(t0 + Duration::from_millis(2));
        assert!(!gate.is_ready(t0 + Duration::from_millis(3)));
    }
}
