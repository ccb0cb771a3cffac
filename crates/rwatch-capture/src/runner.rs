//! The capture loop state machine.
//!
//! One logical task: acquire a frame, detect, classify, and conditionally
//! transmit, in order, every cycle. The loop does not pipeline; when the
//! cooldown has expired, throughput is bounded by the network round trip.
//! That tradeoff is intentional.

use std::path::PathBuf;
use std::time::Instant;

use image::RgbImage;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use rwatch_models::{Report, SeverityTier};
use rwatch_vision::{annotate_frame, crop_to_box, encode_jpeg, CaptureResult, Detector, FrameSource};

use crate::client::ReportClient;
use crate::cooldown::CooldownGate;
use crate::gps::GpsSimulator;

/// Operator commands fed to the running loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Send the current frame as a report, bypassing detection and cooldown
    ManualCapture,
    /// Stop the loop cleanly
    Shutdown,
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopStats {
    /// Frames processed
    pub frames: u64,
    /// Detections across all frames
    pub detections: u64,
    /// Classified reports accepted by the collector
    pub reports_sent: u64,
    /// Manual reports accepted by the collector
    pub manual_reports: u64,
}

/// The capture/detect/report loop.
///
/// Owns the frame source and detector for its lifetime; both are released
/// when the loop returns, on success and on error alike.
pub struct CaptureLoop {
    source: Box<dyn FrameSource>,
    detector: Box<dyn Detector>,
    client: ReportClient,
    gps: GpsSimulator,
    gate: CooldownGate,
    commands: mpsc::Receiver<Command>,
    overlay_dir: Option<PathBuf>,
    stats: LoopStats,
}

impl CaptureLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn Detector>,
        client: ReportClient,
        gps: GpsSimulator,
        gate: CooldownGate,
        commands: mpsc::Receiver<Command>,
        overlay_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            source,
            detector,
            client,
            gps,
            gate,
            commands,
            overlay_dir,
            stats: LoopStats::default(),
        }
    }

    /// Run until shutdown or end of stream.
    ///
    /// Source errors are fatal and propagate; per-frame detection errors
    /// skip the frame and continue.
    pub async fn run(mut self) -> CaptureResult<LoopStats> {
        info!(detector = self.detector.name(), "Capture loop started");

        loop {
            let mut manual_requested = false;
            let mut shutdown = false;
            while let Ok(command) = self.commands.try_recv() {
                match command {
                    Command::ManualCapture => manual_requested = true,
                    Command::Shutdown => shutdown = true,
                }
            }
            if shutdown {
                info!("Shutdown requested by operator");
                break;
            }

            let Some(frame) = self.source.next_frame().await? else {
                info!(frames = self.stats.frames, "Video source exhausted");
                break;
            };
            self.stats.frames += 1;

            if manual_requested {
                self.send_manual(&frame).await;
            }

            let detections = match self.detector.detect(&frame) {
                Ok(detections) => detections,
                Err(e) => {
                    warn!(error = %e, "Detection failed, skipping frame");
                    continue;
                }
            };
            self.stats.detections += detections.len() as u64;
            if detections.is_empty() {
                continue;
            }

            let tiers: Vec<SeverityTier> = detections
                .iter()
                .map(|d| SeverityTier::classify(d.bbox.width, d.bbox.height, d.confidence))
                .collect();

            for (det, tier) in detections.iter().zip(&tiers) {
                debug!(
                    severity = %tier,
                    confidence = det.confidence,
                    area = det.bbox.area(),
                    "Pothole candidate"
                );
            }
            self.write_overlay(&frame, &detections);

            for (det, tier) in detections.iter().zip(&tiers) {
                if !self.gate.is_ready(Instant::now()) {
                    break;
                }

                let Some(crop) = crop_to_box(&frame, &det.bbox) else {
                    warn!("Empty crop at frame edge, skipping report");
                    continue;
                };
                let jpeg = match encode_jpeg(&crop) {
                    Ok(jpeg) => jpeg,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode crop, skipping report");
                        continue;
                    }
                };

                let (latitude, longitude) = self.gps.fix();
                let report = Report::classified(latitude, longitude, *tier, jpeg);
                if self.client.send(&report).await {
                    self.gate.mark_sent(Instant::now());
                    self.stats.reports_sent += 1;
                }
            }
        }

        Ok(self.stats)
    }

    /// Operator-triggered capture: full frame, `"Manual"` severity, no
    /// detection, no cooldown.
    async fn send_manual(&mut self, frame: &RgbImage) {
        let jpeg = match encode_jpeg(frame) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!(error = %e, "Failed to encode manual capture");
                return;
            }
        };

        let (latitude, longitude) = self.gps.fix();
        let report = Report::manual(latitude, longitude, jpeg);
        if self.client.send(&report).await {
            self.stats.manual_reports += 1;
            info!("Manual capture sent");
        }
    }

    /// Write an annotated copy of the frame when overlay output is enabled.
    fn write_overlay(&self, frame: &RgbImage, detections: &[rwatch_models::Detection]) {
        let Some(dir) = &self.overlay_dir else {
            return;
        };

        let mut annotated = frame.clone();
        annotate_frame(&mut annotated, detections);

        let path = dir.join(format!("frame_{:06}.jpg", self.stats.frames));
        match encode_jpeg(&annotated) {
            Ok(jpeg) => {
                if let Err(e) = std::fs::write(&path, jpeg) {
                    warn!(path = %path.display(), error = %e, "Failed to write overlay frame");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode overlay frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;
    use image::Rgb;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use rwatch_models::{BoundingBox, Detection};
    use rwatch_vision::{DetectionResult, DetectorConfig, MotionDetector};

    /// In-memory frame source for loop tests.
    struct VecSource {
        frames: VecDeque<RgbImage>,
    }

    #[async_trait]
    impl FrameSource for VecSource {
        async fn next_frame(&mut self) -> CaptureResult<Option<RgbImage>> {
            Ok(self.frames.pop_front())
        }

        fn dimensions(&self) -> (u32, u32) {
            (200, 200)
        }
    }

    /// Detector emitting a fixed detection list every call.
    struct FixedDetector {
        detections: Vec<Detection>,
    }

    impl Detector for FixedDetector {
        fn detect(&mut self, _frame: &RgbImage) -> DetectionResult<Vec<Detection>> {
            Ok(self.detections.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn frames(count: usize) -> Box<VecSource> {
        let frame = RgbImage::from_pixel(200, 200, Rgb([40, 40, 40]));
        Box::new(VecSource {
            frames: (0..count).map(|_| frame.clone()).collect(),
        })
    }

    fn in_frame_detection() -> Detection {
        Detection::new(BoundingBox::new(20.0, 20.0, 120.0, 100.0), 0.9)
    }

    async fn mock_collector(status: u16, expected_requests: Option<u64>) -> MockServer {
        let server = MockServer::start().await;
        let mut mock = Mock::given(method("POST"))
            .and(path("/pothole"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "status": if status == 200 { "success" } else { "error" },
                "message": "test"
            })));
        if let Some(n) = expected_requests {
            mock = mock.expect(n);
        }
        mock.mount(&server).await;
        server
    }

    fn build_loop(
        source: Box<VecSource>,
        detector: Box<dyn Detector>,
        server_uri: &str,
        commands: mpsc::Receiver<Command>,
    ) -> CaptureLoop {
        CaptureLoop::new(
            source,
            detector,
            ReportClient::new(server_uri, Duration::from_secs(5)).unwrap(),
            GpsSimulator::new(40.7128, -74.0060, 0.0),
            CooldownGate::new(Duration::from_secs(5)),
            commands,
            None,
        )
    }

    #[tokio::test]
    async fn test_cooldown_allows_one_report_per_window() {
        // Five frames with detections, all inside one 5s window: one POST.
        let server = mock_collector(200, Some(1)).await;
        let (_tx, rx) = mpsc::channel(4);

        let detector = Box::new(FixedDetector {
            detections: vec![in_frame_detection()],
        });
        let stats = build_loop(frames(5), detector, &server.uri(), rx)
            .run()
            .await
            .unwrap();

        assert_eq!(stats.frames, 5);
        assert_eq!(stats.detections, 5);
        assert_eq!(stats.reports_sent, 1);
    }

    #[tokio::test]
    async fn test_failed_sends_retry_every_eligible_cycle() {
        // Collector down: the gate never advances, so every frame retries.
        let server = mock_collector(500, Some(3)).await;
        let (_tx, rx) = mpsc::channel(4);

        let detector = Box::new(FixedDetector {
            detections: vec![in_frame_detection()],
        });
        let stats = build_loop(frames(3), detector, &server.uri(), rx)
            .run()
            .await
            .unwrap();

        assert_eq!(stats.reports_sent, 0);
    }

    #[tokio::test]
    async fn test_offscreen_detection_is_skipped_without_send() {
        let server = mock_collector(200, Some(0)).await;
        let (_tx, rx) = mpsc::channel(4);

        let detector = Box::new(FixedDetector {
            detections: vec![Detection::new(BoundingBox::new(500.0, 500.0, 50.0, 50.0), 0.9)],
        });
        let stats = build_loop(frames(2), detector, &server.uri(), rx)
            .run()
            .await
            .unwrap();

        assert_eq!(stats.reports_sent, 0);
    }

    #[tokio::test]
    async fn test_manual_capture_bypasses_detection() {
        let server = mock_collector(200, Some(1)).await;
        let (tx, rx) = mpsc::channel(4);
        tx.send(Command::ManualCapture).await.unwrap();

        // No detections at all; only the manual capture goes out.
        let detector = Box::new(FixedDetector { detections: vec![] });
        let stats = build_loop(frames(1), detector, &server.uri(), rx)
            .run()
            .await
            .unwrap();

        assert_eq!(stats.manual_reports, 1);
        assert_eq!(stats.reports_sent, 0);
    }

    #[tokio::test]
    async fn test_shutdown_command_stops_before_next_frame() {
        let server = mock_collector(200, Some(0)).await;
        let (tx, rx) = mpsc::channel(4);
        tx.send(Command::Shutdown).await.unwrap();

        let detector = Box::new(FixedDetector {
            detections: vec![in_frame_detection()],
        });
        let stats = build_loop(frames(10), detector, &server.uri(), rx)
            .run()
            .await
            .unwrap();

        assert_eq!(stats.frames, 0);
    }

    #[tokio::test]
    async fn test_end_of_stream_ends_loop() {
        let server = mock_collector(200, None).await;
        let (_tx, rx) = mpsc::channel(4);

        let detector = Box::new(MotionDetector::new(&DetectorConfig::default()));
        let stats = build_loop(frames(2), detector, &server.uri(), rx)
            .run()
            .await
            .unwrap();

        // Identical blank frames: loop drains the source, nothing is sent.
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.detections, 0);
        assert_eq!(stats.reports_sent, 0);
    }
}
