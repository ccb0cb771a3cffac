//! Capture loop binary.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rwatch_capture::{CaptureConfig, CaptureLoop, Command, CooldownGate, GpsSimulator, ReportClient};
use rwatch_vision::{create_detector, Detector, DetectorKind, FfmpegSource};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting rwatch-capture");

    let config = CaptureConfig::from_env();
    info!(
        collector = %config.collector_url,
        input = %config.video_input,
        cooldown_secs = config.cooldown.as_secs(),
        "Capture config loaded"
    );

    let detector = build_detector(&config);
    info!(detector = detector.name(), "Detector selected");

    let source = match FfmpegSource::open(&config.video_input, config.frame_width, config.frame_height).await {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to open video source: {e}");
            std::process::exit(1);
        }
    };

    let client = match ReportClient::new(&config.collector_url, config.request_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create transmission client: {e}");
            std::process::exit(1);
        }
    };

    let gps = GpsSimulator::new(config.base_latitude, config.base_longitude, config.gps_jitter);

    if let Some(dir) = &config.overlay_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            error!("Failed to create overlay directory {}: {e}", dir.display());
            std::process::exit(1);
        }
        info!(dir = %dir.display(), "Overlay frames enabled");
    }

    let (tx, rx) = mpsc::channel(8);
    spawn_operator_input(tx);

    let capture = CaptureLoop::new(
        Box::new(source),
        detector,
        client,
        gps,
        CooldownGate::new(config.cooldown),
        rx,
        config.overlay_dir.clone(),
    );

    match capture.run().await {
        Ok(stats) => {
            info!(
                frames = stats.frames,
                detections = stats.detections,
                reports = stats.reports_sent,
                manual = stats.manual_reports,
                "Capture loop stopped"
            );
        }
        Err(e) => {
            error!("Capture loop failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Build the configured detector, falling back to frame differencing when
/// the model is unavailable (matches the field rig behavior).
fn build_detector(config: &CaptureConfig) -> Box<dyn Detector> {
    match create_detector(config.detector, &config.detector_config) {
        Ok(detector) => detector,
        Err(e) if config.detector == DetectorKind::Model => {
            warn!(error = %e, "Model detector unavailable, using frame differencing");
            create_detector(DetectorKind::Motion, &config.detector_config)
                .expect("motion detector construction is infallible")
        }
        Err(e) => {
            error!("Failed to create detector: {e}");
            std::process::exit(1);
        }
    }
}

/// Forward operator keys from stdin: `s` = manual capture, `q` = shutdown.
fn spawn_operator_input(tx: mpsc::Sender<Command>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = match line.trim() {
                "s" => Command::ManualCapture,
                "q" => Command::Shutdown,
                _ => continue,
            };
            if tx.send(command).await.is_err() {
                break;
            }
        }
    });
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("rwatch=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
