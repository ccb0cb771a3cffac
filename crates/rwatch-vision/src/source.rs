//! Frame sources.
//!
//! A `FrameSource` hands the capture loop one RGB frame at a time and
//! signals end-of-stream with `Ok(None)`. The FFmpeg-backed implementation
//! covers files, network streams, and V4L2 camera devices.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use image::RgbImage;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info};

use crate::error::{CaptureError, CaptureResult};

/// A blocking source of video frames.
#[async_trait]
pub trait FrameSource: Send {
    /// Acquire the next frame, blocking until one is available.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    async fn next_frame(&mut self) -> CaptureResult<Option<RgbImage>>;

    /// Frame dimensions produced by this source.
    fn dimensions(&self) -> (u32, u32);
}

/// FFmpeg-backed frame source.
///
/// Spawns an FFmpeg child decoding the input to raw RGB24 at a fixed
/// processing resolution and reads frames off its stdout. The child is
/// killed when the source is dropped, so the device/file handle is released
/// on every loop exit path.
pub struct FfmpegSource {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    frames_read: u64,
}

impl FfmpegSource {
    /// Open a video input at the given processing resolution.
    ///
    /// `input` may be a file path, a stream URL, or a `/dev/video*` device.
    pub async fn open(input: &str, width: u32, height: u32) -> CaptureResult<Self> {
        which::which("ffmpeg").map_err(|_| CaptureError::FfmpegNotFound)?;

        let is_device = input.starts_with("/dev/video");
        let is_url = input.contains("://");
        if !is_device && !is_url && !Path::new(input).exists() {
            return Err(CaptureError::SourceNotFound(Path::new(input).to_path_buf()));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        if is_device {
            cmd.args(["-f", "v4l2"]);
        }
        cmd.args(["-i", input])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-vf", &format!("scale={width}:{height}")])
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| CaptureError::source_open_failed(format!("ffmpeg spawn: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptureError::source_open_failed("ffmpeg stdout not captured"))?;

        info!(input, width, height, "Video source opened");

        Ok(Self {
            child,
            stdout,
            width,
            height,
            frames_read: 0,
        })
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

#[async_trait]
impl FrameSource for FfmpegSource {
    async fn next_frame(&mut self) -> CaptureResult<Option<RgbImage>> {
        let frame_len = (self.width * self.height * 3) as usize;
        let mut buf = vec![0u8; frame_len];

        match self.stdout.read_exact(&mut buf).await {
            Ok(_) => {
                self.frames_read += 1;
                let frame = RgbImage::from_raw(self.width, self.height, buf).ok_or_else(|| {
                    CaptureError::SourceReadFailed("frame buffer size mismatch".to_string())
                })?;
                Ok(Some(frame))
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!(frames = self.frames_read, "Video source exhausted");
                // Reap the child so it doesn't linger as a zombie
                let _ = self.child.try_wait();
                Ok(None)
            }
            Err(e) => Err(CaptureError::SourceReadFailed(e.to_string())),
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
