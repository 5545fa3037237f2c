//! Camera backend driven by an `ffmpeg` child process
//!
//! ffmpeg opens the platform capture device and writes raw RGBA frames of a
//! fixed size to stdout. A reader thread keeps the most recent frame.

use parking_lot::Mutex;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::camera::{CameraBackend, CameraError, VideoStream};
use super::frame::CapturedFrame;
use crate::config::CameraSettings;

/// Camera backend that spawns ffmpeg
pub struct FfmpegCamera {
    settings: CameraSettings,
}

impl FfmpegCamera {
    pub fn new(settings: CameraSettings) -> Self {
        Self { settings }
    }

    fn command(&self) -> Command {
        let s = &self.settings;
        let size = format!("{}x{}", s.width, s.height);

        let mut cmd = Command::new(&s.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error"])
            .args(["-f", s.input_format.as_str()])
            .args(["-framerate", s.fps.to_string().as_str()])
            .args(["-video_size", size.as_str()])
            .args(["-i", s.device.as_str()])
            .args(["-vf", format!("scale={}:{}", s.width, s.height).as_str()])
            .args(["-pix_fmt", "rgba", "-f", "rawvideo", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Bytes in one RGBA frame, or `None` if the size does not fit in memory
fn frame_len(width: u32, height: u32) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(4)
}

impl CameraBackend for FfmpegCamera {
    /// Spawn the capture process and return right away. Frames show up in
    /// [`VideoStream::latest_frame`] once the device delivers them, and a
    /// device that never does is reported through [`VideoStream::failure`].
    fn open(&self) -> Result<Box<dyn VideoStream>, CameraError> {
        let (width, height) = (self.settings.width, self.settings.height);
        if width == 0 || height == 0 {
            return Err(CameraError::Unavailable("capture size is zero".to_string()));
        }
        let frame_len = frame_len(width, height)
            .ok_or_else(|| CameraError::Unavailable(format!("capture size {width}x{height} is too large")))?;

        info!(
            "Opening camera {} via {} ({}x{} @ {} fps)",
            self.settings.device, self.settings.input_format, width, height, self.settings.fps
        );

        let mut child = self.command().spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => CameraError::Unavailable(format!(
                "'{}' was not found; install ffmpeg to use the camera",
                self.settings.ffmpeg_path
            )),
            ErrorKind::PermissionDenied => CameraError::PermissionDenied,
            _ => CameraError::Unavailable(e.to_string()),
        })?;

        let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CameraError::Unavailable("capture process has no output pipes".to_string()));
        };

        let shared = Arc::new(CaptureShared::default());

        let stderr_reader = std::thread::spawn(move || {
            let mut text = String::new();
            let _ = stderr.read_to_string(&mut text);
            text
        });

        // Detached: it ends when the pipe closes, which may outlive the stream
        let reader = shared.clone();
        std::thread::spawn(move || {
            let mut frames = 0u64;
            while !reader.stopped.load(Ordering::SeqCst) {
                let mut buf = vec![0u8; frame_len];
                if stdout.read_exact(&mut buf).is_err() {
                    break;
                }
                *reader.latest.lock() = Some(CapturedFrame::new(buf, width, height));
                frames += 1;
            }
            reader.running.store(false, Ordering::SeqCst);
            debug!("Camera reader exiting after {} frames", frames);

            if reader.stopped.load(Ordering::SeqCst) {
                return;
            }
            let diagnostics = stderr_reader.join().unwrap_or_default();
            warn!("Camera stream ended after {} frames: {}", frames, diagnostics.trim());
            let error = if frames == 0 {
                classify_failure(&diagnostics)
            } else {
                CameraError::Unavailable("the camera stopped sending frames".to_string())
            };
            *reader.failure.lock() = Some(error);
        });

        Ok(Box::new(FfmpegStream {
            child: Some(child),
            shared,
        }))
    }
}

/// Map ffmpeg diagnostics to a camera error
fn classify_failure(stderr: &str) -> CameraError {
    let lower = stderr.to_lowercase();
    if lower.contains("permission denied") || lower.contains("not authorized") || lower.contains("not permitted") {
        return CameraError::PermissionDenied;
    }

    let reason = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no frames received from the device");
    CameraError::Unavailable(reason.to_string())
}

/// State the reader thread shares with its stream
struct CaptureShared {
    latest: Mutex<Option<CapturedFrame>>,
    failure: Mutex<Option<CameraError>>,
    running: AtomicBool,
    /// Set by `stop`, so the reader does not report the shutdown as a failure
    stopped: AtomicBool,
}

impl Default for CaptureShared {
    fn default() -> Self {
        Self {
            latest: Mutex::new(None),
            failure: Mutex::new(None),
            running: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
        }
    }
}

/// A running ffmpeg capture
struct FfmpegStream {
    child: Option<Child>,
    shared: Arc<CaptureShared>,
}

impl VideoStream for FfmpegStream {
    fn latest_frame(&self) -> Option<CapturedFrame> {
        self.shared.latest.lock().clone()
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.child.is_some() && self.shared.running.load(Ordering::SeqCst))
    }

    fn failure(&self) -> Option<CameraError> {
        self.shared.failure.lock().clone()
    }

    fn stop(&mut self) {
        self.shared.stopped.store(true, Ordering::SeqCst);
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.shared.running.store(false, Ordering::SeqCst);
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.stop();
    }
}
