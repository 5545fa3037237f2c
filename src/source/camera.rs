//! Camera sessions
//!
//! A [`CameraSession`] owns an open video stream for as long as the preview is
//! visible. Capturing a frame consumes the session, so the stream is always
//! released together with the capture.

use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use super::frame::CapturedFrame;
use super::handle::{DataUrl, ImageHandle, ImageOrigin};

/// Camera failures surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// No camera, no capture tool, or the device could not be opened
    #[error("Webcam not supported: {0}")]
    Unavailable(String),
    /// The platform refused access to the device
    #[error("Camera access was denied")]
    PermissionDenied,
    /// Capture was requested before the stream produced a frame
    #[error("No camera frame available yet")]
    NoFrame,
    /// The captured frame could not be encoded
    #[error("Failed to encode captured frame: {0}")]
    Encode(String),
}

/// An open video stream producing RGBA frames
pub trait VideoStream: Send {
    /// Most recent frame, if any arrived yet
    fn latest_frame(&self) -> Option<CapturedFrame>;
    /// Number of underlying tracks still running
    fn active_tracks(&self) -> usize;
    /// Why the stream ended on its own, if it did
    fn failure(&self) -> Option<CameraError>;
    /// Stop every track. Must be safe to call more than once.
    fn stop(&mut self);
}

/// Something that can open a camera stream
pub trait CameraBackend: Send + Sync {
    fn open(&self) -> Result<Box<dyn VideoStream>, CameraError>;
}

/// An open camera and its live preview source
pub struct CameraSession {
    stream: Box<dyn VideoStream>,
    opened_at: Instant,
}

impl CameraSession {
    /// Latest frame for the preview surface
    pub fn latest_frame(&self) -> Option<CapturedFrame> {
        self.stream.latest_frame()
    }

    /// Set once the device stops delivering frames without being asked to
    pub fn failure(&self) -> Option<CameraError> {
        self.stream.failure()
    }

    /// Release the stream
    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.stream.active_tracks() > 0 {
            debug!("Stopping camera session opened {:?} ago", self.opened_at.elapsed());
        }
        self.stream.stop();
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("active_tracks", &self.stream.active_tracks())
            .field("opened_at", &self.opened_at)
            .finish()
    }
}

/// Open the camera for live preview
pub fn open_camera(backend: &dyn CameraBackend) -> Result<CameraSession, CameraError> {
    let stream = backend.open()?;
    info!("Camera opened");
    Ok(CameraSession {
        stream,
        opened_at: Instant::now(),
    })
}

/// Grab the current frame as a PNG image and close the camera.
///
/// The session is stopped whether or not a frame could be captured.
pub fn capture_frame(session: CameraSession) -> Result<ImageHandle, CameraError> {
    let frame = session.latest_frame();
    session.stop();

    let frame = frame.ok_or(CameraError::NoFrame)?;
    let png = frame
        .encode_png()
        .map_err(|e| CameraError::Encode(format!("{e:#}")))?;

    info!(
        "Captured {}x{} camera frame ({} bytes, {:?} old)",
        frame.width,
        frame.height,
        png.len(),
        frame.timestamp.elapsed()
    );

    Ok(ImageHandle::new(
        ImageOrigin::Camera {
            width: frame.width,
            height: frame.height,
        },
        DataUrl::new("image/png", png),
    ))
}

/// Close the camera if one is open
pub fn stop_camera(session: &mut Option<CameraSession>) {
    if let Some(session) = session.take() {
        session.stop();
        info!("Camera stopped");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeCamera;
    use super::*;

    #[test]
    fn test_capture_releases_tracks() {
        let camera = FakeCamera::with_frame(4, 3);
        let session = open_camera(&camera).unwrap();
        assert_eq!(camera.tracks(), 1);

        let handle = capture_frame(session).unwrap();

        assert_eq!(camera.tracks(), 0);
        assert_eq!(handle.data().mime(), "image/png");
        assert_eq!(handle.origin(), &ImageOrigin::Camera { width: 4, height: 3 });
    }

    #[test]
    fn test_capture_without_frame_still_releases() {
        let camera = FakeCamera {
            result: Ok(None),
            tracks: Default::default(),
            failure: Default::default(),
        };
        let session = open_camera(&camera).unwrap();

        let result = capture_frame(session);

        assert_eq!(result.unwrap_err(), CameraError::NoFrame);
        assert_eq!(camera.tracks(), 0);
    }

    #[test]
    fn test_stop_camera_is_idempotent() {
        let camera = FakeCamera::with_frame(2, 2);
        let mut session = Some(open_camera(&camera).unwrap());

        stop_camera(&mut session);
        stop_camera(&mut session);

        assert!(session.is_none());
        assert_eq!(camera.tracks(), 0);
    }

    #[test]
    fn test_dropping_session_releases_tracks() {
        let camera = FakeCamera::with_frame(2, 2);
        {
            let _session = open_camera(&camera).unwrap();
            assert_eq!(camera.tracks(), 1);
        }
        assert_eq!(camera.tracks(), 0);
    }

    #[test]
    fn test_open_reports_denial() {
        let camera = FakeCamera::failing(CameraError::PermissionDenied);
        let err = open_camera(&camera).unwrap_err();
        assert_eq!(err, CameraError::PermissionDenied);
        assert_eq!(camera.tracks(), 0);
    }
}
