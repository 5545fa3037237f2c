//! Runs the effects requested by [`ScannerState`] and feeds results back

use crossbeam_channel::Receiver;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::state::{Action, Effect, ScannerState};
use crate::ocr::{Notifier, OcrEngine, OcrService};
use crate::shared::WorkerEvent;
use crate::source::{self, CameraBackend, CameraSession, CapturedFrame, SourcePolicy};
use crate::storage;

/// Destination for the Copy action
pub trait ClipboardSink {
    /// Place `html` on the clipboard with `text` as the plain-text alternative
    fn set_result(&mut self, text: &str, html: &str) -> anyhow::Result<()>;
}

/// The system clipboard. Opened on first use and kept alive afterwards,
/// since some platforms drop the contents with the handle.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_result(&mut self, text: &str, html: &str) -> anyhow::Result<()> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        self.inner.insert(clipboard).set_html(html, Some(text))?;
        Ok(())
    }
}

/// Owns the scanner state and every resource its effects touch
pub struct ScannerController {
    state: ScannerState,
    camera: Box<dyn CameraBackend>,
    session: Option<CameraSession>,
    ocr: OcrService,
    events: Receiver<WorkerEvent>,
    clipboard: Box<dyn ClipboardSink>,
    download_dir: PathBuf,
    policy: SourcePolicy,
}

impl ScannerController {
    pub fn new(
        state: ScannerState,
        engine: Arc<dyn OcrEngine>,
        camera: Box<dyn CameraBackend>,
        clipboard: Box<dyn ClipboardSink>,
        download_dir: PathBuf,
        policy: SourcePolicy,
    ) -> Self {
        let (tx, events) = crossbeam_channel::unbounded();
        Self {
            state,
            camera,
            session: None,
            ocr: OcrService::new(engine, tx),
            events,
            clipboard,
            download_dir,
            policy,
        }
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn set_download_dir(&mut self, dir: PathBuf) {
        self.download_dir = dir;
    }

    pub fn set_policy(&mut self, policy: SourcePolicy) {
        self.policy = policy;
    }

    pub fn set_clean_output(&mut self, clean: bool) {
        self.state.clean_output = clean;
    }

    /// Wake the UI whenever a job posts an event
    pub fn set_notifier(&mut self, notifier: Notifier) {
        self.ocr.set_notifier(notifier);
    }

    /// Latest camera frame for the live preview
    pub fn preview_frame(&self) -> Option<CapturedFrame> {
        self.session.as_ref().and_then(CameraSession::latest_frame)
    }

    /// Apply an action and run its effects, including any follow-up actions
    pub fn dispatch(&mut self, action: Action) {
        let mut pending = VecDeque::from([action]);
        while let Some(action) = pending.pop_front() {
            for effect in self.state.reduce(action) {
                if let Some(next) = self.run(effect) {
                    pending.push_back(next);
                }
            }
        }
    }

    /// Drain worker events and check the camera. Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        if let Some(error) = self.session.as_ref().and_then(CameraSession::failure) {
            error!("Camera stream failed: {}", error);
            self.dispatch(Action::CameraFailed(error));
            changed = true;
        }

        let events: Vec<WorkerEvent> = self.events.try_iter().collect();
        changed |= !events.is_empty();
        for event in events {
            if event.is_terminal() {
                debug!("OCR job {} finished", event.job());
            }
            let action = match event {
                WorkerEvent::Progress { job, fraction } => Action::JobProgress { job, fraction },
                WorkerEvent::Completed { job, text } => Action::JobCompleted { job, text },
                WorkerEvent::Failed { job, error } => Action::JobFailed {
                    job,
                    message: error.to_string(),
                },
            };
            self.dispatch(action);
        }
        changed
    }

    /// Load an image file chosen by path or drop
    pub fn select_file(&mut self, path: &Path) {
        let action = match source::select_from_file(path, self.policy) {
            Ok(image) => Action::ImageSelected(image),
            Err(e) => {
                warn!("Rejected {:?}: {}", path, e);
                Action::SourceRejected(e.to_string())
            }
        };
        self.dispatch(action);
    }

    /// Load a dropped file that arrived as bytes
    pub fn select_bytes(&mut self, name: &str, bytes: Arc<[u8]>) {
        let action = match source::select_from_bytes(name, bytes, self.policy) {
            Ok(image) => Action::ImageSelected(image),
            Err(e) => {
                warn!("Rejected dropped file {}: {}", name, e);
                Action::SourceRejected(e.to_string())
            }
        };
        self.dispatch(action);
    }

    fn run(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::Recognize(job) => {
                let id = job.id;
                match self.ocr.submit(job) {
                    Ok(_handle) => None,
                    Err(e) => {
                        error!("Could not start OCR job {}: {}", id, e);
                        Some(Action::JobFailed {
                            job: id,
                            message: e.to_string(),
                        })
                    }
                }
            }
            Effect::OpenCamera => match source::open_camera(self.camera.as_ref()) {
                Ok(session) => {
                    self.session = Some(session);
                    Some(Action::CameraOpened)
                }
                Err(e) => {
                    error!("Error accessing webcam: {}", e);
                    Some(Action::CameraFailed(e))
                }
            },
            Effect::CaptureFrame => {
                let session = self.session.take()?;
                match source::capture_frame(session) {
                    Ok(image) => Some(Action::FrameCaptured(image)),
                    Err(e) => {
                        error!("Camera capture failed: {}", e);
                        Some(Action::CameraFailed(e))
                    }
                }
            }
            Effect::StopCamera => {
                source::stop_camera(&mut self.session);
                None
            }
            Effect::CopyText { text, html } => match self.clipboard.set_result(&text, &html) {
                Ok(()) => {
                    info!("Copied {} chars to clipboard", text.len());
                    Some(Action::Copied)
                }
                Err(e) => {
                    error!("Failed to copy: {:#}", e);
                    Some(Action::OutputFailed(format!("Failed to copy: {e}")))
                }
            },
            Effect::SaveText(text) => {
                match storage::save_text_result(&self.download_dir, &text, storage::now_epoch_ms()) {
                    Ok(path) => Some(Action::Downloaded(path)),
                    Err(e) => {
                        error!("Failed to save result: {:#}", e);
                        Some(Action::OutputFailed(format!("Failed to save result: {e}")))
                    }
                }
            }
        }
    }
}

impl Drop for ScannerController {
    fn drop(&mut self) {
        source::stop_camera(&mut self.session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::service::testing::FakeEngine;
    use crate::ocr::OcrEngineError;
    use crate::scanner::state::{Status, COPIED_NOTICE};
    use crate::source::camera::testing::FakeCamera;
    use crate::source::CameraError;
    use parking_lot::Mutex;
    use std::sync::atomic::Ordering;
    use std::time::{Duration, Instant};

    /// Records the last (text, html) pair
    #[derive(Clone, Default)]
    struct FakeClipboard(Arc<Mutex<Option<(String, String)>>>);

    impl ClipboardSink for FakeClipboard {
        fn set_result(&mut self, text: &str, html: &str) -> anyhow::Result<()> {
            *self.0.lock() = Some((text.to_string(), html.to_string()));
            Ok(())
        }
    }

    struct Harness {
        controller: ScannerController,
        engine: Arc<FakeEngine>,
        clipboard: FakeClipboard,
        tracks: Arc<std::sync::atomic::AtomicUsize>,
        _dir: tempfile::TempDir,
    }

    fn harness(engine: FakeEngine, camera: FakeCamera) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(engine);
        let clipboard = FakeClipboard::default();
        let tracks = camera.tracks.clone();
        let controller = ScannerController::new(
            ScannerState::default(),
            engine.clone(),
            Box::new(camera),
            Box::new(clipboard.clone()),
            dir.path().to_path_buf(),
            SourcePolicy::default(),
        );
        Harness {
            controller,
            engine,
            clipboard,
            tracks,
            _dir: dir,
        }
    }

    fn wait_for_job(controller: &mut ScannerController) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while controller.state().is_processing() {
            assert!(Instant::now() < deadline, "OCR job did not finish");
            controller.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn select_png(controller: &mut ScannerController) {
        controller.select_bytes("scan.png", Arc::from(vec![0u8; 16]));
        assert!(controller.state().image.is_some());
    }

    #[test]
    fn test_submit_without_image_never_calls_engine() {
        let mut h = harness(FakeEngine::returning(Ok("x".to_string())), FakeCamera::with_frame(2, 2));
        h.controller.dispatch(Action::Submit);

        assert_eq!(h.engine.created(), 0);
        assert_eq!(h.controller.state().status, Status::Idle);
        assert!(!h.controller.poll());
    }

    #[test]
    fn test_capture_leaves_no_active_tracks() {
        let mut h = harness(FakeEngine::returning(Ok(String::new())), FakeCamera::with_frame(4, 3));

        h.controller.dispatch(Action::OpenCamera);
        assert!(h.controller.state().camera_open);
        assert_eq!(h.tracks.load(Ordering::SeqCst), 1);
        assert!(h.controller.preview_frame().is_some());

        h.controller.dispatch(Action::CaptureFrame);
        assert_eq!(h.tracks.load(Ordering::SeqCst), 0);
        assert!(!h.controller.state().camera_open);

        let image = h.controller.state().image.clone().unwrap();
        assert_eq!(image.data().mime(), "image/png");
        assert_eq!(image.label(), "Camera capture (4x3)");
        assert!(h.controller.preview_frame().is_none());
    }

    #[test]
    fn test_stop_camera_releases_tracks() {
        let mut h = harness(FakeEngine::returning(Ok(String::new())), FakeCamera::with_frame(2, 2));
        h.controller.dispatch(Action::OpenCamera);
        h.controller.dispatch(Action::StopCamera);

        assert_eq!(h.tracks.load(Ordering::SeqCst), 0);
        assert!(h.controller.state().image.is_none());
    }

    #[test]
    fn test_camera_failure_becomes_notice() {
        let mut h = harness(
            FakeEngine::returning(Ok(String::new())),
            FakeCamera::failing(CameraError::Unavailable("no device".to_string())),
        );
        h.controller.dispatch(Action::OpenCamera);

        let state = h.controller.state();
        assert!(!state.camera_open);
        assert_eq!(
            state.notice.as_ref().map(|n| n.message.as_str()),
            Some("Webcam not supported: no device")
        );
    }

    #[test]
    fn test_lost_camera_stream_becomes_notice() {
        let camera = FakeCamera::with_frame(2, 2);
        let failure = camera.failure.clone();
        let mut h = harness(FakeEngine::returning(Ok(String::new())), camera);
        h.controller.dispatch(Action::OpenCamera);
        assert!(!h.controller.poll());

        *failure.lock() = Some(CameraError::Unavailable("device unplugged".to_string()));

        assert!(h.controller.poll());
        let state = h.controller.state();
        assert!(!state.camera_open);
        assert_eq!(
            state.notice.as_ref().map(|n| n.message.as_str()),
            Some("Webcam not supported: device unplugged")
        );
        assert_eq!(h.tracks.load(Ordering::SeqCst), 0);
        assert!(h.controller.preview_frame().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_open_camera_does_not_wait_for_frames() {
        use crate::config::CameraSettings;
        use crate::source::FfmpegCamera;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("slow-ffmpeg");
        std::fs::write(&program, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();
        let camera = FfmpegCamera::new(CameraSettings {
            ffmpeg_path: program.to_string_lossy().into_owned(),
            ..CameraSettings::default()
        });
        let mut controller = ScannerController::new(
            ScannerState::default(),
            Arc::new(FakeEngine::returning(Ok(String::new()))),
            Box::new(camera),
            Box::new(FakeClipboard::default()),
            dir.path().to_path_buf(),
            SourcePolicy::default(),
        );

        let started = Instant::now();
        controller.dispatch(Action::OpenCamera);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(controller.state().camera_open);
        assert!(controller.state().notice.is_none());
        assert!(controller.preview_frame().is_none());

        let started = Instant::now();
        controller.dispatch(Action::StopCamera);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!controller.state().camera_open);
    }

    #[test]
    fn test_recognize_copy_and_download() {
        let mut h = harness(
            FakeEngine::returning(Ok("Invoice=42\nTotal, 10".to_string())),
            FakeCamera::with_frame(2, 2),
        );
        select_png(&mut h.controller);
        h.controller.dispatch(Action::Submit);
        wait_for_job(&mut h.controller);

        let shown = h.controller.state().display_text();
        assert_eq!(shown, "Invoice 42\nTotal  10");
        assert_eq!(h.controller.state().status, Status::Completed);
        assert_eq!(h.engine.terminated(), 1);

        h.controller.dispatch(Action::Copy);
        assert_eq!(
            h.clipboard.0.lock().clone(),
            Some((shown.clone(), "Invoice 42<br />Total  10".to_string()))
        );
        assert_eq!(
            h.controller.state().notice.as_ref().map(|n| n.message.as_str()),
            Some(COPIED_NOTICE)
        );

        h.controller.dispatch(Action::Download);
        let files: Vec<PathBuf> = std::fs::read_dir(h.controller.download_dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);

        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        let stamp = name
            .strip_prefix("ocr_result_")
            .and_then(|rest| rest.strip_suffix(".txt"))
            .unwrap();
        assert!(!stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(std::fs::read_to_string(&files[0]).unwrap(), shown);
    }

    #[test]
    fn test_engine_failure_preserves_text() {
        let mut h = harness(
            FakeEngine::returning(Err(OcrEngineError::Engine("bad image".to_string()))),
            FakeCamera::with_frame(2, 2),
        );
        select_png(&mut h.controller);
        h.controller.state.result_text = "earlier<br />result".to_string();
        h.controller.state.status = Status::Completed;

        h.controller.dispatch(Action::Submit);
        wait_for_job(&mut h.controller);

        let state = h.controller.state();
        assert_eq!(state.status, Status::Error);
        assert_eq!(state.result_text, "earlier<br />result");
        assert_eq!(state.error.as_deref(), Some("OCR engine failed: bad image"));
    }

    #[test]
    fn test_unsupported_file_rejected() {
        let mut h = harness(FakeEngine::returning(Ok(String::new())), FakeCamera::with_frame(2, 2));
        h.controller.select_bytes("notes.txt", Arc::from(b"hello".to_vec()));

        assert!(h.controller.state().image.is_none());
        assert!(h.controller.state().notice.is_some());
    }
}
