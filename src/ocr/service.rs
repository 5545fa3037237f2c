//! OCR invocation
//!
//! [`recognize`] runs one job on the calling thread with a scoped worker.
//! [`OcrService`] runs jobs on a background thread, one at a time, and posts
//! their progress and outcome as [`WorkerEvent`]s.

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::engine::{EngineStatus, Logger, OcrEngine, OcrEngineError, OcrWorker, ProgressTracker, STATUS_RECOGNIZING};
use crate::ocr::Language;
use crate::shared::WorkerEvent;
use crate::source::{DataUrl, ImageHandle};

/// Identifies one OCR job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// One recognition request
#[derive(Debug, Clone, PartialEq)]
pub struct OcrJob {
    pub id: JobId,
    pub language: Language,
    pub image: ImageHandle,
}

impl OcrJob {
    pub fn new(language: Language, image: ImageHandle) -> Self {
        Self {
            id: JobId::new(),
            language,
            image,
        }
    }
}

/// Terminates the worker when dropped, whatever the outcome
struct WorkerGuard(Box<dyn OcrWorker>);

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.0.terminate();
    }
}

/// Recognize `image` in `language`.
///
/// `on_progress` only sees "recognizing text" updates, clamped to [0, 1] and
/// never decreasing. Other engine statuses are logged and dropped.
pub fn recognize<F>(engine: &dyn OcrEngine, image: &DataUrl, language: Language, on_progress: F) -> Result<String, OcrEngineError>
where
    F: FnMut(f32) + Send + 'static,
{
    let relay = Arc::new(Mutex::new((ProgressTracker::default(), on_progress)));
    let logger: Logger = Arc::new(move |event: EngineStatus| {
        if event.status != STATUS_RECOGNIZING {
            debug!("OCR engine: {} ({:.0}%)", event.status, event.progress * 100.0);
            return;
        }
        let mut relay = relay.lock();
        let (tracker, callback) = &mut *relay;
        if let Some(fraction) = tracker.advance(event.progress) {
            callback(fraction);
        }
    });

    let mut worker = WorkerGuard(engine.create_worker(language, logger)?);
    worker.0.recognize(image)
}

/// Callback used to wake the UI when an event is posted
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Runs OCR jobs in the background, at most one at a time
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
    events: Sender<WorkerEvent>,
    busy: Arc<AtomicBool>,
    notifier: Option<Notifier>,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>, events: Sender<WorkerEvent>) -> Self {
        Self {
            engine,
            events,
            busy: Arc::new(AtomicBool::new(false)),
            notifier: None,
        }
    }

    /// Call `notifier` after every posted event
    pub fn set_notifier(&mut self, notifier: Notifier) {
        self.notifier = Some(notifier);
    }

    /// Whether a job is outstanding
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Start `job` on a background thread.
    ///
    /// Fails with [`OcrEngineError::Busy`] while another job is running.
    pub fn submit(&self, job: OcrJob) -> Result<JoinHandle<()>, OcrEngineError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(OcrEngineError::Busy);
        }

        let engine = self.engine.clone();
        let events = self.events.clone();
        let busy = self.busy.clone();
        let notify = self.notifier.clone();

        info!("Starting OCR job {} ({})", job.id, job.language.code());

        let spawned = std::thread::Builder::new()
            .name(format!("ocr-job-{}", job.id))
            .spawn(move || {
                let started = Instant::now();
                let job_id = job.id;

                let progress_events = events.clone();
                let progress_notify = notify.clone();
                let on_progress = move |fraction: f32| {
                    let _ = progress_events.send(WorkerEvent::Progress { job: job_id, fraction });
                    if let Some(notify) = &progress_notify {
                        notify();
                    }
                };

                let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    recognize(engine.as_ref(), job.image.data(), job.language, on_progress)
                }));

                busy.store(false, Ordering::SeqCst);

                let event = match outcome {
                    Ok(Ok(text)) => {
                        info!("OCR job {} completed in {:?} ({} chars)", job_id, started.elapsed(), text.len());
                        WorkerEvent::Completed { job: job_id, text }
                    }
                    Ok(Err(e)) => {
                        error!("OCR error in job {}: {}", job_id, e);
                        WorkerEvent::Failed { job: job_id, error: e }
                    }
                    Err(_) => {
                        error!("OCR job {} panicked", job_id);
                        WorkerEvent::Failed {
                            job: job_id,
                            error: OcrEngineError::Panicked,
                        }
                    }
                };

                let _ = events.send(event);
                if let Some(notify) = &notify {
                    notify();
                }
            });

        spawned.map_err(|e| {
            self.busy.store(false, Ordering::SeqCst);
            OcrEngineError::Spawn(format!("Failed to start OCR thread: {e}"))
        })
    }
}
