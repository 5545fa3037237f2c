//! Messages posted from background workers to the UI thread

use crate::ocr::{JobId, OcrEngineError};

/// Progress and outcome of an OCR job
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// Recognition progress, 0.0 to 1.0
    Progress { job: JobId, fraction: f32 },
    /// Recognition finished with raw engine text
    Completed { job: JobId, text: String },
    /// Recognition failed; the job is over
    Failed { job: JobId, error: OcrEngineError },
}

impl WorkerEvent {
    /// The job this event belongs to
    pub fn job(&self) -> JobId {
        match self {
            WorkerEvent::Progress { job, .. } | WorkerEvent::Completed { job, .. } | WorkerEvent::Failed { job, .. } => *job,
        }
    }

    /// Whether this event ends the job
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerEvent::Progress { .. })
    }
}
