//! OCR engine abstraction
//!
//! An engine hands out one [`OcrWorker`] per recognition. Workers report what
//! they are doing through a logger callback, the same way the engine's own
//! status messages are tagged ("loading language traineddata",
//! "recognizing text", ...).

use std::sync::Arc;
use thiserror::Error;

use crate::ocr::Language;
use crate::source::DataUrl;

/// Status tag the engine uses while it is reading text
pub const STATUS_RECOGNIZING: &str = "recognizing text";
/// Status tag used while language data is fetched or loaded
pub const STATUS_LOADING_LANGUAGE: &str = "loading language traineddata";
/// Status tag used once the worker is ready
pub const STATUS_INITIALIZING: &str = "initializing api";

/// A status message from the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub status: String,
    /// Progress of this status, 0.0 to 1.0
    pub progress: f32,
}

impl EngineStatus {
    pub fn new(status: impl Into<String>, progress: f32) -> Self {
        Self {
            status: status.into(),
            progress,
        }
    }
}

/// Callback receiving engine status messages
pub type Logger = Arc<dyn Fn(EngineStatus) + Send + Sync>;

/// Recognition failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrEngineError {
    #[error("Failed to start OCR engine: {0}")]
    Spawn(String),
    #[error("OCR engine failed: {0}")]
    Engine(String),
    #[error("Failed to load language data for '{language}': {reason}")]
    LanguageData { language: String, reason: String },
    #[error("An OCR job is already running")]
    Busy,
    #[error("I/O error while talking to the OCR engine: {0}")]
    Io(String),
    #[error("OCR worker stopped unexpectedly")]
    Panicked,
}

/// An OCR engine treated as a black box
pub trait OcrEngine: Send + Sync {
    /// Prepare a worker for `language`, loading language data if needed
    fn create_worker(&self, language: Language, logger: Logger) -> Result<Box<dyn OcrWorker>, OcrEngineError>;
}

/// A single-use recognition worker
pub trait OcrWorker: Send {
    fn recognize(&mut self, image: &DataUrl) -> Result<String, OcrEngineError>;

    /// Release everything the worker holds. Must be safe to call after a failure.
    fn terminate(&mut self);
}

/// Keeps reported progress within [0, 1] and never moving backwards
#[derive(Debug, Default, Clone)]
pub struct ProgressTracker {
    last: Option<f32>,
}

impl ProgressTracker {
    /// Returns the fraction to report, or `None` if it would move backwards
    pub fn advance(&mut self, fraction: f32) -> Option<f32> {
        if !fraction.is_finite() {
            return None;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        match self.last {
            Some(last) if fraction < last => None,
            _ => {
                self.last = Some(fraction);
                Some(fraction)
            }
        }
    }
}
