//! OCR Layer
//!
//! Hands images to the external OCR engine and relays its progress.
//! Currently backed by the Tesseract command-line tool.

pub mod engine;
pub mod language;
pub mod service;
pub mod tessdata;
pub mod tesseract;

pub use engine::{OcrEngine, OcrEngineError};
pub use language::Language;
pub use service::{JobId, Notifier, OcrJob, OcrService};
pub use tessdata::TessdataStore;
pub use tesseract::TesseractEngine;
