//! Scanner view state and its transitions
//!
//! Every user action and worker event goes through [`ScannerState::reduce`],
//! which updates the state and returns the side effects to run.

use std::path::PathBuf;

use crate::ocr::{JobId, Language, OcrJob};
use crate::postprocess::{self, LINE_BREAK};
use crate::source::{CameraError, ImageHandle};

/// Processing status shown under the Scan button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Processing,
    Completed,
    Error,
}

impl Status {
    /// Status line text
    pub fn status_text(&self) -> &'static str {
        match self {
            Status::Idle => "",
            Status::Processing => "Processing...",
            Status::Completed => "Completed",
            Status::Error => "Error occurred during processing.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Inline message shown until dismissed or replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

pub const COPIED_NOTICE: &str = "OCR result copied to clipboard!";

/// Everything that can happen to the scanner
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ImageSelected(ImageHandle),
    /// A file was rejected before it became an image
    SourceRejected(String),
    Submit,
    JobProgress { job: JobId, fraction: f32 },
    JobCompleted { job: JobId, text: String },
    JobFailed { job: JobId, message: String },
    Copy,
    Copied,
    Download,
    Downloaded(PathBuf),
    /// Copy or download failed
    OutputFailed(String),
    OpenCamera,
    CameraOpened,
    CameraFailed(CameraError),
    CaptureFrame,
    FrameCaptured(ImageHandle),
    StopCamera,
    LanguageChanged(Language),
    DismissNotice,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Recognize(OcrJob),
    /// Plain text plus an HTML rendering for rich paste targets
    CopyText { text: String, html: String },
    SaveText(String),
    OpenCamera,
    CaptureFrame,
    StopCamera,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannerState {
    /// The one live image
    pub image: Option<ImageHandle>,
    pub status: Status,
    /// Percent, 0 to 100
    pub progress: f32,
    pub language: Language,
    /// Result text with line breaks stored as [`LINE_BREAK`]
    pub result_text: String,
    /// Message of the last failed job
    pub error: Option<String>,
    pub camera_open: bool,
    /// Job in flight
    pub job: Option<JobId>,
    pub notice: Option<Notice>,
    /// Strip noise characters from results
    pub clean_output: bool,
}

impl Default for ScannerState {
    fn default() -> Self {
        Self::new(Language::default(), true)
    }
}

impl ScannerState {
    pub fn new(language: Language, clean_output: bool) -> Self {
        Self {
            image: None,
            status: Status::Idle,
            progress: 0.0,
            language,
            result_text: String::new(),
            error: None,
            camera_open: false,
            job: None,
            notice: None,
            clean_output,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.job.is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.image.is_some() && !self.is_processing()
    }

    pub fn has_result(&self) -> bool {
        !self.result_text.is_empty()
    }

    /// Result as plain lines
    pub fn segments(&self) -> Vec<&str> {
        postprocess::segments(&self.result_text)
    }

    /// Result as shown, copied and downloaded
    pub fn display_text(&self) -> String {
        postprocess::display_text(&self.result_text)
    }

    /// Progress rounded for display
    pub fn progress_percent(&self) -> u8 {
        self.progress.round().clamp(0.0, 100.0) as u8
    }

    /// Apply `action` and return the effects it requires
    pub fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::ImageSelected(image) | Action::FrameCaptured(image) => {
                if self.is_processing() {
                    tracing::debug!("Ignoring new image while a job is running");
                    return Vec::new();
                }
                self.image = Some(image);
                self.result_text.clear();
                self.error = None;
                self.progress = 0.0;
                self.status = Status::Idle;
                Vec::new()
            }
            Action::SourceRejected(message) => {
                self.notice = Some(Notice::error(message));
                Vec::new()
            }
            Action::Submit => {
                let Some(image) = self.image.clone() else {
                    return Vec::new();
                };
                if self.is_processing() {
                    return Vec::new();
                }
                let job = OcrJob::new(self.language, image);
                self.job = Some(job.id);
                self.status = Status::Processing;
                self.progress = 0.0;
                self.error = None;
                vec![Effect::Recognize(job)]
            }
            Action::JobProgress { job, fraction } => {
                if self.job == Some(job) {
                    let percent = (fraction * 100.0).clamp(0.0, 100.0);
                    if percent > self.progress {
                        self.progress = percent;
                    }
                }
                Vec::new()
            }
            Action::JobCompleted { job, text } => {
                if self.job == Some(job) {
                    self.job = None;
                    self.result_text = if self.clean_output {
                        postprocess::clean(&text)
                    } else {
                        text.replace('\n', LINE_BREAK)
                    };
                    self.progress = 100.0;
                    self.status = Status::Completed;
                }
                Vec::new()
            }
            Action::JobFailed { job, message } => {
                if self.job == Some(job) {
                    self.job = None;
                    self.error = Some(message);
                    self.status = Status::Error;
                }
                Vec::new()
            }
            Action::Copy => {
                if !self.has_result() {
                    return Vec::new();
                }
                vec![Effect::CopyText {
                    text: self.display_text(),
                    html: postprocess::render_html(&self.result_text),
                }]
            }
            Action::Copied => {
                self.notice = Some(Notice::info(COPIED_NOTICE));
                Vec::new()
            }
            Action::Download => {
                if !self.has_result() {
                    return Vec::new();
                }
                vec![Effect::SaveText(self.display_text())]
            }
            Action::Downloaded(path) => {
                self.notice = Some(Notice::info(format!("Saved {}", path.display())));
                Vec::new()
            }
            Action::OutputFailed(message) => {
                self.notice = Some(Notice::error(message));
                Vec::new()
            }
            Action::OpenCamera => {
                if self.camera_open {
                    return Vec::new();
                }
                vec![Effect::OpenCamera]
            }
            Action::CameraOpened => {
                self.camera_open = true;
                self.notice = None;
                Vec::new()
            }
            Action::CameraFailed(error) => {
                self.notice = Some(Notice::error(error.to_string()));
                // a stream that died on its own still has to be released
                if std::mem::replace(&mut self.camera_open, false) {
                    vec![Effect::StopCamera]
                } else {
                    Vec::new()
                }
            }
            Action::CaptureFrame => {
                if !self.camera_open || self.is_processing() {
                    return Vec::new();
                }
                // capture always closes the stream
                self.camera_open = false;
                vec![Effect::CaptureFrame]
            }
            Action::StopCamera => {
                if !self.camera_open {
                    return Vec::new();
                }
                self.camera_open = false;
                vec![Effect::StopCamera]
            }
            Action::LanguageChanged(language) => {
                self.language = language;
                Vec::new()
            }
            Action::DismissNotice => {
                self.notice = None;
                Vec::new()
            }
        }
    }
}
