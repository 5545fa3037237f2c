//! Tesseract command-line backend
//!
//! Each worker pipes the image into `tesseract stdin stdout -l <code>` and
//! reads the recognized text back from stdout.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

use super::engine::{
    EngineStatus, Logger, OcrEngine, OcrEngineError, OcrWorker, STATUS_INITIALIZING, STATUS_LOADING_LANGUAGE,
    STATUS_RECOGNIZING,
};
use super::tessdata::TessdataStore;
use crate::config::OcrSettings;
use crate::ocr::Language;
use crate::source::DataUrl;

/// OCR engine that shells out to the tesseract executable
pub struct TesseractEngine {
    program: String,
    extra_args: Vec<String>,
    tessdata: Option<TessdataStore>,
}

impl TesseractEngine {
    /// Create an engine from settings, preparing the managed language data store if enabled
    pub fn new(settings: &OcrSettings) -> anyhow::Result<Self> {
        let tessdata = if settings.managed_tessdata {
            Some(TessdataStore::new(&settings.tessdata_url)?)
        } else {
            None
        };
        Ok(Self::with_tessdata(settings, tessdata))
    }

    pub fn with_tessdata(settings: &OcrSettings, tessdata: Option<TessdataStore>) -> Self {
        Self {
            program: settings.tesseract_path.clone(),
            extra_args: settings.extra_args.clone(),
            tessdata,
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn create_worker(&self, language: Language, logger: Logger) -> Result<Box<dyn OcrWorker>, OcrEngineError> {
        let tessdata_dir = match &self.tessdata {
            Some(store) => {
                logger(EngineStatus::new(STATUS_LOADING_LANGUAGE, 0.0));
                let progress_logger = logger.clone();
                store
                    .ensure(language, |done, total| {
                        if let Some(total) = total.filter(|&t| t > 0) {
                            progress_logger(EngineStatus::new(STATUS_LOADING_LANGUAGE, done as f32 / total as f32));
                        }
                    })
                    .map_err(|e| OcrEngineError::LanguageData {
                        language: language.code().to_string(),
                        reason: format!("{e:#}"),
                    })?;
                logger(EngineStatus::new(STATUS_LOADING_LANGUAGE, 1.0));
                Some(store.dir().to_path_buf())
            }
            None => None,
        };

        logger(EngineStatus::new(STATUS_INITIALIZING, 1.0));
        debug!("Created tesseract worker for {}", language.code());

        Ok(Box::new(TesseractWorker {
            program: self.program.clone(),
            extra_args: self.extra_args.clone(),
            language,
            tessdata_dir,
            logger,
            child: None,
        }))
    }
}

/// One tesseract invocation
struct TesseractWorker {
    program: String,
    extra_args: Vec<String>,
    language: Language,
    tessdata_dir: Option<PathBuf>,
    logger: Logger,
    child: Option<Child>,
}

impl TesseractWorker {
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["stdin", "stdout", "-l", self.language.code()]);
        if let Some(dir) = &self.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.args(&self.extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl OcrWorker for TesseractWorker {
    fn recognize(&mut self, image: &DataUrl) -> Result<String, OcrEngineError> {
        (self.logger)(EngineStatus::new(STATUS_RECOGNIZING, 0.0));

        let child = self.command().spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => OcrEngineError::Spawn(format!(
                "'{}' was not found. Please ensure tesseract-ocr is installed and in your PATH.",
                self.program
            )),
            _ => OcrEngineError::Spawn(e.to_string()),
        })?;
        let child = self.child.insert(child);

        info!(
            "Running tesseract ({}, {} bytes of {})",
            self.language.code(),
            image.bytes().len(),
            image.mime()
        );

        // tesseract may exit before reading stdin (bad language data); its
        // stderr explains why better than the broken pipe does
        let pipe_error = child
            .stdin
            .take()
            .and_then(|mut stdin| stdin.write_all(image.bytes()).err());

        let Some(child) = self.child.take() else {
            return Err(OcrEngineError::Engine("tesseract process vanished".to_string()));
        };
        let output = child
            .wait_with_output()
            .map_err(|e| OcrEngineError::Io(format!("Failed to wait for tesseract: {e}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr.trim();
        if !output.status.success() && !message.is_empty() {
            return Err(OcrEngineError::Engine(message.to_string()));
        }
        if let Some(e) = pipe_error {
            return Err(OcrEngineError::Io(format!("Failed to pipe image to tesseract: {e}")));
        }
        if !output.status.success() {
            return Err(OcrEngineError::Engine(format!("tesseract exited with {}", output.status)));
        }

        (self.logger)(EngineStatus::new(STATUS_RECOGNIZING, 1.0));
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn terminate(&mut self) {
        if let Some(mut child) = self.child.take() {
            warn!("Killing unfinished tesseract process");
            let _ = child.kill();
            let _ = child.wait();
        }
        debug!("Tesseract worker terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recording_logger() -> (Logger, Arc<Mutex<Vec<EngineStatus>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        (Arc::new(move |status: EngineStatus| sink.lock().push(status)), events)
    }

    fn settings(program: &str) -> OcrSettings {
        OcrSettings {
            tesseract_path: program.to_string(),
            managed_tessdata: false,
            ..OcrSettings::default()
        }
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let engine = TesseractEngine::with_tessdata(&settings("/nonexistent/tesseract"), None);
        let (logger, _) = recording_logger();
        let mut worker = engine.create_worker(Language::English, logger).unwrap();

        let err = worker.recognize(&DataUrl::new("image/png", vec![0u8; 8])).unwrap_err();
        worker.terminate();

        assert!(matches!(err, OcrEngineError::Spawn(msg) if msg.contains("not found")));
    }

    #[test]
    fn test_command_arguments() {
        let mut s = settings("tesseract");
        s.extra_args = vec!["--psm".to_string(), "6".to_string()];
        let worker = TesseractWorker {
            program: s.tesseract_path.clone(),
            extra_args: s.extra_args.clone(),
            language: Language::Spanish,
            tessdata_dir: Some(PathBuf::from("/data/tessdata")),
            logger: recording_logger().0,
            child: None,
        };

        let cmd = worker.command();
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            ["stdin", "stdout", "-l", "spa", "--tessdata-dir", "/data/tessdata", "--psm", "6"]
        );
    }

    #[cfg(unix)]
    fn fake_tesseract(dir: &std::path::Path, script: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-tesseract");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn test_recognize_reads_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_tesseract(dir.path(), "cat > /dev/null\necho 'Hello, world'");
        let engine = TesseractEngine::with_tessdata(&settings(&program), None);
        let (logger, events) = recording_logger();

        let mut worker = engine.create_worker(Language::English, logger).unwrap();
        let text = worker.recognize(&DataUrl::new("image/png", vec![0u8; 64])).unwrap();
        worker.terminate();

        assert_eq!(text, "Hello, world\n");
        let recognizing: Vec<f32> = events
            .lock()
            .iter()
            .filter(|e| e.status == STATUS_RECOGNIZING)
            .map(|e| e.progress)
            .collect();
        assert_eq!(recognizing, vec![0.0, 1.0]);
    }

    #[cfg(unix)]
    #[test]
    fn test_recognize_reports_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_tesseract(dir.path(), "cat > /dev/null\necho 'Error opening data file' >&2\nexit 1");
        let engine = TesseractEngine::with_tessdata(&settings(&program), None);
        let (logger, _) = recording_logger();

        let mut worker = engine.create_worker(Language::German, logger).unwrap();
        let err = worker.recognize(&DataUrl::new("image/png", vec![0u8; 64])).unwrap_err();
        worker.terminate();

        assert_eq!(err, OcrEngineError::Engine("Error opening data file".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_early_exit_keeps_engine_message() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_tesseract(dir.path(), "echo \"Failed loading language 'ind'\" >&2\nexit 1");
        let engine = TesseractEngine::with_tessdata(&settings(&program), None);
        let (logger, _) = recording_logger();

        let mut worker = engine.create_worker(Language::Indonesian, logger).unwrap();
        // larger than any pipe buffer, so the write fails once tesseract is gone
        let err = worker.recognize(&DataUrl::new("image/png", vec![0u8; 1 << 20])).unwrap_err();
        worker.terminate();

        assert_eq!(err, OcrEngineError::Engine("Failed loading language 'ind'".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_early_exit_reports_pipe_error() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_tesseract(dir.path(), "exit 0");
        let engine = TesseractEngine::with_tessdata(&settings(&program), None);
        let (logger, _) = recording_logger();

        let mut worker = engine.create_worker(Language::English, logger).unwrap();
        let err = worker.recognize(&DataUrl::new("image/png", vec![0u8; 1 << 20])).unwrap_err();
        worker.terminate();

        assert!(matches!(err, OcrEngineError::Io(msg) if msg.contains("Failed to pipe image")));
    }
}
