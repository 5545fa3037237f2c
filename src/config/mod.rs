//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ocr::Language;

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,
    /// OCR engine settings
    pub ocr: OcrSettings,
    /// Camera settings
    pub camera: CameraSettings,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Language selected when the app starts
    pub default_language: Language,
    /// Accept PDF files in addition to images
    pub accept_pdf: bool,
    /// Run the noise-stripping post-processor on OCR output
    pub clean_output: bool,
    /// Where "Download as .txt" writes files (defaults to the user's Downloads folder)
    pub download_dir: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_language: Language::English,
            accept_pdf: true,
            clean_output: true,
            download_dir: None,
        }
    }
}

/// Tesseract settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Path or name of the tesseract executable
    pub tesseract_path: String,
    /// Download language data into the app data directory instead of using the system tessdata
    pub managed_tessdata: bool,
    /// Base URL that serves `<code>.traineddata` files
    pub tessdata_url: String,
    /// Extra arguments appended to every tesseract invocation
    pub extra_args: Vec<String>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_path: "tesseract".to_string(),
            managed_tessdata: true,
            tessdata_url: "https://github.com/tesseract-ocr/tessdata_fast/raw/main".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Path or name of the ffmpeg executable
    pub ffmpeg_path: String,
    /// ffmpeg input format (v4l2, avfoundation, dshow)
    pub input_format: String,
    /// Device identifier understood by the input format
    pub device: String,
    /// Capture width in pixels
    pub width: u32,
    /// Capture height in pixels
    pub height: u32,
    /// Capture frame rate
    pub fps: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        let (input_format, device) = if cfg!(target_os = "macos") {
            ("avfoundation", "0")
        } else if cfg!(target_os = "windows") {
            ("dshow", "video=Integrated Camera")
        } else {
            ("v4l2", "/dev/video0")
        };

        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            input_format: input_format.to_string(),
            device: device.to_string(),
            width: 640,
            height: 480,
            fps: 15,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.general.default_language, Language::English);
        assert!(config.general.accept_pdf);
        assert!(config.general.clean_output);
        assert!(config.general.download_dir.is_none());

        assert_eq!(config.ocr.tesseract_path, "tesseract");
        assert!(config.ocr.managed_tessdata);
        assert!(config.ocr.tessdata_url.starts_with("https://"));
        assert!(config.ocr.extra_args.is_empty());

        assert_eq!(config.camera.ffmpeg_path, "ffmpeg");
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.camera.height, 480);
        assert_eq!(config.camera.fps, 15);
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.general.default_language = Language::German;
        config.general.download_dir = Some(PathBuf::from("/tmp/scans"));
        config.ocr.extra_args = vec!["--psm".to_string(), "6".to_string()];
        config.camera.device = "/dev/video2".to_string();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [general]
            default_language = "fra"

            [camera]
            width = 1280
            "#,
        )
        .unwrap();

        assert_eq!(parsed.general.default_language, Language::French);
        assert!(parsed.general.clean_output);
        assert_eq!(parsed.camera.width, 1280);
        assert_eq!(parsed.camera.height, 480);
        assert_eq!(parsed.ocr, OcrSettings::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.general.accept_pdf = false;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert!(!loaded.general.accept_pdf);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [general]
            default_language = "klingon"
            "#,
        );
        assert!(result.is_err());
    }
}
