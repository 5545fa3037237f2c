//! Storage Layer
//!
//! Application directories and saving OCR results to disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "ocrscanner", "OcrScanner")
        .ok_or_else(|| anyhow::anyhow!("Could not determine application directories"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Get the directory downloaded results are written to.
///
/// Uses `configured` when set, then the user's download folder, then the
/// data directory.
pub fn get_download_dir(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = directories::UserDirs::new().and_then(|u| u.download_dir().map(Path::to_path_buf)) {
        return Ok(dir);
    }
    get_data_dir()
}

/// File name for a result saved at `epoch_ms`
pub fn result_file_name(epoch_ms: u128) -> String {
    format!("ocr_result_{epoch_ms}.txt")
}

/// Milliseconds since the Unix epoch
pub fn now_epoch_ms() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Write `text` to `dir` as a UTF-8 plain text file and return its path
pub fn save_text_result(dir: &Path, text: &str, epoch_ms: u128) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(result_file_name(epoch_ms));
    std::fs::write(&path, text.as_bytes()).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved OCR result to {:?} ({} bytes)", path, text.len());
    Ok(path)
}
