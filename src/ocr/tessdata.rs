//! Language data management for Tesseract
//!
//! Handles downloading, caching and bookkeeping of `<code>.traineddata` files.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::ocr::Language;

/// Environment variable that forbids network downloads
pub const OFFLINE_ENV: &str = "OCR_SCANNER_OFFLINE";

/// Smallest file accepted as real language data; anything below is a failed or HTML download
const MIN_TRAINEDDATA_BYTES: u64 = 100_000;

/// Manifest tracking downloaded language data
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TessdataManifest {
    pub version: String,
    pub languages: Vec<LanguageDataInfo>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LanguageDataInfo {
    pub code: String,
    pub filename: String,
    pub size_bytes: u64,
    pub sha256: String,
    pub source_url: String,
    pub downloaded_at: u64,
}

impl Default for TessdataManifest {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            languages: Vec::new(),
        }
    }
}

/// Cache of language data files in the app data directory
#[derive(Debug, Clone)]
pub struct TessdataStore {
    dir: PathBuf,
    base_url: String,
}

impl TessdataStore {
    /// Store under the application data directory
    pub fn new(base_url: &str) -> Result<Self> {
        let dir = crate::storage::get_data_dir()?.join("tessdata");
        Self::with_dir(dir, base_url)
    }

    /// Store with a custom directory
    pub fn with_dir(dir: PathBuf, base_url: &str) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create tessdata directory {:?}", dir))?;
        Ok(Self {
            dir,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Directory passed to tesseract as `--tessdata-dir`
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn traineddata_path(&self, language: Language) -> PathBuf {
        self.dir.join(format!("{}.traineddata", language.code()))
    }

    pub fn download_url(&self, language: Language) -> String {
        format!("{}/{}.traineddata", self.base_url, language.code())
    }

    /// Check if the language data is already cached
    pub fn is_available(&self, language: Language) -> bool {
        std::fs::metadata(self.traineddata_path(language))
            .map(|m| m.is_file() && m.len() >= MIN_TRAINEDDATA_BYTES)
            .unwrap_or(false)
    }

    /// Languages whose data is cached
    pub fn available_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|&lang| self.is_available(lang))
            .collect()
    }

    /// Download the language data if it is not cached yet.
    ///
    /// `on_progress` receives downloaded bytes and the total size when known.
    pub fn ensure<F>(&self, language: Language, mut on_progress: F) -> Result<PathBuf>
    where
        F: FnMut(u64, Option<u64>),
    {
        let path = self.traineddata_path(language);
        if self.is_available(language) {
            debug!("Language data for {} already cached at {:?}", language.code(), path);
            return Ok(path);
        }

        let url = self.download_url(language);
        if std::env::var_os(OFFLINE_ENV).is_some() {
            anyhow::bail!(
                "Offline mode: cannot download language data. Download {} manually and place it at {:?}",
                url,
                path
            );
        }

        info!("Downloading {} language data from {}", language, url);

        let rt = Runtime::new().context("Failed to create tokio runtime")?;
        let sha256 = rt.block_on(self.download_file_async(&url, &path, &mut on_progress))?;

        if !self.is_available(language) {
            anyhow::bail!("Download completed but the language data looks truncated");
        }

        self.update_manifest(language, &url, sha256)?;
        info!("Language data for {} ready", language);
        Ok(path)
    }

    /// Stream `url` into `path` through a temp file, returning the SHA-256
    async fn download_file_async<F>(&self, url: &str, path: &Path, on_progress: &mut F) -> Result<String>
    where
        F: FnMut(u64, Option<u64>),
    {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;

        let response = client
            .get(url)
            .send()
            .await
            .context("Failed to send download request")?;

        if !response.status().is_success() {
            anyhow::bail!("Download failed with status {}: {}", response.status(), url);
        }

        let total_size = response.content_length();
        debug!("Download size: {:?} bytes", total_size);

        let temp_path = path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).context("Failed to create temp file")?;

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Error reading download stream")?;
            file.write_all(&chunk).context("Failed to write to temp file")?;
            hasher.update(&chunk);
            downloaded += chunk.len() as u64;
            on_progress(downloaded, total_size);
        }

        file.flush().context("Failed to flush temp file")?;
        drop(file);

        std::fs::rename(&temp_path, path).context("Failed to move downloaded file to final location")?;

        Ok(format!("{:x}", hasher.finalize()))
    }

    fn update_manifest(&self, language: Language, url: &str, sha256: String) -> Result<()> {
        let mut manifest = self.load_manifest().unwrap_or_default();
        let path = self.traineddata_path(language);
        let size_bytes = std::fs::metadata(&path)?.len();

        let info = LanguageDataInfo {
            code: language.code().to_string(),
            filename: format!("{}.traineddata", language.code()),
            size_bytes,
            sha256,
            source_url: url.to_string(),
            downloaded_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };

        manifest.languages.retain(|l| l.code != info.code);
        manifest.languages.push(info);
        self.save_manifest(&manifest)
    }

    /// Load the manifest, or an empty one if none exists yet
    pub fn load_manifest(&self) -> Result<TessdataManifest> {
        let manifest_path = self.dir.join("manifest.json");
        if manifest_path.exists() {
            let content = std::fs::read_to_string(&manifest_path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(TessdataManifest::default())
        }
    }

    pub fn save_manifest(&self, manifest: &TessdataManifest) -> Result<()> {
        let content = serde_json::to_string_pretty(manifest)?;
        std::fs::write(self.dir.join("manifest.json"), content)?;
        Ok(())
    }
}
