//! OCR Scanner - read text out of images and camera photos
//!
//! A desktop front-end for the Tesseract OCR engine. Open an image file or
//! take a photo, scan it, then copy or download the recognized text.

mod config;
mod dashboard;
mod ocr;
mod postprocess;
mod scanner;
mod shared;
mod source;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::dashboard::DashboardApp;
use crate::ocr::{Language, TessdataStore, TesseractEngine};
use crate::scanner::{ScannerController, ScannerState, SystemClipboard};
use crate::source::{FfmpegCamera, SourcePolicy};

/// OCR Scanner - extract text from images
#[derive(Parser, Debug)]
#[command(name = "ocr-scanner")]
#[command(about = "Open or photograph an image and extract its text with Tesseract")]
struct Args {
    /// Image or PDF to load on startup
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Recognition language (eng, ind, fra, spa, deu)
    #[arg(short, long)]
    language: Option<Language>,

    /// Configuration file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List supported languages and exit
    #[arg(long)]
    list_languages: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => storage::get_config_dir()?.join("config.toml"),
    };
    let config = load_or_create_config(&config_path);

    if args.list_languages {
        list_languages(&config);
        return Ok(());
    }

    info!("OCR Scanner starting...");

    let language = args.language.unwrap_or(config.general.default_language);
    let engine = TesseractEngine::new(&config.ocr).context("Failed to set up the OCR engine")?;
    let download_dir = storage::get_download_dir(config.general.download_dir.as_deref())?;
    info!("Results will be saved to {:?}", download_dir);

    let mut controller = ScannerController::new(
        ScannerState::new(language, config.general.clean_output),
        Arc::new(engine),
        Box::new(FfmpegCamera::new(config.camera.clone())),
        Box::new(SystemClipboard::default()),
        download_dir,
        SourcePolicy {
            accept_pdf: config.general.accept_pdf,
        },
    );

    if let Some(image) = &args.image {
        controller.select_file(image);
    }

    if let Err(e) = dashboard::run_dashboard(DashboardApp::new(controller, config, config_path)) {
        tracing::error!("Dashboard error: {}", e);
    }

    info!("OCR Scanner shutdown complete");
    Ok(())
}

/// Print the supported languages, marking those with downloaded language data
fn list_languages(config: &AppConfig) {
    let cached = if config.ocr.managed_tessdata {
        TessdataStore::new(&config.ocr.tessdata_url)
            .map(|store| store.available_languages())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    println!("Supported languages:");
    for language in Language::ALL {
        let marker = if cached.contains(&language) { " (downloaded)" } else { "" };
        println!("  {}  {}{}", language.code(), language.display_name(), marker);
    }
}

/// Load configuration from file, writing the defaults if none exists yet
fn load_or_create_config(path: &Path) -> AppConfig {
    if path.exists() {
        match config::load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => warn!("Ignoring invalid configuration {:?}: {:#}", path, e),
        }
        return AppConfig::default();
    }

    let config = AppConfig::default();
    match config::save_config(&config, path) {
        Ok(()) => info!("Created default configuration at {:?}", path),
        Err(e) => warn!("Could not write default configuration: {:#}", e),
    }
    config
}
