//! Dashboard view state management

use crate::config::AppConfig;

/// Current view in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardView {
    #[default]
    Scanner,
    Settings,
}

impl DashboardView {
    pub const ALL: [DashboardView; 2] = [DashboardView::Scanner, DashboardView::Settings];

    /// Get the display name for this view
    pub fn name(&self) -> &'static str {
        match self {
            DashboardView::Scanner => "Scanner",
            DashboardView::Settings => "Settings",
        }
    }

    /// Get the icon character for this view
    pub fn icon(&self) -> &'static str {
        match self {
            DashboardView::Scanner => "S",
            DashboardView::Settings => "C",
        }
    }
}

/// Scanner view state
#[derive(Default)]
pub struct ScannerViewState {
    /// Contents of the file path field
    pub path_input: String,
    /// Live camera preview
    pub preview_texture: Option<egui::TextureHandle>,
    pub preview_frame_size: Option<(u32, u32)>,
    /// URI of the image preview egui currently caches
    pub image_uri: Option<String>,
}

impl ScannerViewState {
    /// Take the entered path, if any
    pub fn take_path(&mut self) -> Option<std::path::PathBuf> {
        let path = self.path_input.trim().trim_matches('"');
        if path.is_empty() {
            return None;
        }
        let path = std::path::PathBuf::from(path);
        self.path_input.clear();
        Some(path)
    }

    /// Record the URI now on screen. Returns the previous one once it is
    /// replaced, so its cached bytes and texture can be dropped.
    pub fn replace_image_uri(&mut self, current: Option<String>) -> Option<String> {
        if self.image_uri == current {
            return None;
        }
        std::mem::replace(&mut self.image_uri, current)
    }

    pub fn clear_preview(&mut self) {
        self.preview_texture = None;
        self.preview_frame_size = None;
    }
}

/// Collapsible settings sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSection {
    General,
    Ocr,
    Camera,
}

/// Settings view state: an editable copy of the configuration
pub struct SettingsViewState {
    pub expanded_section: Option<SettingsSection>,
    pub draft: AppConfig,
    pub download_dir_input: String,
    pub extra_args_input: String,
    /// Outcome of the last save, `true` on success
    pub save_status: Option<(String, bool)>,
}

impl SettingsViewState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            expanded_section: Some(SettingsSection::General),
            draft: config.clone(),
            download_dir_input: config
                .general
                .download_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            extra_args_input: config.ocr.extra_args.join(" "),
            save_status: None,
        }
    }

    /// Draft with the free-text fields folded back in
    pub fn finished_draft(&self) -> AppConfig {
        let mut config = self.draft.clone();
        let dir = self.download_dir_input.trim();
        config.general.download_dir = (!dir.is_empty()).then(|| dir.into());
        config.ocr.extra_args = self.extra_args_input.split_whitespace().map(str::to_string).collect();
        config
    }
}

/// Complete dashboard state
pub struct DashboardState {
    pub current_view: DashboardView,
    pub scanner: ScannerViewState,
    pub settings: SettingsViewState,
}

impl DashboardState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            current_view: DashboardView::default(),
            scanner: ScannerViewState::default(),
            settings: SettingsViewState::new(config),
        }
    }
}
