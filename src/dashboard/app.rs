//! Dashboard application entry point

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::{self, AppConfig};
use crate::dashboard::components::render_sidebar;
use crate::dashboard::state::{DashboardState, DashboardView, SettingsViewState};
use crate::dashboard::theme;
use crate::dashboard::views::{render_scanner_view, render_settings_view};
use crate::scanner::ScannerController;
use crate::source::SourcePolicy;
use crate::storage;

/// Live preview refresh interval
const CAMERA_REPAINT: Duration = Duration::from_millis(66);

/// The main dashboard application
pub struct DashboardApp {
    controller: ScannerController,
    config: AppConfig,
    config_path: PathBuf,
    dashboard_state: DashboardState,
    theme_applied: bool,
}

impl DashboardApp {
    pub fn new(controller: ScannerController, config: AppConfig, config_path: PathBuf) -> Self {
        let dashboard_state = DashboardState::new(&config);
        Self {
            controller,
            config,
            config_path,
            dashboard_state,
            theme_applied: false,
        }
    }

    /// Create eframe options for the dashboard window
    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([980.0, 760.0])
                .with_min_inner_size([720.0, 520.0])
                .with_title("OCR Scanner")
                .with_drag_and_drop(true),
            ..Default::default()
        }
    }

    /// Feed files dropped onto the window to the scanner. Only the first one
    /// is used, since there is one live image at a time.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        self.dashboard_state.current_view = DashboardView::Scanner;
        if let Some(path) = &file.path {
            self.controller.select_file(path);
        } else if let Some(bytes) = file.bytes {
            self.controller.select_bytes(&file.name, bytes);
        }
    }

    /// Persist a new configuration and apply what can change at runtime
    fn save_settings(&mut self, new_config: AppConfig) {
        let result = config::save_config(&new_config, &self.config_path)
            .and_then(|()| storage::get_download_dir(new_config.general.download_dir.as_deref()));

        match result {
            Ok(download_dir) => {
                info!("Saved configuration to {:?}", self.config_path);
                self.controller.set_download_dir(download_dir);
                self.controller.set_policy(SourcePolicy {
                    accept_pdf: new_config.general.accept_pdf,
                });
                self.controller.set_clean_output(new_config.general.clean_output);
                self.config = new_config;
                self.dashboard_state.settings = SettingsViewState::new(&self.config);
                self.dashboard_state.settings.save_status = Some(("Settings saved".to_string(), true));
            }
            Err(e) => {
                error!("Failed to save configuration: {:#}", e);
                self.dashboard_state.settings.save_status = Some((format!("Failed to save: {e}"), false));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        self.controller.poll();
        self.handle_dropped_files(ctx);

        if self.controller.state().camera_open {
            ctx.request_repaint_after(CAMERA_REPAINT);
        }

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .default_width(160.0)
            .show(ctx, |ui| {
                render_sidebar(ui, &mut self.dashboard_state.current_view);
            });

        let mut saved = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none().inner_margin(24.0).show(ui, |ui| match self.dashboard_state.current_view {
                DashboardView::Scanner => {
                    render_scanner_view(ui, &mut self.dashboard_state.scanner, &mut self.controller);
                }
                DashboardView::Settings => {
                    saved = render_settings_view(ui, &mut self.dashboard_state.settings, &self.config);
                }
            });
        });

        if let Some(new_config) = saved {
            self.save_settings(new_config);
        }
    }
}

/// Run the dashboard application
pub fn run_dashboard(app: DashboardApp) -> Result<(), eframe::Error> {
    eframe::run_native(
        "OCR Scanner",
        DashboardApp::options(),
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);

            let mut app = app;
            let ctx = cc.egui_ctx.clone();
            app.controller.set_notifier(Arc::new(move || ctx.request_repaint()));
            Ok(Box::new(app))
        }),
    )
}
