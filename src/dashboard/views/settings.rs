//! Settings view - Application configuration

use egui::RichText;

use crate::config::AppConfig;
use crate::dashboard::state::{SettingsSection, SettingsViewState};
use crate::dashboard::theme::{card_frame, ThemeColors};
use crate::ocr::Language;

/// Render the settings view. Returns the configuration to save when the
/// user presses Save.
pub fn render_settings_view(ui: &mut egui::Ui, view_state: &mut SettingsViewState, current: &AppConfig) -> Option<AppConfig> {
    let mut save = false;

    ui.heading(RichText::new("Settings").size(24.0).strong());
    ui.add_space(8.0);
    ui.label(
        RichText::new("Configure the OCR engine, camera and output")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY),
    );
    ui.add_space(24.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        card_frame().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            if !section_header(ui, &mut view_state.expanded_section, SettingsSection::General, "General") {
                return;
            }
            let general = &mut view_state.draft.general;

            ui.horizontal(|ui| {
                ui.label("Default language:");
                egui::ComboBox::from_id_salt("default_language")
                    .selected_text(general.default_language.display_name())
                    .show_ui(ui, |ui| {
                        for language in Language::ALL {
                            ui.selectable_value(&mut general.default_language, language, language.display_name());
                        }
                    });
            });
            ui.checkbox(&mut general.accept_pdf, "Accept PDF files");
            ui.checkbox(&mut general.clean_output, "Strip noise characters from results");
            ui.horizontal(|ui| {
                ui.label("Download folder:");
                ui.add(
                    egui::TextEdit::singleline(&mut view_state.download_dir_input)
                        .hint_text("Downloads")
                        .desired_width(320.0),
                );
            });
        });

        ui.add_space(16.0);

        card_frame().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            if !section_header(ui, &mut view_state.expanded_section, SettingsSection::Ocr, "OCR Engine") {
                return;
            }
            let ocr = &mut view_state.draft.ocr;

            ui.horizontal(|ui| {
                ui.label("Tesseract executable:");
                ui.text_edit_singleline(&mut ocr.tesseract_path);
            });
            ui.checkbox(&mut ocr.managed_tessdata, "Download language data automatically");
            ui.add_enabled_ui(ocr.managed_tessdata, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Language data URL:");
                    ui.add(egui::TextEdit::singleline(&mut ocr.tessdata_url).desired_width(360.0));
                });
            });
            ui.horizontal(|ui| {
                ui.label("Extra arguments:");
                ui.add(
                    egui::TextEdit::singleline(&mut view_state.extra_args_input)
                        .hint_text("--psm 6")
                        .desired_width(240.0),
                );
            });
        });

        ui.add_space(16.0);

        card_frame().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            if !section_header(ui, &mut view_state.expanded_section, SettingsSection::Camera, "Camera") {
                return;
            }
            let camera = &mut view_state.draft.camera;

            egui::Grid::new("camera_settings").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                ui.label("ffmpeg executable:");
                ui.text_edit_singleline(&mut camera.ffmpeg_path);
                ui.end_row();

                ui.label("Input format:");
                ui.text_edit_singleline(&mut camera.input_format);
                ui.end_row();

                ui.label("Device:");
                ui.text_edit_singleline(&mut camera.device);
                ui.end_row();

                ui.label("Resolution:");
                ui.horizontal(|ui| {
                    ui.add(egui::DragValue::new(&mut camera.width).range(16..=3840));
                    ui.label("x");
                    ui.add(egui::DragValue::new(&mut camera.height).range(16..=2160));
                });
                ui.end_row();

                ui.label("Frame rate:");
                ui.add(egui::Slider::new(&mut camera.fps, 1..=60).suffix(" fps"));
                ui.end_row();
            });
        });

        ui.add_space(20.0);

        ui.horizontal(|ui| {
            let dirty = view_state.finished_draft() != *current;
            if ui.add_enabled(dirty, egui::Button::new("Save")).clicked() {
                save = true;
            }
            if ui.add_enabled(dirty, egui::Button::new("Revert")).clicked() {
                *view_state = SettingsViewState::new(current);
            }
            if let Some((message, ok)) = &view_state.save_status {
                let color = if *ok { ThemeColors::SUCCESS } else { ThemeColors::ERROR };
                ui.label(RichText::new(message).color(color));
            }
        });
        ui.label(
            RichText::new("OCR engine and camera changes apply after a restart.")
                .size(12.0)
                .color(ThemeColors::TEXT_MUTED),
        );
    });

    save.then(|| view_state.finished_draft())
}

/// Clickable section title. Returns whether the section is expanded.
fn section_header(ui: &mut egui::Ui, expanded: &mut Option<SettingsSection>, section: SettingsSection, title: &str) -> bool {
    let is_expanded = *expanded == Some(section);
    let response = ui
        .horizontal(|ui| {
            let arrow = if is_expanded { "v" } else { ">" };
            ui.label(RichText::new(arrow).size(12.0).color(ThemeColors::TEXT_MUTED));
            ui.add_space(8.0);
            ui.heading(RichText::new(title).size(16.0));
        })
        .response;

    if response.interact(egui::Sense::click()).clicked() {
        *expanded = if is_expanded { None } else { Some(section) };
    }

    if is_expanded {
        ui.add_space(12.0);
        ui.separator();
        ui.add_space(8.0);
    }
    is_expanded
}
