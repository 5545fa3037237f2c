//! Scanner view - pick or photograph an image and read its text

use egui::{RichText, Rounding};

use crate::dashboard::components::{CardStatus, StatusCard};
use crate::dashboard::state::ScannerViewState;
use crate::dashboard::theme::{card_frame, ThemeColors};
use crate::ocr::Language;
use crate::scanner::{Action, NoticeKind, ScannerController, Status};
use crate::source::{ImageHandle, ImageOrigin};

const PREVIEW_SIZE: egui::Vec2 = egui::vec2(360.0, 240.0);

/// Render the scanner view
pub fn render_scanner_view(ui: &mut egui::Ui, view_state: &mut ScannerViewState, controller: &mut ScannerController) {
    let mut actions = Vec::new();
    let mut open_path = None;

    ui.heading(RichText::new("Scanner").size(24.0).strong());
    ui.add_space(4.0);
    ui.label(
        RichText::new("Open an image or take a photo, then scan it for text")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY),
    );
    ui.add_space(16.0);

    let state = controller.state();

    let shown_uri = state
        .image
        .as_ref()
        .filter(|image| image.is_previewable())
        .map(ImageHandle::preview_uri);
    if let Some(stale) = view_state.replace_image_uri(shown_uri) {
        ui.ctx().forget_image(&stale);
    }
    let download_dir = controller.download_dir().display().to_string();

    ui.horizontal(|ui| {
        let status = match state.status {
            Status::Idle => "Ready",
            Status::Processing => "Scanning",
            Status::Completed => "Done",
            Status::Error => "Failed",
        };
        StatusCard::new("Status", status, state.status.into()).show(ui);
        StatusCard::new("Language", state.language.display_name(), CardStatus::Inactive).show(ui);
        let (source, source_status) = match &state.image {
            Some(image) => (image.label(), CardStatus::Active),
            None => ("None".to_string(), CardStatus::Inactive),
        };
        StatusCard::new("Image", source, source_status).show(ui);
    });

    if let Some(notice) = &state.notice {
        ui.add_space(12.0);
        let color = match notice.kind {
            NoticeKind::Info => ThemeColors::SUCCESS,
            NoticeKind::Error => ThemeColors::ERROR,
        };
        ui.horizontal(|ui| {
            ui.label(RichText::new(&notice.message).color(color));
            if ui.small_button("Dismiss").clicked() {
                actions.push(Action::DismissNotice);
            }
        });
    }

    ui.add_space(16.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        // Image source
        card_frame().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new("Image").size(16.0).strong());
            ui.add_space(8.0);

            let processing = state.is_processing();

            ui.horizontal(|ui| {
                ui.add_enabled_ui(!processing && !state.camera_open, |ui| {
                    let field = ui.add(
                        egui::TextEdit::singleline(&mut view_state.path_input)
                            .hint_text("Path to an image or PDF")
                            .desired_width(320.0),
                    );
                    let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Open").clicked() || submitted {
                        open_path = view_state.take_path();
                    }
                });

                ui.add_space(12.0);

                if state.camera_open {
                    if ui.add_enabled(!processing, egui::Button::new("Capture")).clicked() {
                        actions.push(Action::CaptureFrame);
                    }
                    if ui.button("Stop Camera").clicked() {
                        actions.push(Action::StopCamera);
                    }
                } else if ui.add_enabled(!processing, egui::Button::new("Use Camera")).clicked() {
                    actions.push(Action::OpenCamera);
                }
            });

            ui.label(
                RichText::new("or drop a file onto this window")
                    .size(12.0)
                    .color(ThemeColors::TEXT_MUTED),
            );
            ui.add_space(8.0);

            if state.camera_open {
                render_camera_preview(ui, view_state, controller);
            } else {
                view_state.clear_preview();
                render_image_preview(ui, controller);
            }
        });

        ui.add_space(16.0);

        // Recognition
        card_frame().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.add_enabled_ui(!state.is_processing(), |ui| {
                    let mut language = state.language;
                    egui::ComboBox::from_label("Language")
                        .selected_text(language.display_name())
                        .show_ui(ui, |ui| {
                            for option in Language::ALL {
                                ui.selectable_value(&mut language, option, option.display_name());
                            }
                        });
                    if language != state.language {
                        actions.push(Action::LanguageChanged(language));
                    }
                });

                ui.add_space(12.0);

                let scan = egui::Button::new(RichText::new("Scan").strong()).min_size(egui::vec2(96.0, 0.0));
                if ui.add_enabled(state.can_submit(), scan).clicked() {
                    actions.push(Action::Submit);
                }
            });

            if state.status != Status::Idle {
                ui.add_space(8.0);
                ui.add(
                    egui::ProgressBar::new(state.progress / 100.0)
                        .text(format!("{}%", state.progress_percent()))
                        .desired_width(360.0),
                );
                let color = match state.status {
                    Status::Error => ThemeColors::ERROR,
                    Status::Completed => ThemeColors::SUCCESS,
                    _ => ThemeColors::TEXT_SECONDARY,
                };
                ui.label(RichText::new(state.status.status_text()).color(color));
                if let (Status::Error, Some(error)) = (state.status, &state.error) {
                    ui.label(RichText::new(error).size(12.0).color(ThemeColors::TEXT_MUTED));
                }
            }
        });

        ui.add_space(16.0);

        // Result
        card_frame().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new("Result").size(16.0).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add_enabled(state.has_result(), egui::Button::new("Download")).clicked() {
                        actions.push(Action::Download);
                    }
                    if ui.add_enabled(state.has_result(), egui::Button::new("Copy")).clicked() {
                        actions.push(Action::Copy);
                    }
                });
            });
            ui.label(
                RichText::new(format!("Downloads are saved to {download_dir}"))
                    .size(11.0)
                    .color(ThemeColors::TEXT_MUTED),
            );
            ui.add_space(8.0);

            egui::Frame::none()
                .fill(ThemeColors::PAPER)
                .rounding(Rounding::same(6.0))
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    if state.has_result() {
                        for segment in state.segments() {
                            ui.label(RichText::new(segment).color(ThemeColors::INK));
                        }
                    } else {
                        ui.label(RichText::new("No text yet").italics().color(ThemeColors::TEXT_MUTED));
                    }
                });
        });
    });

    if let Some(path) = open_path {
        controller.select_file(&path);
    }
    for action in actions {
        controller.dispatch(action);
    }
}

fn render_image_preview(ui: &mut egui::Ui, controller: &ScannerController) {
    let Some(image) = &controller.state().image else {
        return;
    };

    if image.is_previewable() {
        ui.add(
            egui::Image::from_bytes(image.preview_uri(), image.data().shared_bytes())
                .max_size(PREVIEW_SIZE)
                .rounding(Rounding::same(6.0)),
        );
    } else {
        ui.label(RichText::new(format!("{} ({})", image.label(), image.data().mime())).color(ThemeColors::TEXT_SECONDARY));
    }

    if let ImageOrigin::File { path: Some(path), .. } = image.origin() {
        ui.label(
            RichText::new(path.display().to_string())
                .size(11.0)
                .color(ThemeColors::TEXT_MUTED),
        );
    }
}

fn render_camera_preview(ui: &mut egui::Ui, view_state: &mut ScannerViewState, controller: &ScannerController) {
    egui::Frame::none()
        .fill(ThemeColors::BG_DARK)
        .rounding(Rounding::same(6.0))
        .show(ui, |ui| {
            ui.set_min_size(PREVIEW_SIZE);

            if let Some(frame) = controller.preview_frame() {
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied([frame.width as usize, frame.height as usize], &frame.data);

                let same_size = view_state.preview_frame_size == Some(frame.dimensions());
                match view_state.preview_texture.as_mut().filter(|_| same_size) {
                    Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
                    None => {
                        view_state.preview_texture =
                            Some(ui.ctx().load_texture("camera_preview", color_image, egui::TextureOptions::LINEAR));
                        view_state.preview_frame_size = Some(frame.dimensions());
                    }
                }
            }

            match &view_state.preview_texture {
                Some(texture) => {
                    let tex_size = texture.size_vec2();
                    let scale = (PREVIEW_SIZE.x / tex_size.x).min(PREVIEW_SIZE.y / tex_size.y);
                    ui.centered_and_justified(|ui| {
                        ui.image((texture.id(), tex_size * scale));
                    });
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("Waiting for camera...").size(12.0).color(ThemeColors::TEXT_MUTED));
                    });
                }
            }
        });
}
