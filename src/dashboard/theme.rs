//! Dashboard theme and styling
//!
//! Dark theme with a paper-white result area.

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

pub struct ThemeColors;

impl ThemeColors {
    pub const BG_DARK: Color32 = Color32::from_rgb(20, 22, 27);
    pub const BG_MEDIUM: Color32 = Color32::from_rgb(30, 33, 40);
    pub const BG_LIGHT: Color32 = Color32::from_rgb(42, 46, 55);
    pub const BG_HOVER: Color32 = Color32::from_rgb(54, 59, 70);

    /// Background of the recognized text
    pub const PAPER: Color32 = Color32::from_rgb(246, 244, 238);
    pub const INK: Color32 = Color32::from_rgb(34, 34, 38);

    pub const ACCENT: Color32 = Color32::from_rgb(64, 184, 160);
    pub const SUCCESS: Color32 = Color32::from_rgb(46, 204, 113);
    pub const WARNING: Color32 = Color32::from_rgb(255, 193, 7);
    pub const ERROR: Color32 = Color32::from_rgb(231, 76, 60);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(236, 238, 242);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 166, 178);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(104, 110, 122);

    pub const BORDER: Color32 = Color32::from_rgb(58, 63, 75);
}

/// Apply the theme to egui
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = Visuals::dark();

    visuals.window_fill = ThemeColors::BG_MEDIUM;
    visuals.panel_fill = ThemeColors::BG_DARK;
    visuals.faint_bg_color = ThemeColors::BG_LIGHT;
    visuals.extreme_bg_color = ThemeColors::BG_DARK;

    let rounding = Rounding::same(5.0);
    for (widget, fill) in [
        (&mut visuals.widgets.noninteractive, ThemeColors::BG_MEDIUM),
        (&mut visuals.widgets.inactive, ThemeColors::BG_LIGHT),
        (&mut visuals.widgets.hovered, ThemeColors::BG_HOVER),
        (&mut visuals.widgets.active, ThemeColors::ACCENT),
        (&mut visuals.widgets.open, ThemeColors::BG_HOVER),
    ] {
        widget.bg_fill = fill;
        widget.rounding = rounding;
        widget.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_PRIMARY);
    }
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_SECONDARY);

    visuals.selection.bg_fill = color_with_alpha(ThemeColors::ACCENT, 80);
    visuals.selection.stroke = Stroke::new(1.0, ThemeColors::ACCENT);
    visuals.hyperlink_color = ThemeColors::ACCENT;
    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, ThemeColors::BORDER);
    visuals.menu_rounding = rounding;

    style.visuals = visuals;
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(22.0, FontFamily::Proportional)),
    ]
    .into();

    ctx.set_style(style);
}

/// Helper to create a color with modified alpha
pub fn color_with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Standard card frame used by every panel
pub fn card_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(ThemeColors::BG_MEDIUM)
        .rounding(Rounding::same(8.0))
        .inner_margin(16.0)
}
