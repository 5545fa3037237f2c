//! Dashboard views

pub mod scanner;
pub mod settings;

pub use scanner::render_scanner_view;
pub use settings::render_settings_view;
