//! Dashboard UI Module
//!
//! The desktop window: a scanner screen for reading text out of images and a
//! settings screen for the configuration file.

pub mod app;
pub mod components;
pub mod state;
pub mod theme;
pub mod views;

pub use app::{run_dashboard, DashboardApp};
