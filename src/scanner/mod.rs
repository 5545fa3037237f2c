//! Scanner
//!
//! The view controller behind the scanner screen: an explicit state machine
//! and the controller that executes its effects.

pub mod controller;
pub mod state;

pub use controller::{ScannerController, SystemClipboard};
pub use state::{Action, NoticeKind, ScannerState, Status};
