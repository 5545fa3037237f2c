//! Messaging between background workers and the UI thread

pub mod messages;

pub use messages::WorkerEvent;
