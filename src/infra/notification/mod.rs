//! Notification adapters.

pub mod log;

pub use log::LogNotifier;
