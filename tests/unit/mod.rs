//! Unit tests for individual components

mod config_test;
mod error_test;
mod notifier_test;
mod repository_test;
