//! In-process infrastructure adapters for repositories and notification delivery.

pub mod notification;
pub mod repository;

pub use notification::LogNotifier;
pub use repository::{InMemoryRequestRepository, InMemoryUserRepository};
