//! Runtime adapters for the trigger facility.

#[cfg(feature = "tokio-runtime")]
pub mod tokio_trigger;

#[cfg(feature = "tokio-runtime")]
pub use tokio_trigger::TokioTrigger;
