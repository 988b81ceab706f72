//! Shared utilities.

pub mod clock;
pub mod telemetry;

pub use clock::{saturating_sub, Clock, FixedClock, SystemClock};
pub use telemetry::{init_tracing, init_tracing_with, DEFAULT_LOG_FILTER};
