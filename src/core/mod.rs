//! Engine, worker and trigger abstractions shared by every pipeline stage.

pub mod engine;
pub mod error;
pub mod job;
pub mod trigger;
mod worker;

pub use engine::{Engine, EngineStats};
pub use error::{
    AppResult, ConfigError, DeliveryError, IntakeError, JobError, QueueFullError,
    RepositoryError, StrategyError, UpstreamError,
};
pub use job::{BoxedJob, Job};
pub use trigger::{TriggerCallback, TriggerFacility};
