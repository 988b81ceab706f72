//! Error types for engines, stage interactors and collaborators.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Admission was rejected because the engine queue is at capacity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{engine} queue full (capacity {capacity})")]
pub struct QueueFullError {
    /// Name of the engine that rejected the job.
    pub engine: String,
    /// Fixed capacity of that engine's queue.
    pub capacity: usize,
}

/// An external collaborator call failed.
#[derive(Debug, Error)]
#[error("{service} service call failed: {source}")]
pub struct UpstreamError {
    /// Collaborator that failed (`traffic`, `cab`, ...).
    pub service: &'static str,
    /// Underlying client error.
    pub source: anyhow::Error,
}

impl UpstreamError {
    /// Wrap a client error for the named collaborator.
    pub fn new(service: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self {
            service,
            source: source.into(),
        }
    }
}

/// A best-booking-time strategy could not produce a time.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The traffic result carries no worst-case samples to plan against.
    #[error("traffic result has no worst-case samples")]
    NoSamples,
    /// Even the best-case window closed before a cab could arrive.
    #[error("booking window closed at {0}")]
    WindowClosed(DateTime<Utc>),
    /// The strategy's own collaborator call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// The notification collaborator failed to deliver.
#[derive(Debug, Error)]
#[error("notification delivery failed: {source}")]
pub struct DeliveryError {
    /// Underlying notifier error.
    pub source: anyhow::Error,
}

impl DeliveryError {
    /// Wrap a notifier error.
    pub fn new(source: impl Into<anyhow::Error>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Repository failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Storing an entity failed.
    #[error("failed to store {entity}: {source}")]
    Store {
        /// Entity kind (`user`, `request`).
        entity: &'static str,
        /// Underlying storage error.
        source: anyhow::Error,
    },
    /// No entity exists with the given id.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind (`user`, `request`).
        entity: &'static str,
        /// Requested id.
        id: u64,
    },
}

/// Failure of a single job step. Caught and logged by the worker that ran the job.
#[derive(Debug, Error)]
pub enum JobError {
    /// Traffic service failed while computing the base travel time.
    #[error("base travel time lookup failed: {0}")]
    BaseTravelTime(#[source] UpstreamError),
    /// Cab service failed while computing the base ETA.
    #[error("base cab eta lookup failed: {0}")]
    BaseEta(#[source] UpstreamError),
    /// Traffic aggregation failed.
    #[error("traffic aggregation failed: {0}")]
    TrafficAggregation(#[source] UpstreamError),
    /// The booking strategy failed.
    #[error("booking time selection failed: {0}")]
    Booking(#[source] StrategyError),
    /// The notification engine rejected the notification job.
    #[error("notification enqueue rejected: {0}")]
    NotificationQueue(#[source] QueueFullError),
    /// The notification collaborator failed.
    #[error("{0}")]
    Delivery(#[source] DeliveryError),
}

impl JobError {
    /// Short name of the failing step, for structured logs.
    #[must_use]
    pub const fn step(&self) -> &'static str {
        match self {
            Self::BaseTravelTime(_) => "base_travel_time",
            Self::BaseEta(_) => "base_eta",
            Self::TrafficAggregation(_) => "traffic_aggregation",
            Self::Booking(_) => "booking_time",
            Self::NotificationQueue(_) => "notification_enqueue",
            Self::Delivery(_) => "delivery",
        }
    }
}

/// Failures of the request intake use case.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The requested reaching time is too close to (or before) now.
    #[error("reaching time {reaching_time} is less than {threshold_mins} minutes from now")]
    ReachingTimeTooSoon {
        /// Requested reaching time.
        reaching_time: DateTime<Utc>,
        /// Configured minimum lead, in minutes.
        threshold_mins: u64,
    },
    /// Storing the request or user failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// The traffic engine rejected the request.
    #[error(transparent)]
    QueueFull(#[from] QueueFullError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// An environment variable held an unparsable value.
    #[error("environment variable {var} has invalid value `{value}`")]
    Env {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
    },
    /// JSON parse failure.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_step_names() {
        let err = JobError::BaseEta(UpstreamError::new("cab", anyhow::anyhow!("timeout")));
        assert_eq!(err.step(), "base_eta");
        assert_eq!(
            err.to_string(),
            "base cab eta lookup failed: cab service call failed: timeout"
        );

        let err = JobError::Booking(StrategyError::NoSamples);
        assert_eq!(err.step(), "booking_time");
    }

    #[test]
    fn test_strategy_error_is_transparent_over_upstream() {
        let err: StrategyError = UpstreamError::new("cab", anyhow::anyhow!("503")).into();
        assert_eq!(err.to_string(), "cab service call failed: 503");
    }
}
