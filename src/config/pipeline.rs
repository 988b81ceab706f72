//! Engine and pipeline configuration structures.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ConfigError;

/// Minimum lead, in minutes, between intake and the requested reaching time.
pub const DEFAULT_REACHING_TIME_THRESHOLD_MINS: u64 = 5;

/// Largest threshold whose length in seconds fits a `u64`.
pub const MAX_REACHING_TIME_THRESHOLD_MINS: u64 = u64::MAX / 60;

/// Sizing of one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum queued jobs before `submit` rejects.
    pub max_queue_depth: usize,
    /// Worker threads launched by `Pipeline::start`.
    pub worker_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_queue_depth: 1024,
            worker_count: num_cpus::get(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the queue capacity.
    #[must_use]
    pub const fn with_max_queue_depth(mut self, max_queue_depth: usize) -> Self {
        self.max_queue_depth = max_queue_depth;
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Validate engine configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_queue_depth == 0 {
            return Err("max_queue_depth must be greater than 0".into());
        }
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        Ok(())
    }
}

/// Stopping conditions for traffic sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Upper bound on traffic polls per request.
    pub max_samples: usize,
    /// Stop once two consecutive worst-case samples are within this many seconds.
    pub convergence_secs: u64,
    /// Pause between polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_samples: 5,
            convergence_secs: 60,
            poll_interval_ms: 0,
        }
    }
}

impl SamplingConfig {
    /// Convergence window.
    #[must_use]
    pub const fn convergence(&self) -> Duration {
        Duration::from_secs(self.convergence_secs)
    }

    /// Pause between polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Best-booking-time strategy selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Poll the cab service for the live ETA.
    #[default]
    EtaPolling,
    /// Book a fixed lead before the worst-case departure.
    FixedLead {
        /// Lead in seconds.
        lead_secs: u64,
    },
}

/// Root pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stage 1: request evaluation.
    pub traffic: EngineConfig,
    /// Stage 2: deferred booking.
    pub booking: EngineConfig,
    /// Stage 3: notification delivery.
    pub notification: EngineConfig,
    /// Traffic sampling limits.
    pub sampling: SamplingConfig,
    /// Booking strategy.
    pub strategy: StrategyConfig,
    /// Minimum minutes between intake and reaching time.
    pub reaching_time_threshold_mins: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            traffic: EngineConfig::default(),
            booking: EngineConfig::default(),
            notification: EngineConfig::default(),
            sampling: SamplingConfig::default(),
            strategy: StrategyConfig::default(),
            reaching_time_threshold_mins: DEFAULT_REACHING_TIME_THRESHOLD_MINS,
        }
    }
}

impl PipelineConfig {
    /// Validate every engine, the sampling limits and the reaching-time threshold.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, engine) in [
            ("traffic", &self.traffic),
            ("booking", &self.booking),
            ("notification", &self.notification),
        ] {
            engine
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("engine `{name}` invalid: {e}")))?;
        }
        if self.sampling.max_samples == 0 {
            return Err(ConfigError::Invalid(
                "sampling.max_samples must be greater than 0".into(),
            ));
        }
        if self.reaching_time_threshold_mins > MAX_REACHING_TIME_THRESHOLD_MINS {
            return Err(ConfigError::Invalid(format!(
                "reaching_time_threshold_mins must be at most {MAX_REACHING_TIME_THRESHOLD_MINS}"
            )));
        }
        Ok(())
    }

    /// Minimum lead between intake and reaching time.
    ///
    /// Saturates for unvalidated values above [`MAX_REACHING_TIME_THRESHOLD_MINS`].
    #[must_use]
    pub const fn reaching_time_threshold(&self) -> Duration {
        Duration::from_secs(self.reaching_time_threshold_mins.saturating_mul(60))
    }

    /// Parse pipeline configuration from a JSON string and validate.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` or `ConfigError::Invalid`.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading a `.env` file first if
    /// one exists.
    ///
    /// See [`from_lookup`](Self::from_lookup) for the variables read.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Env` for unparsable values or `ConfigError::Invalid`.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a key lookup, starting from defaults.
    ///
    /// Variables: `REACHING_TIME_THRESHOLD` (minutes),
    /// `UBERNOW_{TRAFFIC,BOOKING,NOTIFICATION}_{QUEUE_DEPTH,WORKERS}`,
    /// `UBERNOW_MAX_TRAFFIC_SAMPLES`, `UBERNOW_TRAFFIC_CONVERGENCE_SECS`,
    /// `UBERNOW_TRAFFIC_POLL_INTERVAL_MS`, and `UBERNOW_BOOKING_LEAD_SECS` (selects the
    /// fixed-lead strategy when set).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Env` for unparsable values or `ConfigError::Invalid`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(mins) = parse_var(&lookup, "REACHING_TIME_THRESHOLD")? {
            cfg.reaching_time_threshold_mins = mins;
        }

        for (prefix, engine) in [
            ("UBERNOW_TRAFFIC", &mut cfg.traffic),
            ("UBERNOW_BOOKING", &mut cfg.booking),
            ("UBERNOW_NOTIFICATION", &mut cfg.notification),
        ] {
            if let Some(depth) = parse_var(&lookup, &format!("{prefix}_QUEUE_DEPTH"))? {
                engine.max_queue_depth = depth;
            }
            if let Some(workers) = parse_var(&lookup, &format!("{prefix}_WORKERS"))? {
                engine.worker_count = workers;
            }
        }

        if let Some(samples) = parse_var(&lookup, "UBERNOW_MAX_TRAFFIC_SAMPLES")? {
            cfg.sampling.max_samples = samples;
        }
        if let Some(secs) = parse_var(&lookup, "UBERNOW_TRAFFIC_CONVERGENCE_SECS")? {
            cfg.sampling.convergence_secs = secs;
        }
        if let Some(ms) = parse_var(&lookup, "UBERNOW_TRAFFIC_POLL_INTERVAL_MS")? {
            cfg.sampling.poll_interval_ms = ms;
        }
        if let Some(lead_secs) = parse_var(&lookup, "UBERNOW_BOOKING_LEAD_SECS")? {
            cfg.strategy = StrategyConfig::FixedLead { lead_secs };
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| ConfigError::Env {
                var: var.to_string(),
                value,
            })
        })
        .transpose()
}
