//! Configuration models for engines, sampling and strategies.

pub mod pipeline;

pub use pipeline::{
    EngineConfig, PipelineConfig, SamplingConfig, StrategyConfig,
    DEFAULT_REACHING_TIME_THRESHOLD_MINS, MAX_REACHING_TIME_THRESHOLD_MINS,
};
