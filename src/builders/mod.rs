//! Builders assembling a running pipeline from configuration and collaborators.

pub mod pipeline_builder;

pub use pipeline_builder::{build_pipeline, build_pipeline_with_clock, Collaborators, Pipeline};
