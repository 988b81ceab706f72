//! Tests for configuration parsing and validation

use std::time::Duration;

use ubernow::config::{
    EngineConfig, PipelineConfig, SamplingConfig, StrategyConfig, MAX_REACHING_TIME_THRESHOLD_MINS,
};
use ubernow::core::ConfigError;

#[test]
fn test_engine_config_validation() {
    assert!(EngineConfig::new()
        .with_max_queue_depth(10)
        .with_worker_count(2)
        .validate()
        .is_ok());
    assert!(EngineConfig::new().with_max_queue_depth(0).validate().is_err());
    assert!(EngineConfig::new().with_worker_count(0).validate().is_err());
}

#[test]
fn test_pipeline_defaults() {
    let cfg = PipelineConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.reaching_time_threshold(), Duration::from_secs(300));
    assert_eq!(cfg.strategy, StrategyConfig::EtaPolling);
    assert_eq!(cfg.traffic.worker_count, num_cpus::get());
}

#[test]
fn test_pipeline_from_json_partial() {
    let cfg = PipelineConfig::from_json_str(
        r#"{
            "booking": { "max_queue_depth": 8, "worker_count": 2 },
            "sampling": { "max_samples": 3 },
            "strategy": { "fixed_lead": { "lead_secs": 120 } },
            "reaching_time_threshold_mins": 10
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.booking.max_queue_depth, 8);
    assert_eq!(cfg.booking.worker_count, 2);
    assert_eq!(cfg.traffic, EngineConfig::default());
    assert_eq!(
        cfg.sampling,
        SamplingConfig {
            max_samples: 3,
            ..SamplingConfig::default()
        }
    );
    assert_eq!(cfg.strategy, StrategyConfig::FixedLead { lead_secs: 120 });
    assert_eq!(cfg.reaching_time_threshold(), Duration::from_secs(600));
}

#[test]
fn test_pipeline_from_json_rejects_zero_samples() {
    let err =
        PipelineConfig::from_json_str(r#"{ "sampling": { "max_samples": 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_pipeline_from_json_rejects_zero_workers() {
    let err = PipelineConfig::from_json_str(r#"{ "notification": { "worker_count": 0 } }"#)
        .unwrap_err();
    assert!(err.to_string().contains("notification"));
}

#[test]
fn test_pipeline_from_json_malformed() {
    let err = PipelineConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_from_lookup_empty_is_default() {
    let cfg = PipelineConfig::from_lookup(|_| None).unwrap();
    assert_eq!(cfg, PipelineConfig::default());
}

#[test]
fn test_from_lookup_sampling_vars() {
    let cfg = PipelineConfig::from_lookup(|key| match key {
        "UBERNOW_MAX_TRAFFIC_SAMPLES" => Some("9".into()),
        "UBERNOW_TRAFFIC_CONVERGENCE_SECS" => Some(" 30 ".into()),
        "UBERNOW_TRAFFIC_POLL_INTERVAL_MS" => Some("250".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(cfg.sampling.max_samples, 9);
    assert_eq!(cfg.sampling.convergence(), Duration::from_secs(30));
    assert_eq!(cfg.sampling.poll_interval(), Duration::from_millis(250));
}

#[test]
fn test_from_lookup_rejects_oversized_threshold() {
    let err = PipelineConfig::from_lookup(|k| {
        (k == "REACHING_TIME_THRESHOLD").then(|| u64::MAX.to_string())
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("reaching_time_threshold_mins")));

    let cfg = PipelineConfig::from_lookup(|k| {
        (k == "REACHING_TIME_THRESHOLD").then(|| MAX_REACHING_TIME_THRESHOLD_MINS.to_string())
    })
    .unwrap();
    assert_eq!(
        cfg.reaching_time_threshold(),
        Duration::from_secs(MAX_REACHING_TIME_THRESHOLD_MINS * 60)
    );
}

#[test]
fn test_unvalidated_threshold_saturates() {
    let cfg = PipelineConfig {
        reaching_time_threshold_mins: u64::MAX,
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().is_err());
    assert_eq!(cfg.reaching_time_threshold(), Duration::from_secs(u64::MAX));
}
