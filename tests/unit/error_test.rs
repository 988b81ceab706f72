//! Tests for error types and their messages

use ubernow::core::{
    DeliveryError, IntakeError, JobError, QueueFullError, RepositoryError, StrategyError,
    UpstreamError,
};

#[test]
fn test_queue_full_error_display() {
    let err = QueueFullError {
        engine: "booking".into(),
        capacity: 64,
    };
    assert_eq!(err.to_string(), "booking queue full (capacity 64)");
}

#[test]
fn test_job_error_steps() {
    let upstream = || UpstreamError::new("traffic", anyhow::anyhow!("timeout"));
    let cases = [
        (JobError::BaseTravelTime(upstream()), "base_travel_time"),
        (JobError::TrafficAggregation(upstream()), "traffic_aggregation"),
        (JobError::Booking(StrategyError::NoSamples), "booking_time"),
        (
            JobError::NotificationQueue(QueueFullError {
                engine: "notification".into(),
                capacity: 1,
            }),
            "notification_enqueue",
        ),
        (
            JobError::Delivery(DeliveryError::new(anyhow::anyhow!("smtp down"))),
            "delivery",
        ),
    ];
    for (err, step) in cases {
        assert_eq!(err.step(), step);
    }
}

#[test]
fn test_job_error_keeps_source_chain() {
    let err = JobError::TrafficAggregation(UpstreamError::new(
        "traffic",
        anyhow::anyhow!("rate limited"),
    ));
    let source = std::error::Error::source(&err).expect("source");
    assert_eq!(source.to_string(), "traffic service call failed: rate limited");
}

#[test]
fn test_intake_error_conversions() {
    let err: IntakeError = RepositoryError::NotFound {
        entity: "user",
        id: 4,
    }
    .into();
    assert_eq!(err.to_string(), "user 4 not found");

    let err: IntakeError = QueueFullError {
        engine: "traffic".into(),
        capacity: 2,
    }
    .into();
    assert!(matches!(err, IntakeError::QueueFull(_)));
}

#[test]
fn test_delivery_error_display() {
    let err = DeliveryError::new(anyhow::anyhow!("mailbox full"));
    assert_eq!(err.to_string(), "notification delivery failed: mailbox full");
}
