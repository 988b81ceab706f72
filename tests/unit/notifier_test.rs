//! Tests for the log-backed notifier and the notification interactor

use std::sync::Arc;

use chrono::Utc;
use ubernow::core::Engine;
use ubernow::domain::{
    AddressKind, BookingResponse, Location, NotificationService, Request, User, UserAddress,
    UserRequest,
};
use ubernow::infra::LogNotifier;
use ubernow::usecases::NotificationInteractor;

fn booking() -> BookingResponse {
    let user_request = Arc::new(UserRequest::new(
        User::new("ana"),
        Request {
            id: Some(3),
            source: Location::new("home", 0.0, 0.0),
            destination: Location::new("office", 0.0, 0.0),
            reaching_time: Utc::now(),
            cab: "uber".into(),
            cab_type: "uberGo".into(),
            notification_addr: UserAddress {
                kind: AddressKind::Email,
                value: "ana@example.com".into(),
            },
        },
    ));
    BookingResponse::new(user_request, Utc::now())
}

#[test]
fn test_log_notifier_records_deliveries() {
    let notifier = LogNotifier::new();
    let first = booking();
    let second = booking();
    notifier.send(&first).unwrap();
    notifier.send(&second).unwrap();

    assert_eq!(notifier.delivered(), vec![first.booking_id, second.booking_id]);
    assert_ne!(first.booking_id, second.booking_id);
}

#[test]
fn test_enqueue_for_delivery_reports_full_queue() {
    let engine = Arc::new(Engine::new("notification", 1).unwrap());
    let notifier = Arc::new(LogNotifier::new());
    let interactor = NotificationInteractor::new(Arc::clone(&engine), notifier.clone());

    interactor.enqueue_for_delivery(booking()).unwrap();
    let err = interactor.enqueue_for_delivery(booking()).unwrap_err();
    assert_eq!(err.engine, "notification");
    assert_eq!(engine.len(), 1);
    assert_eq!(notifier.delivered_count(), 0);
}

#[test]
fn test_deliver_runs_inline() {
    let engine = Arc::new(Engine::new("notification", 1).unwrap());
    let notifier = Arc::new(LogNotifier::new());
    let interactor = NotificationInteractor::new(Arc::clone(&engine), notifier.clone());

    interactor.deliver(&booking()).unwrap();
    assert_eq!(notifier.delivered_count(), 1);
    assert!(engine.is_empty());
}
