//! Tests for the in-memory repositories

use chrono::Utc;
use ubernow::core::RepositoryError;
use ubernow::domain::{
    AddressKind, Location, Request, RequestRepository, User, UserAddress, UserRepository,
};
use ubernow::infra::{InMemoryRequestRepository, InMemoryUserRepository};

fn request() -> Request {
    Request {
        id: None,
        source: Location::new("home", 1.0, 2.0),
        destination: Location::new("airport", 3.0, 4.0),
        reaching_time: Utc::now(),
        cab: "uber".into(),
        cab_type: "uberX".into(),
        notification_addr: UserAddress {
            kind: AddressKind::Sms,
            value: "+15550100".into(),
        },
    }
}

#[test]
fn test_user_ids_increase() {
    let repo = InMemoryUserRepository::new();
    let first = repo.store(&User::new("ana")).unwrap();
    let second = repo.store(&User::new("bo")).unwrap();

    assert_eq!(first, 1);
    assert!(second > first);
    assert_eq!(repo.len(), 2);

    let stored = repo.find_by_id(second).unwrap();
    assert_eq!(stored.name, "bo");
    assert_eq!(stored.id, Some(second));
}

#[test]
fn test_unknown_user_is_not_found() {
    let repo = InMemoryUserRepository::new();
    let err = repo.find_by_id(42).unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::NotFound {
            entity: "user",
            id: 42
        }
    ));
}

#[test]
fn test_request_store_assigns_id() {
    let repo = InMemoryRequestRepository::new();
    assert!(repo.is_empty());

    let id = repo.store(&request()).unwrap();
    let stored = repo.find_by_id(id).unwrap();
    assert_eq!(stored.id, Some(id));
    assert_eq!(stored.destination.name, "airport");
    assert!(matches!(
        repo.find_by_id(id + 1),
        Err(RepositoryError::NotFound {
            entity: "request",
            ..
        })
    ));
}
