//! Plain domain records passed between pipeline stages.
//!
//! Construction and validation of these records belong to the callers; the pipeline only
//! reads them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned by the user repository.
pub type UserId = u64;
/// Identifier assigned by the request repository.
pub type RequestId = u64;

/// A named point on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name, may be empty.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Location {
    /// Create a location.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Channel a user wants to be notified on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    /// E-mail address.
    Email,
    /// Phone number for SMS.
    Sms,
    /// Web push endpoint.
    Web,
}

/// Where a notification is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAddress {
    /// Delivery channel.
    pub kind: AddressKind,
    /// Channel-specific address.
    pub value: String,
}

/// A user of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Repository id, `None` until stored.
    pub id: Option<UserId>,
    /// Display name.
    pub name: String,
}

impl User {
    /// Create an unsaved user.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// A trip the user needs to be on time for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Repository id, `None` until stored.
    pub id: Option<RequestId>,
    /// Pickup location.
    pub source: Location,
    /// Drop-off location.
    pub destination: Location,
    /// Instant the user must reach the destination by.
    pub reaching_time: DateTime<Utc>,
    /// Cab provider, e.g. `uber`.
    pub cab: String,
    /// Cab product, e.g. `uberGo`.
    pub cab_type: String,
    /// Where to send the booking notification.
    pub notification_addr: UserAddress,
}

/// A request bound to the user who made it. Shared by every job derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRequest {
    /// Requesting user.
    pub user: User,
    /// The trip.
    pub request: Request,
}

impl UserRequest {
    /// Pair a user with a request.
    #[must_use]
    pub const fn new(user: User, request: Request) -> Self {
        Self { user, request }
    }

    /// Short identification for log fields.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "user={} request={}",
            self.user.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            self.request.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        )
    }
}

/// Aggregated output of the traffic stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficResult {
    /// Originating request.
    pub user_request: Arc<UserRequest>,
    /// Single-point travel time estimate taken when the request was evaluated.
    pub base_travel_time: Duration,
    /// Travel time of every sample.
    pub travel_times: Vec<Duration>,
    /// Latest departure per sample that arrives on time under best-case traffic.
    pub best_case: Vec<DateTime<Utc>>,
    /// Latest departure per sample that arrives on time under worst-case traffic.
    pub worst_case: Vec<DateTime<Utc>>,
}

impl TrafficResult {
    /// A result with no samples yet.
    #[must_use]
    pub const fn new(user_request: Arc<UserRequest>, base_travel_time: Duration) -> Self {
        Self {
            user_request,
            base_travel_time,
            travel_times: Vec::new(),
            best_case: Vec::new(),
            worst_case: Vec::new(),
        }
    }

    /// Earliest worst-case departure: leaving by then is on time in every sample.
    #[must_use]
    pub fn earliest_worst_case(&self) -> Option<DateTime<Utc>> {
        self.worst_case.iter().min().copied()
    }

    /// Latest best-case departure: leaving after it is late in every sample.
    #[must_use]
    pub fn latest_best_case(&self) -> Option<DateTime<Utc>> {
        self.best_case.iter().max().copied()
    }
}

/// Final output of the booking stage, delivered to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingResponse {
    /// Unique booking id.
    pub booking_id: Uuid,
    /// Originating request.
    pub user_request: Arc<UserRequest>,
    /// When the user should book the cab.
    pub best_booking_time: DateTime<Utc>,
}

impl BookingResponse {
    /// Create a response with a fresh booking id.
    #[must_use]
    pub fn new(user_request: Arc<UserRequest>, best_booking_time: DateTime<Utc>) -> Self {
        Self {
            booking_id: Uuid::new_v4(),
            user_request,
            best_booking_time,
        }
    }
}
