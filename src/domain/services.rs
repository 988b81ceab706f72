//! Contracts of the external services the pipeline calls.
//!
//! All calls are synchronous and run on the engine worker thread that claimed the job.
//! Implementations must be safe to call from several workers at once.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::model::{BookingResponse, Location, UserRequest};
use crate::core::{DeliveryError, UpstreamError};

/// Query sent to a traffic provider.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficRequest {
    /// Route start.
    pub source: Location,
    /// Route end.
    pub destination: Location,
    /// Instant the traffic estimate is for.
    pub time_of_day: DateTime<Utc>,
}

impl TrafficRequest {
    /// Build a traffic query.
    #[must_use]
    pub const fn new(source: Location, destination: Location, time_of_day: DateTime<Utc>) -> Self {
        Self {
            source,
            destination,
            time_of_day,
        }
    }
}

/// A traffic provider's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficResponse {
    /// Expected travel time.
    pub travel_time: Duration,
    /// Latest departure that reaches the destination by `time_of_day` in light traffic.
    pub best_case: DateTime<Utc>,
    /// Latest departure that reaches the destination by `time_of_day` in heavy traffic.
    pub worst_case: DateTime<Utc>,
}

/// Traffic provider (maps, routing APIs, ...).
pub trait TrafficService: Send + Sync {
    /// Estimate travel time for the route.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the provider call fails.
    fn travel_time(&self, request: &TrafficRequest) -> Result<TrafficResponse, UpstreamError>;
}

/// Query sent to a cab provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CabRequest {
    /// Pickup location.
    pub source: Location,
    /// Drop-off location.
    pub destination: Location,
    /// Instant the booking would be made.
    pub booking_time: DateTime<Utc>,
    /// Cab provider.
    pub cab: String,
    /// Cab product.
    pub cab_type: String,
}

impl CabRequest {
    /// Build a cab query for a user request at `booking_time`.
    #[must_use]
    pub fn for_user_request(user_request: &UserRequest, booking_time: DateTime<Utc>) -> Self {
        let request = &user_request.request;
        Self {
            source: request.source.clone(),
            destination: request.destination.clone(),
            booking_time,
            cab: request.cab.clone(),
            cab_type: request.cab_type.clone(),
        }
    }
}

/// Cab availability provider.
pub trait CabService: Send + Sync {
    /// Time until a cab would reach the pickup if booked now.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the provider call fails.
    fn eta_now(&self, request: &CabRequest) -> Result<Duration, UpstreamError>;
}

/// Notification channel (e-mail, SMS, ...).
pub trait NotificationService: Send + Sync {
    /// Deliver a booking response to its user.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if delivery fails.
    fn send(&self, booking: &BookingResponse) -> Result<(), DeliveryError>;
}
