//! Job types of the three pipeline stages.

use std::sync::Arc;

use tracing::info;

use super::cab::{BookingDispatcher, CabInteractor};
use super::notification::{self, NotificationInteractor};
use super::traffic::TrafficInteractor;
use crate::core::{Job, JobError, TriggerFacility};
use crate::domain::{BookingResponse, NotificationService, TrafficResult, UserRequest};
use crate::util::Clock;

/// Shared collaborators of every request-evaluation job.
#[derive(Clone)]
pub struct EvaluationContext {
    /// Traffic stage interactor.
    pub traffic: Arc<TrafficInteractor>,
    /// Cab interactor, used for the base ETA.
    pub cab: Arc<CabInteractor>,
    /// Bridge into the booking engine.
    pub dispatcher: Arc<BookingDispatcher>,
    /// Deferred callback facility.
    pub trigger: Arc<dyn TriggerFacility>,
    /// Source of "now".
    pub clock: Arc<dyn Clock>,
}

/// Stage 1: evaluate traffic for a request and schedule its booking.
pub struct UserRequestJob {
    user_request: Arc<UserRequest>,
    context: EvaluationContext,
}

impl UserRequestJob {
    /// Create an evaluation job.
    pub const fn new(user_request: Arc<UserRequest>, context: EvaluationContext) -> Self {
        Self {
            user_request,
            context,
        }
    }
}

impl Job for UserRequestJob {
    fn kind(&self) -> &'static str {
        "user_request"
    }

    fn label(&self) -> String {
        self.user_request.label()
    }

    fn execute(self: Box<Self>) -> Result<(), JobError> {
        let Self {
            user_request,
            context,
        } = *self;
        let request = &user_request.request;
        let now = context.clock.now();

        let base_travel_time = context
            .traffic
            .compute_base_travel_time(&request.source, &request.destination, now)
            .map_err(JobError::BaseTravelTime)?;
        let base_eta = context
            .cab
            .compute_base_eta(
                &request.source,
                &request.destination,
                now,
                &request.cab,
                &request.cab_type,
            )
            .map_err(JobError::BaseEta)?;
        let traffic = context
            .traffic
            .compute_final_traffic_result(base_travel_time, &user_request)
            .map_err(JobError::TrafficAggregation)?;

        let trigger_at = TrafficInteractor::compute_trigger_time(base_eta, &traffic);
        info!(
            request = %user_request.label(),
            ?base_travel_time,
            ?base_eta,
            samples = traffic.worst_case.len(),
            %trigger_at,
            "booking scheduled"
        );
        context
            .trigger
            .schedule(trigger_at, context.dispatcher.on_trigger(traffic));
        Ok(())
    }
}

/// Stage 2: choose the booking time and queue the notification.
pub struct BookingJob {
    traffic: TrafficResult,
    cab: Arc<CabInteractor>,
    notifications: Arc<NotificationInteractor>,
}

impl BookingJob {
    /// Create a booking job.
    pub const fn new(
        traffic: TrafficResult,
        cab: Arc<CabInteractor>,
        notifications: Arc<NotificationInteractor>,
    ) -> Self {
        Self {
            traffic,
            cab,
            notifications,
        }
    }
}

impl Job for BookingJob {
    fn kind(&self) -> &'static str {
        "booking"
    }

    fn label(&self) -> String {
        self.traffic.user_request.label()
    }

    fn execute(self: Box<Self>) -> Result<(), JobError> {
        let booking = self
            .cab
            .compute_booking_response(&self.traffic)
            .map_err(JobError::Booking)?;
        self.notifications
            .enqueue_for_delivery(booking)
            .map_err(JobError::NotificationQueue)
    }
}

/// Stage 3: deliver a booking notification.
pub struct NotificationJob {
    booking: BookingResponse,
    service: Arc<dyn NotificationService>,
}

impl NotificationJob {
    /// Create a notification job.
    pub fn new(booking: BookingResponse, service: Arc<dyn NotificationService>) -> Self {
        Self { booking, service }
    }
}

impl Job for NotificationJob {
    fn kind(&self) -> &'static str {
        "notification"
    }

    fn label(&self) -> String {
        format!("booking={} {}", self.booking.booking_id, self.booking.user_request.label())
    }

    fn execute(self: Box<Self>) -> Result<(), JobError> {
        notification::deliver(self.service.as_ref(), &self.booking).map_err(JobError::Delivery)
    }
}
