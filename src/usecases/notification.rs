//! Stage 3: notification delivery.

use std::sync::Arc;

use super::jobs::NotificationJob;
use crate::core::{DeliveryError, Engine, QueueFullError};
use crate::domain::{BookingResponse, NotificationService};

/// Queues booking notifications and delivers them.
pub struct NotificationInteractor {
    engine: Arc<Engine>,
    service: Arc<dyn NotificationService>,
}

impl NotificationInteractor {
    /// Create an interactor feeding `engine` and delivering through `service`.
    pub fn new(engine: Arc<Engine>, service: Arc<dyn NotificationService>) -> Self {
        Self { engine, service }
    }

    /// Wrap `booking` in a notification job and submit it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFullError`] when the notification engine is full.
    pub fn enqueue_for_delivery(&self, booking: BookingResponse) -> Result<(), QueueFullError> {
        self.engine
            .submit(NotificationJob::new(booking, Arc::clone(&self.service)))
    }

    /// Deliver `booking` on the calling thread.
    ///
    /// # Errors
    ///
    /// Propagates the service's [`DeliveryError`].
    pub fn deliver(&self, booking: &BookingResponse) -> Result<(), DeliveryError> {
        deliver(self.service.as_ref(), booking)
    }
}

pub(super) fn deliver(
    service: &dyn NotificationService,
    booking: &BookingResponse,
) -> Result<(), DeliveryError> {
    service.send(booking)?;
    tracing::info!(
        booking_id = %booking.booking_id,
        request = %booking.user_request.label(),
        best_booking_time = %booking.best_booking_time,
        "booking notification delivered"
    );
    Ok(())
}
