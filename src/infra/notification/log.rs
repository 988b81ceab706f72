//! Notification service that writes deliveries to the log.

use parking_lot::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::core::DeliveryError;
use crate::domain::{BookingResponse, NotificationService};

/// Logs each booking instead of contacting a real channel, and remembers what it sent.
#[derive(Debug, Default)]
pub struct LogNotifier {
    delivered: Mutex<Vec<Uuid>>,
}

impl LogNotifier {
    /// Create a notifier with an empty delivery record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Booking ids delivered so far, in delivery order.
    #[must_use]
    pub fn delivered(&self) -> Vec<Uuid> {
        self.delivered.lock().clone()
    }

    /// Number of deliveries so far.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().len()
    }
}

impl NotificationService for LogNotifier {
    fn send(&self, booking: &BookingResponse) -> Result<(), DeliveryError> {
        let addr = &booking.user_request.request.notification_addr;
        info!(
            channel = ?addr.kind,
            to = %addr.value,
            booking_id = %booking.booking_id,
            best_booking_time = %booking.best_booking_time,
            "book your cab"
        );
        self.delivered.lock().push(booking.booking_id);
        Ok(())
    }
}
