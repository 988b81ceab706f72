//! Request intake: validation, persistence and stage-1 submission.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::jobs::{EvaluationContext, UserRequestJob};
use crate::core::{Engine, IntakeError};
use crate::domain::{
    Location, Request, RequestRepository, User, UserAddress, UserRepository, UserRequest,
};

/// Raw intake record as received from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRequestIntake {
    /// Requesting user's name.
    pub user_name: String,
    /// Pickup location.
    pub source: Location,
    /// Drop-off location.
    pub destination: Location,
    /// Arrival deadline.
    pub reaching_time: DateTime<Utc>,
    /// Cab provider.
    pub cab: String,
    /// Cab product.
    pub cab_type: String,
    /// Where to send the booking notification.
    pub notification_addr: UserAddress,
}

/// Accepts new requests into the pipeline.
pub struct UserInteractor {
    users: Arc<dyn UserRepository>,
    requests: Arc<dyn RequestRepository>,
    engine: Arc<Engine>,
    context: EvaluationContext,
    threshold: Duration,
}

impl UserInteractor {
    /// Create an intake over the repositories and the traffic engine.
    pub fn new(
        users: Arc<dyn UserRepository>,
        requests: Arc<dyn RequestRepository>,
        engine: Arc<Engine>,
        context: EvaluationContext,
        threshold: Duration,
    ) -> Self {
        Self {
            users,
            requests,
            engine,
            context,
            threshold,
        }
    }

    /// Validate, persist and submit a new request.
    ///
    /// # Errors
    ///
    /// - `ReachingTimeTooSoon` when the reaching time is inside the threshold; nothing
    ///   is stored.
    /// - `Repository` when storing fails.
    /// - `QueueFull` when the traffic engine rejects the job; the records stay stored.
    pub fn create_user_request(
        &self,
        intake: UserRequestIntake,
    ) -> Result<Arc<UserRequest>, IntakeError> {
        let now = self.context.clock.now();
        let lead = (intake.reaching_time - now).to_std().unwrap_or_default();
        if intake.reaching_time <= now || lead < self.threshold {
            warn!(reaching_time = %intake.reaching_time, %now, "reaching time too soon");
            return Err(IntakeError::ReachingTimeTooSoon {
                reaching_time: intake.reaching_time,
                threshold_mins: self.threshold.as_secs() / 60,
            });
        }

        let mut request = Request {
            id: None,
            source: intake.source,
            destination: intake.destination,
            reaching_time: intake.reaching_time,
            cab: intake.cab,
            cab_type: intake.cab_type,
            notification_addr: intake.notification_addr,
        };
        request.id = Some(self.requests.store(&request)?);

        let mut user = User::new(intake.user_name);
        user.id = Some(self.users.store(&user)?);

        let user_request = Arc::new(UserRequest::new(user, request));
        info!(request = %user_request.label(), "request accepted");
        self.submit(Arc::clone(&user_request))?;
        Ok(user_request)
    }

    /// Submit an already assembled request to the traffic engine.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::QueueFull` when the traffic engine is full.
    pub fn submit(&self, user_request: Arc<UserRequest>) -> Result<(), IntakeError> {
        self.engine
            .submit(UserRequestJob::new(user_request, self.context.clone()))?;
        Ok(())
    }
}
