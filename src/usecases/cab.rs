//! Stage 2: best booking time selection and the trigger-to-booking bridge.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::jobs::BookingJob;
use super::notification::NotificationInteractor;
use crate::core::{Engine, QueueFullError, StrategyError, TriggerCallback, UpstreamError};
use crate::domain::{BookingResponse, CabRequest, CabService, Location, TrafficResult};
use crate::util::{saturating_sub, Clock};

/// Chooses the instant the user should book a cab.
pub trait BestBookingTimeFinder: Send + Sync {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Best booking time for an aggregated traffic result.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] when no time can be chosen.
    fn find_best(&self, traffic: &TrafficResult) -> Result<DateTime<Utc>, StrategyError>;
}

/// Books a fixed lead ahead of the earliest worst-case departure.
#[derive(Debug, Clone, Copy)]
pub struct FixedLeadStrategy {
    lead: Duration,
}

impl FixedLeadStrategy {
    /// Create a strategy with the given lead.
    #[must_use]
    pub const fn new(lead: Duration) -> Self {
        Self { lead }
    }
}

impl BestBookingTimeFinder for FixedLeadStrategy {
    fn name(&self) -> &'static str {
        "fixed_lead"
    }

    fn find_best(&self, traffic: &TrafficResult) -> Result<DateTime<Utc>, StrategyError> {
        let departure = traffic
            .earliest_worst_case()
            .ok_or(StrategyError::NoSamples)?;
        Ok(saturating_sub(departure, self.lead))
    }
}

/// Asks the cab service for the live ETA and fits it into the traffic window.
///
/// Prefers the worst-case deadline. If that has already passed, books now as long as the
/// best-case deadline is still reachable.
pub struct EtaPollingStrategy {
    cab: Arc<dyn CabService>,
    clock: Arc<dyn Clock>,
}

impl EtaPollingStrategy {
    /// Create a strategy polling `cab` and reading time from `clock`.
    pub fn new(cab: Arc<dyn CabService>, clock: Arc<dyn Clock>) -> Self {
        Self { cab, clock }
    }
}

impl BestBookingTimeFinder for EtaPollingStrategy {
    fn name(&self) -> &'static str {
        "eta_polling"
    }

    fn find_best(&self, traffic: &TrafficResult) -> Result<DateTime<Utc>, StrategyError> {
        let worst = traffic
            .earliest_worst_case()
            .ok_or(StrategyError::NoSamples)?;
        let now = self.clock.now();
        let eta = self
            .cab
            .eta_now(&CabRequest::for_user_request(&traffic.user_request, now))?;

        let best = saturating_sub(worst, eta);
        if best >= now {
            return Ok(best);
        }

        let last_chance = traffic
            .latest_best_case()
            .map_or(best, |departure| saturating_sub(departure, eta));
        if last_chance >= now {
            debug!(%last_chance, ?eta, "worst-case window missed, booking now");
            return Ok(now);
        }

        Err(StrategyError::WindowClosed(last_chance))
    }
}

/// Runs the cab side of the pipeline.
pub struct CabInteractor {
    service: Arc<dyn CabService>,
    strategy: Arc<dyn BestBookingTimeFinder>,
}

impl CabInteractor {
    /// Create an interactor over a cab service and a booking strategy.
    pub fn new(service: Arc<dyn CabService>, strategy: Arc<dyn BestBookingTimeFinder>) -> Self {
        Self { service, strategy }
    }

    /// Current cab ETA for the route.
    ///
    /// # Errors
    ///
    /// Propagates the cab service's [`UpstreamError`].
    pub fn compute_base_eta(
        &self,
        source: &Location,
        destination: &Location,
        at: DateTime<Utc>,
        cab: &str,
        cab_type: &str,
    ) -> Result<Duration, UpstreamError> {
        let request = CabRequest {
            source: source.clone(),
            destination: destination.clone(),
            booking_time: at,
            cab: cab.to_string(),
            cab_type: cab_type.to_string(),
        };
        self.service.eta_now(&request)
    }

    /// Build the booking response for an aggregated traffic result.
    ///
    /// # Errors
    ///
    /// Returns the strategy's [`StrategyError`] unchanged; no response is built.
    pub fn compute_booking_response(
        &self,
        traffic: &TrafficResult,
    ) -> Result<BookingResponse, StrategyError> {
        let best = self.strategy.find_best(traffic)?;
        debug!(
            strategy = self.strategy.name(),
            request = %traffic.user_request.label(),
            %best,
            "best booking time chosen"
        );
        Ok(BookingResponse::new(
            Arc::clone(&traffic.user_request),
            best,
        ))
    }
}

/// Hands traffic results over to the booking engine.
pub struct BookingDispatcher {
    engine: Arc<Engine>,
    cab: Arc<CabInteractor>,
    notifications: Arc<NotificationInteractor>,
}

impl BookingDispatcher {
    /// Create a dispatcher feeding `engine`.
    pub fn new(
        engine: Arc<Engine>,
        cab: Arc<CabInteractor>,
        notifications: Arc<NotificationInteractor>,
    ) -> Self {
        Self {
            engine,
            cab,
            notifications,
        }
    }

    /// Submit a booking job for `traffic`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFullError`] when the booking engine is full.
    pub fn dispatch(&self, traffic: TrafficResult) -> Result<(), QueueFullError> {
        self.engine.submit(BookingJob::new(
            traffic,
            Arc::clone(&self.cab),
            Arc::clone(&self.notifications),
        ))
    }

    /// Trigger callback that dispatches `traffic` when fired.
    ///
    /// There is no caller left to report to at fire time, so a full booking queue is
    /// logged and the request is dropped.
    pub fn on_trigger(self: &Arc<Self>, traffic: TrafficResult) -> TriggerCallback {
        let dispatcher = Arc::clone(self);
        Box::new(move || {
            let label = traffic.user_request.label();
            if let Err(err) = dispatcher.dispatch(traffic) {
                error!(request = %label, error = %err, "booking dispatch rejected at trigger time");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AddressKind, Request, User, UserAddress, UserRequest};
    use crate::infra::LogNotifier;
    use crate::util::FixedClock;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, min, 0).unwrap()
    }

    fn traffic(worst: &[DateTime<Utc>], best: &[DateTime<Utc>]) -> TrafficResult {
        let user_request = Arc::new(UserRequest::new(
            User::new("ana"),
            Request {
                id: Some(7),
                source: Location::new("home", 0.0, 0.0),
                destination: Location::new("office", 0.1, 0.1),
                reaching_time: at(9, 0),
                cab: "uber".into(),
                cab_type: "uberGo".into(),
                notification_addr: UserAddress {
                    kind: AddressKind::Sms,
                    value: "+100".into(),
                },
            },
        ));
        let mut result = TrafficResult::new(user_request, Duration::from_secs(1800));
        result.worst_case = worst.to_vec();
        result.best_case = best.to_vec();
        result
    }

    struct FixedEta(Option<Duration>);

    impl CabService for FixedEta {
        fn eta_now(&self, _request: &CabRequest) -> Result<Duration, UpstreamError> {
            self.0
                .ok_or_else(|| UpstreamError::new("cab", anyhow::anyhow!("no cabs")))
        }
    }

    fn polling(eta_mins: Option<u64>, now: DateTime<Utc>) -> EtaPollingStrategy {
        EtaPollingStrategy::new(
            Arc::new(FixedEta(eta_mins.map(|m| Duration::from_secs(m * 60)))),
            Arc::new(FixedClock(now)),
        )
    }

    #[test]
    fn test_fixed_lead_uses_earliest_worst_case() {
        let strategy = FixedLeadStrategy::new(Duration::from_secs(600));
        let best = strategy
            .find_best(&traffic(&[at(8, 20), at(8, 10)], &[]))
            .unwrap();
        assert_eq!(best, at(8, 0));
    }

    #[test]
    fn test_fixed_lead_without_samples() {
        let strategy = FixedLeadStrategy::new(Duration::from_secs(600));
        assert!(matches!(
            strategy.find_best(&traffic(&[], &[])),
            Err(StrategyError::NoSamples)
        ));
    }

    #[test]
    fn test_eta_polling_prefers_worst_case_deadline() {
        let best = polling(Some(10), at(7, 0))
            .find_best(&traffic(&[at(8, 10)], &[at(8, 30)]))
            .unwrap();
        assert_eq!(best, at(8, 0));
    }

    #[test]
    fn test_eta_polling_books_now_inside_best_case_window() {
        let now = at(8, 5);
        let best = polling(Some(10), now)
            .find_best(&traffic(&[at(8, 10)], &[at(8, 30)]))
            .unwrap();
        assert_eq!(best, now);
    }

    #[test]
    fn test_eta_polling_window_closed() {
        let err = polling(Some(10), at(8, 45))
            .find_best(&traffic(&[at(8, 10)], &[at(8, 30)]))
            .unwrap_err();
        assert!(matches!(err, StrategyError::WindowClosed(t) if t == at(8, 20)));
    }

    #[test]
    fn test_eta_polling_maps_cab_failure() {
        let err = polling(None, at(7, 0))
            .find_best(&traffic(&[at(8, 10)], &[]))
            .unwrap_err();
        assert!(matches!(err, StrategyError::Upstream(ref e) if e.service == "cab"));
    }

    #[test]
    fn test_booking_response_carries_request() {
        let interactor = CabInteractor::new(
            Arc::new(FixedEta(Some(Duration::from_secs(60)))),
            Arc::new(FixedLeadStrategy::new(Duration::ZERO)),
        );
        let traffic = traffic(&[at(8, 10)], &[]);
        let response = interactor.compute_booking_response(&traffic).unwrap();
        assert_eq!(response.best_booking_time, at(8, 10));
        assert!(Arc::ptr_eq(&response.user_request, &traffic.user_request));
    }

    fn dispatcher(capacity: usize) -> (Arc<Engine>, Arc<BookingDispatcher>) {
        let booking = Arc::new(Engine::new("booking", capacity).unwrap());
        let notification = Arc::new(Engine::new("notification", 1).unwrap());
        let cab = Arc::new(CabInteractor::new(
            Arc::new(FixedEta(Some(Duration::from_secs(60)))),
            Arc::new(FixedLeadStrategy::new(Duration::ZERO)),
        ));
        let notifications = Arc::new(NotificationInteractor::new(
            notification,
            Arc::new(LogNotifier::new()),
        ));
        let dispatcher = Arc::new(BookingDispatcher::new(
            Arc::clone(&booking),
            cab,
            notifications,
        ));
        (booking, dispatcher)
    }

    #[test]
    fn test_dispatch_reports_full_booking_queue() {
        let (booking, dispatcher) = dispatcher(1);
        dispatcher.dispatch(traffic(&[at(8, 10)], &[])).unwrap();

        let err = dispatcher.dispatch(traffic(&[at(8, 10)], &[])).unwrap_err();
        assert!(matches!(
            err,
            QueueFullError { ref engine, capacity: 1 } if engine == "booking"
        ));
        assert_eq!(booking.len(), 1);
    }

    #[test]
    fn test_trigger_on_full_booking_queue_drops_request() {
        let (booking, dispatcher) = dispatcher(1);
        dispatcher.dispatch(traffic(&[at(8, 10)], &[])).unwrap();

        let callback = dispatcher.on_trigger(traffic(&[at(8, 10)], &[]));
        callback();

        let stats = booking.stats();
        assert_eq!(stats.rejected_jobs, 1);
        assert_eq!(stats.submitted_jobs, 1);
        assert_eq!(booking.len(), 1);
    }

    #[test]
    fn test_trigger_dispatches_when_queue_has_room() {
        let (booking, dispatcher) = dispatcher(1);
        dispatcher.on_trigger(traffic(&[at(8, 10)], &[]))();

        assert_eq!(booking.len(), 1);
        assert_eq!(booking.stats().rejected_jobs, 0);
    }
}
