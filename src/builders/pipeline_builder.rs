//! Wire the three engines, their interactors and the intake from configuration.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::{EngineConfig, PipelineConfig, StrategyConfig};
use crate::core::{ConfigError, Engine, EngineStats, IntakeError, TriggerFacility};
use crate::domain::{
    CabService, NotificationService, RequestRepository, TrafficService, UserRepository,
    UserRequest,
};
use crate::usecases::{
    BestBookingTimeFinder, BookingDispatcher, CabInteractor, EtaPollingStrategy,
    EvaluationContext, FixedLeadStrategy, NotificationInteractor, SampledTrafficAggregator,
    TrafficInteractor, UserInteractor, UserRequestIntake,
};
use crate::util::{Clock, SystemClock};

/// External collaborators the pipeline depends on.
#[derive(Clone)]
pub struct Collaborators {
    /// Traffic provider.
    pub traffic: Arc<dyn TrafficService>,
    /// Cab provider.
    pub cab: Arc<dyn CabService>,
    /// Notification channel.
    pub notification: Arc<dyn NotificationService>,
    /// User store.
    pub users: Arc<dyn UserRepository>,
    /// Request store.
    pub requests: Arc<dyn RequestRepository>,
}

/// A fully wired pipeline. Engines are idle until [`start`](Self::start).
pub struct Pipeline {
    config: PipelineConfig,
    traffic: Arc<Engine>,
    booking: Arc<Engine>,
    notification: Arc<Engine>,
    dispatcher: Arc<BookingDispatcher>,
    notifications: Arc<NotificationInteractor>,
    intake: UserInteractor,
}

impl Pipeline {
    /// Launch the configured number of workers on every engine.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn start(&self) -> io::Result<()> {
        for (engine, cfg) in self.engines_with_config() {
            engine.start(cfg.worker_count)?;
        }
        info!(
            traffic_workers = self.config.traffic.worker_count,
            booking_workers = self.config.booking.worker_count,
            notification_workers = self.config.notification.worker_count,
            "pipeline started"
        );
        Ok(())
    }

    /// Signal every engine's workers to exit after their current job.
    pub fn stop(&self) {
        for engine in [&self.traffic, &self.booking, &self.notification] {
            engine.stop();
        }
    }

    /// Wait up to `timeout` in total for stopped workers to exit.
    ///
    /// Returns `true` if every worker exited in time.
    pub fn join(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        [&self.traffic, &self.booking, &self.notification]
            .into_iter()
            .fold(true, |all, engine| {
                let remaining = deadline.saturating_duration_since(Instant::now());
                engine.join(remaining) && all
            })
    }

    /// Accept a new request through the intake.
    ///
    /// # Errors
    ///
    /// See [`UserInteractor::create_user_request`].
    pub fn submit(&self, intake: UserRequestIntake) -> Result<Arc<UserRequest>, IntakeError> {
        self.intake.create_user_request(intake)
    }

    /// The intake use case.
    #[must_use]
    pub const fn intake(&self) -> &UserInteractor {
        &self.intake
    }

    /// Bridge from trigger callbacks into the booking engine.
    #[must_use]
    pub const fn dispatcher(&self) -> &Arc<BookingDispatcher> {
        &self.dispatcher
    }

    /// Stage-3 interactor.
    #[must_use]
    pub const fn notifications(&self) -> &Arc<NotificationInteractor> {
        &self.notifications
    }

    /// Stage-1 engine.
    #[must_use]
    pub const fn traffic_engine(&self) -> &Arc<Engine> {
        &self.traffic
    }

    /// Stage-2 engine.
    #[must_use]
    pub const fn booking_engine(&self) -> &Arc<Engine> {
        &self.booking
    }

    /// Stage-3 engine.
    #[must_use]
    pub const fn notification_engine(&self) -> &Arc<Engine> {
        &self.notification
    }

    /// Statistics of the traffic, booking and notification engines, in that order.
    #[must_use]
    pub fn stats(&self) -> [EngineStats; 3] {
        [
            self.traffic.stats(),
            self.booking.stats(),
            self.notification.stats(),
        ]
    }

    fn engines_with_config(&self) -> [(&Arc<Engine>, &EngineConfig); 3] {
        [
            (&self.traffic, &self.config.traffic),
            (&self.booking, &self.config.booking),
            (&self.notification, &self.config.notification),
        ]
    }
}

/// Build a pipeline reading time from the system clock.
///
/// # Errors
///
/// Returns [`ConfigError`] if the configuration is invalid.
pub fn build_pipeline(
    cfg: &PipelineConfig,
    collaborators: Collaborators,
    trigger: Arc<dyn TriggerFacility>,
) -> Result<Pipeline, ConfigError> {
    build_pipeline_with_clock(cfg, collaborators, trigger, Arc::new(SystemClock))
}

/// Build a pipeline with an explicit clock.
///
/// # Errors
///
/// Returns [`ConfigError`] if the configuration is invalid.
pub fn build_pipeline_with_clock(
    cfg: &PipelineConfig,
    collaborators: Collaborators,
    trigger: Arc<dyn TriggerFacility>,
    clock: Arc<dyn Clock>,
) -> Result<Pipeline, ConfigError> {
    cfg.validate()?;

    let traffic_engine = Arc::new(Engine::from_config("traffic", &cfg.traffic)?);
    let booking_engine = Arc::new(Engine::from_config("booking", &cfg.booking)?);
    let notification_engine = Arc::new(Engine::from_config("notification", &cfg.notification)?);

    let strategy: Arc<dyn BestBookingTimeFinder> = match cfg.strategy {
        StrategyConfig::EtaPolling => Arc::new(EtaPollingStrategy::new(
            Arc::clone(&collaborators.cab),
            Arc::clone(&clock),
        )),
        StrategyConfig::FixedLead { lead_secs } => {
            Arc::new(FixedLeadStrategy::new(Duration::from_secs(lead_secs)))
        }
    };

    let aggregator = Arc::new(SampledTrafficAggregator::from_config(
        Arc::clone(&collaborators.traffic),
        &cfg.sampling,
    ));
    let traffic = Arc::new(TrafficInteractor::new(
        Arc::clone(&collaborators.traffic),
        aggregator,
    ));
    let cab = Arc::new(CabInteractor::new(Arc::clone(&collaborators.cab), strategy));
    let notifications = Arc::new(NotificationInteractor::new(
        Arc::clone(&notification_engine),
        Arc::clone(&collaborators.notification),
    ));
    let dispatcher = Arc::new(BookingDispatcher::new(
        Arc::clone(&booking_engine),
        Arc::clone(&cab),
        Arc::clone(&notifications),
    ));

    let context = EvaluationContext {
        traffic,
        cab,
        dispatcher: Arc::clone(&dispatcher),
        trigger,
        clock,
    };
    let intake = UserInteractor::new(
        collaborators.users,
        collaborators.requests,
        Arc::clone(&traffic_engine),
        context,
        cfg.reaching_time_threshold(),
    );

    Ok(Pipeline {
        config: cfg.clone(),
        traffic: traffic_engine,
        booking: booking_engine,
        notification: notification_engine,
        dispatcher,
        notifications,
        intake,
    })
}
