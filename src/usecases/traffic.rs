//! Stage 1: traffic evaluation and trigger-time derivation.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::SamplingConfig;
use crate::core::UpstreamError;
use crate::domain::{Location, TrafficRequest, TrafficResult, TrafficService, UserRequest};
use crate::util::saturating_sub;

/// Turns a base travel time into an aggregated [`TrafficResult`].
pub trait TrafficAggregator: Send + Sync {
    /// Aggregate traffic samples for `user_request`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if a traffic call fails; partial samples are discarded.
    fn aggregate(
        &self,
        base_travel_time: Duration,
        user_request: &Arc<UserRequest>,
    ) -> Result<TrafficResult, UpstreamError>;
}

/// Polls the traffic service for the request's reaching time until the worst-case
/// departure converges or the sample budget runs out.
pub struct SampledTrafficAggregator {
    service: Arc<dyn TrafficService>,
    max_samples: usize,
    convergence: Duration,
    poll_interval: Duration,
}

impl SampledTrafficAggregator {
    /// Create an aggregator with explicit limits. `max_samples` is raised to at least 1.
    pub fn new(
        service: Arc<dyn TrafficService>,
        max_samples: usize,
        convergence: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            service,
            max_samples: max_samples.max(1),
            convergence,
            poll_interval,
        }
    }

    /// Create an aggregator from sampling configuration.
    pub fn from_config(service: Arc<dyn TrafficService>, config: &SamplingConfig) -> Self {
        Self::new(
            service,
            config.max_samples,
            config.convergence(),
            config.poll_interval(),
        )
    }
}

impl TrafficAggregator for SampledTrafficAggregator {
    fn aggregate(
        &self,
        base_travel_time: Duration,
        user_request: &Arc<UserRequest>,
    ) -> Result<TrafficResult, UpstreamError> {
        let request = &user_request.request;
        let query = TrafficRequest::new(
            request.source.clone(),
            request.destination.clone(),
            request.reaching_time,
        );
        let mut result = TrafficResult::new(Arc::clone(user_request), base_travel_time);

        for sample in 0..self.max_samples {
            if sample > 0 && !self.poll_interval.is_zero() {
                thread::sleep(self.poll_interval);
            }

            let response = self.service.travel_time(&query)?;
            let previous = result.worst_case.last().copied();

            result.travel_times.push(response.travel_time);
            result.best_case.push(response.best_case);
            result.worst_case.push(response.worst_case);

            if let Some(previous) = previous {
                let drift = (response.worst_case - previous).abs().to_std().unwrap_or(Duration::MAX);
                if drift <= self.convergence {
                    debug!(samples = sample + 1, ?drift, "worst-case departure converged");
                    break;
                }
            }
        }

        Ok(result)
    }
}

/// Orchestrates the traffic side of request evaluation.
pub struct TrafficInteractor {
    service: Arc<dyn TrafficService>,
    aggregator: Arc<dyn TrafficAggregator>,
}

impl TrafficInteractor {
    /// Create an interactor over a traffic service and an aggregation strategy.
    pub fn new(service: Arc<dyn TrafficService>, aggregator: Arc<dyn TrafficAggregator>) -> Self {
        Self {
            service,
            aggregator,
        }
    }

    /// Single-point travel time estimate from `source` to `destination` at `at`.
    ///
    /// # Errors
    ///
    /// Propagates the traffic service's [`UpstreamError`]; nothing is retried.
    pub fn compute_base_travel_time(
        &self,
        source: &Location,
        destination: &Location,
        at: DateTime<Utc>,
    ) -> Result<Duration, UpstreamError> {
        let query = TrafficRequest::new(source.clone(), destination.clone(), at);
        let response = self.service.travel_time(&query)?;
        Ok(response.travel_time)
    }

    /// Aggregate the final traffic result through the configured strategy.
    ///
    /// # Errors
    ///
    /// Propagates the strategy's [`UpstreamError`].
    pub fn compute_final_traffic_result(
        &self,
        base_travel_time: Duration,
        user_request: &Arc<UserRequest>,
    ) -> Result<TrafficResult, UpstreamError> {
        self.aggregator.aggregate(base_travel_time, user_request)
    }

    /// Instant at which the booking stage should run.
    ///
    /// The cab has to be requested `base_eta` before the worst-case departure, which is
    /// the earliest worst-case sample, or `reaching_time - base_travel_time` when there
    /// are no samples. Pure: depends only on its arguments.
    #[must_use]
    pub fn compute_trigger_time(base_eta: Duration, traffic: &TrafficResult) -> DateTime<Utc> {
        let departure = traffic.earliest_worst_case().unwrap_or_else(|| {
            saturating_sub(
                traffic.user_request.request.reaching_time,
                traffic.base_travel_time,
            )
        });
        saturating_sub(departure, base_eta)
    }
}
