//! Stage interactors, their jobs and the intake use case.

pub mod cab;
pub mod jobs;
pub mod notification;
pub mod traffic;
pub mod user;

pub use cab::{
    BestBookingTimeFinder, BookingDispatcher, CabInteractor, EtaPollingStrategy,
    FixedLeadStrategy,
};
pub use jobs::{BookingJob, EvaluationContext, NotificationJob, UserRequestJob};
pub use notification::NotificationInteractor;
pub use traffic::{SampledTrafficAggregator, TrafficAggregator, TrafficInteractor};
pub use user::{UserInteractor, UserRequestIntake};
