//! # Ubernow
//!
//! A deferred cab-booking notification pipeline. A user says where they need to be and
//! by when; the pipeline watches traffic and cab availability and tells them the best
//! moment to book a ride.
//!
//! ## Pipeline
//!
//! Three stages, each on its own bounded [`Engine`](core::Engine) (a fixed-capacity job
//! queue plus a pool of OS worker threads):
//!
//! ```text
//!  intake ──submit──▶ [traffic engine] ──schedule(at)──▶ trigger facility
//!                                                            │ fires at `at`
//!                                                            ▼
//!                      [notification engine] ◀──submit── [booking engine]
//!                              │
//!                              ▼
//!                      NotificationService::send
//! ```
//!
//! 1. **Traffic**: compute the base travel time and cab ETA, aggregate traffic samples,
//!    derive the trigger time and register a deferred callback.
//! 2. **Booking**: when the callback fires, a booking job picks the best booking time.
//! 3. **Notification**: deliver the booking response to the user.
//!
//! Admission is non-blocking everywhere: a full queue is reported to the submitter as a
//! [`QueueFullError`](core::QueueFullError), never by blocking and never by silently
//! dropping. A failed or panicking job is logged and counted; its worker keeps serving.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ubernow::builders::{build_pipeline, Collaborators};
//! use ubernow::config::PipelineConfig;
//! use ubernow::infra::{InMemoryRequestRepository, InMemoryUserRepository, LogNotifier};
//! use ubernow::runtime::TokioTrigger;
//!
//! ubernow::util::init_tracing();
//! let cfg = PipelineConfig::from_env()?;
//! let collaborators = Collaborators {
//!     traffic: Arc::new(my_traffic_client),
//!     cab: Arc::new(my_cab_client),
//!     notification: Arc::new(LogNotifier::new()),
//!     users: Arc::new(InMemoryUserRepository::new()),
//!     requests: Arc::new(InMemoryRequestRepository::new()),
//! };
//! let trigger = Arc::new(TokioTrigger::with_worker_threads(2)?);
//! let pipeline = build_pipeline(&cfg, collaborators, trigger)?;
//! pipeline.start()?;
//! pipeline.submit(intake)?;
//! ```
//!
//! All jobs are in-memory and best-effort: nothing survives a restart, nothing is retried.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Engines, workers, jobs, triggers and error types.
pub mod core;
/// Pipeline, engine and sampling configuration.
pub mod config;
/// Builders assembling a pipeline from configuration and collaborators.
pub mod builders;
/// Domain records, collaborator traits and repository contracts.
pub mod domain;
/// In-process repository and notification adapters.
pub mod infra;
/// Runtime adapters for the trigger facility.
pub mod runtime;
/// Stage interactors, jobs and the intake use case.
pub mod usecases;
/// Shared utilities.
pub mod util;
