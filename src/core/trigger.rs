//! Deferred single-shot callbacks ("cron" registrations).

use chrono::{DateTime, Utc};

/// Callback fired by a [`TriggerFacility`].
pub type TriggerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Runs a callback once, at or after a wall-clock instant.
///
/// Registrations are fire-and-forget: there is no handle, no cancellation and no query.
/// A registration fires unless the process exits first. Implementations must run the
/// callback on its own execution context so a slow callback cannot stall the registering
/// caller or other pending triggers. Two registrations for the same instant fire in no
/// particular order; an instant already in the past fires as soon as possible.
pub trait TriggerFacility: Send + Sync {
    /// Register `callback` to run at or after `at`.
    fn schedule(&self, at: DateTime<Utc>, callback: TriggerCallback);
}
