//! The unit of work executed by engine workers.

use super::JobError;

/// A self-contained unit of deferred work.
///
/// Each pipeline stage defines its own job type carrying the payload it needs plus shared
/// references to the interactors that process it. Engines only see `Box<dyn Job>`, so any
/// type exposing `execute` can be queued.
///
/// # Example
///
/// ```rust,ignore
/// use ubernow::core::{Job, JobError};
///
/// struct Ping;
///
/// impl Job for Ping {
///     fn kind(&self) -> &'static str {
///         "ping"
///     }
///
///     fn execute(self: Box<Self>) -> Result<(), JobError> {
///         tracing::info!("pong");
///         Ok(())
///     }
/// }
/// ```
pub trait Job: Send + 'static {
    /// Static job kind, used as a log field.
    fn kind(&self) -> &'static str;

    /// Human-readable identification of this job instance for logs.
    fn label(&self) -> String {
        self.kind().to_string()
    }

    /// Run the job to completion on the calling worker thread.
    ///
    /// # Errors
    ///
    /// Returns the failing step. The worker logs it and moves on; nothing is retried.
    fn execute(self: Box<Self>) -> Result<(), JobError>;
}

/// A queued job.
pub type BoxedJob = Box<dyn Job>;
