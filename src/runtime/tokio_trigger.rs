//! Tokio-backed trigger facility.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, error};

use crate::core::{TriggerCallback, TriggerFacility};

/// Trigger facility that sleeps on a tokio runtime and runs each callback on the
/// runtime's blocking pool.
///
/// The delay is taken from the wall clock at registration and then measured with tokio's
/// monotonic timer, so wall-clock jumps after registration do not move the firing time.
#[derive(Clone)]
pub struct TokioTrigger {
    handle: Handle,
    /// Keeps an owned runtime alive for as long as any clone exists.
    owned_runtime: Option<Arc<Runtime>>,
}

impl TokioTrigger {
    /// Create a trigger facility on an existing runtime.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self {
            handle,
            owned_runtime: None,
        }
    }

    /// Create a trigger facility that owns a new multi-threaded runtime with the given
    /// number of timer threads.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidInput`](std::io::ErrorKind::InvalidInput) error if
    /// `worker_threads` is zero, or the I/O error if the runtime cannot be built.
    pub fn with_worker_threads(worker_threads: usize) -> Result<Self, std::io::Error> {
        if worker_threads == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "trigger runtime needs at least one worker thread",
            ));
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .thread_name("ubernow-trigger")
            .enable_all()
            .build()?;
        Ok(Self {
            handle: runtime.handle().clone(),
            owned_runtime: Some(Arc::new(runtime)),
        })
    }
}

impl TriggerFacility for TokioTrigger {
    fn schedule(&self, at: DateTime<Utc>, callback: TriggerCallback) {
        let delay = (at - Utc::now()).to_std().unwrap_or_default();
        debug!(%at, ?delay, "trigger scheduled");

        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = tokio::task::spawn_blocking(callback).await {
                error!(%at, error = %e, "trigger callback panicked");
            }
        });
    }
}

impl std::fmt::Debug for TokioTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioTrigger")
            .field("owns_runtime", &self.owned_runtime.is_some())
            .finish()
    }
}
