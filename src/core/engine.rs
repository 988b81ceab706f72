//! Bounded job queue plus worker pool, one instance per pipeline stage.
//!
//! Each engine owns a fixed-capacity `crossbeam-channel` queue and spawns dedicated OS
//! threads that consume from it.
//!
//! # Design Principles
//!
//! - **Non-blocking admission**: `submit` uses `try_send` and fails fast with
//!   [`QueueFullError`] when the queue is at capacity
//! - **No polling**: workers block on `select!` over the queue and the shutdown channel
//! - **Fire-and-forget stop**: dropping the shutdown sender unblocks every worker of the
//!   current generation; queued jobs stay where they are
//!
//! # Example
//!
//! ```rust,ignore
//! use ubernow::core::Engine;
//!
//! let engine = Engine::new("traffic", 128)?;
//! engine.start(4)?;
//! engine.submit(my_job)?;
//! engine.stop();
//! ```

use std::io;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;

use super::job::{BoxedJob, Job};
use super::worker::Worker;
use super::{ConfigError, QueueFullError};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Point-in-time statistics for one engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Engine name.
    pub name: String,
    /// Fixed queue capacity.
    pub capacity: usize,
    /// Jobs waiting in the queue.
    pub queued_jobs: usize,
    /// Worker threads currently running their loop.
    pub live_workers: usize,
    /// Jobs currently executing.
    pub active_jobs: u64,
    /// Jobs accepted by `submit`.
    pub submitted_jobs: u64,
    /// Jobs rejected because the queue was full.
    pub rejected_jobs: u64,
    /// Jobs that returned `Ok`.
    pub completed_jobs: u64,
    /// Jobs that returned an error or panicked.
    pub failed_jobs: u64,
}

/// Internal counters for engine statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct EngineCounters {
    pub live_workers: AtomicUsize,
    pub active_jobs: AtomicU64,
    pub submitted_jobs: AtomicU64,
    pub rejected_jobs: AtomicU64,
    pub completed_jobs: AtomicU64,
    pub failed_jobs: AtomicU64,
}

impl EngineCounters {
    /// Get a snapshot of current statistics.
    pub(crate) fn snapshot(&self, name: &str, capacity: usize, queued_jobs: usize) -> EngineStats {
        EngineStats {
            name: name.to_string(),
            capacity,
            queued_jobs,
            live_workers: self.live_workers.load(Ordering::Acquire),
            active_jobs: self.active_jobs.load(Ordering::Relaxed),
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
            rejected_jobs: self.rejected_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            failed_jobs: self.failed_jobs.load(Ordering::Relaxed),
        }
    }
}

/// Shutdown channel for one worker generation.
struct Generation {
    /// Dropped by `stop` to disconnect every worker's receiver.
    _stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
}

/// Bounded job queue with a pool of worker threads.
///
/// Engines are shared behind `Arc` by the interactors that submit to them and live for the
/// whole process. The queue never grows and `submit` never blocks.
pub struct Engine {
    name: Arc<str>,
    capacity: usize,
    job_tx: Sender<BoxedJob>,
    job_rx: Receiver<BoxedJob>,
    generation: Mutex<Option<Generation>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    next_worker_id: AtomicUsize,
    counters: Arc<EngineCounters>,
}

impl Engine {
    /// Create an engine with a queue of `capacity` slots and no workers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `capacity` is zero.
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self, ConfigError> {
        let name: String = name.into();
        if capacity == 0 {
            return Err(ConfigError::Invalid(format!(
                "engine `{name}` needs a queue capacity greater than 0"
            )));
        }

        let (job_tx, job_rx) = bounded::<BoxedJob>(capacity);
        debug!(engine = %name, capacity, "engine created");

        Ok(Self {
            name: Arc::from(name),
            capacity,
            job_tx,
            job_rx,
            generation: Mutex::new(None),
            workers: Mutex::new(Vec::new()),
            next_worker_id: AtomicUsize::new(0),
            counters: Arc::new(EngineCounters::default()),
        })
    }

    /// Create an engine sized by `config.max_queue_depth`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the configuration is invalid.
    pub fn from_config(name: impl Into<String>, config: &EngineConfig) -> Result<Self, ConfigError> {
        let name: String = name.into();
        config
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("engine `{name}`: {e}")))?;
        Self::new(name, config.max_queue_depth)
    }

    /// Engine name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed queue capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued, unclaimed jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.job_rx.len()
    }

    /// Whether the queue holds no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.job_rx.is_empty()
    }

    /// Enqueue a job without blocking.
    ///
    /// Success only means the job is queued; it runs later on some worker.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFullError`] if every slot is taken. The queue is left unchanged and
    /// the job is dropped; the caller decides whether to give up or report upward.
    pub fn submit<J: Job>(&self, job: J) -> Result<(), QueueFullError> {
        self.submit_boxed(Box::new(job))
    }

    /// Enqueue an already boxed job without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFullError`] if every slot is taken.
    pub fn submit_boxed(&self, job: BoxedJob) -> Result<(), QueueFullError> {
        let kind = job.kind();
        match self.job_tx.try_send(job) {
            Ok(()) => {
                self.counters.submitted_jobs.fetch_add(1, Ordering::Relaxed);
                debug!(engine = %self.name, kind, "job submitted");
                Ok(())
            }
            // The engine holds a receiver itself, so the channel never disconnects.
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                self.counters.rejected_jobs.fetch_add(1, Ordering::Relaxed);
                warn!(engine = %self.name, kind, capacity = self.capacity, "engine queue is full");
                Err(QueueFullError {
                    engine: self.name.to_string(),
                    capacity: self.capacity,
                })
            }
        }
    }

    /// Launch `workers` more worker threads consuming from this engine's queue.
    ///
    /// Calling `start` again adds consumers; after [`stop`](Self::stop) it begins a new
    /// generation of workers.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a thread cannot be spawned. Workers spawned before the
    /// failure keep running.
    pub fn start(&self, workers: usize) -> io::Result<()> {
        let stop_rx = {
            let mut generation = self.generation.lock();
            let generation = generation.get_or_insert_with(|| {
                let (stop_tx, stop_rx) = bounded::<()>(0);
                Generation {
                    _stop_tx: stop_tx,
                    stop_rx,
                }
            });
            generation.stop_rx.clone()
        };

        let mut handles = self.workers.lock();
        for _ in 0..workers {
            let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
            let worker = Worker {
                id,
                engine: Arc::clone(&self.name),
                jobs: self.job_rx.clone(),
                shutdown: stop_rx.clone(),
                counters: Arc::clone(&self.counters),
            };
            let handle = thread::Builder::new()
                .name(format!("{}-worker-{id}", self.name))
                .spawn(move || worker.run())?;
            handles.push(handle);
        }

        info!(engine = %self.name, added = workers, total = handles.len(), "engine workers started");
        Ok(())
    }

    /// Signal every running worker to exit after its current job.
    ///
    /// Does not wait and does not touch queued jobs.
    pub fn stop(&self) {
        if self.generation.lock().take().is_some() {
            info!(engine = %self.name, queued = self.len(), "engine stop signalled");
        }
    }

    /// Wait up to `timeout` for stopped workers to exit.
    ///
    /// Call after [`stop`](Self::stop). Workers still running at the deadline keep their
    /// handles, so a later `join` can wait for them again. Returns `true` if every worker
    /// joined.
    pub fn join(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending: Vec<_> = self.workers.lock().drain(..).collect();

        loop {
            let (finished, running): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(JoinHandle::is_finished);
            pending = running;

            for handle in finished {
                let worker = handle.thread().name().unwrap_or("worker").to_string();
                match handle.join() {
                    Ok(()) => debug!(engine = %self.name, worker = %worker, "worker joined"),
                    Err(_) => warn!(engine = %self.name, worker = %worker, "worker panicked"),
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if pending.is_empty() || remaining.is_zero() {
                break;
            }
            thread::sleep(remaining.min(JOIN_POLL_INTERVAL));
        }

        if pending.is_empty() {
            return true;
        }
        warn!(engine = %self.name, running = pending.len(), "workers did not exit within timeout");
        self.workers.lock().extend(pending);
        false
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot(&self.name, self.capacity, self.len())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Signal but don't join; explicit `join` is required for graceful cleanup.
        if self.generation.get_mut().take().is_some() {
            debug!(engine = %self.name, "engine dropped without stop - workers will be detached");
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("queued", &self.len())
            .finish_non_exhaustive()
    }
}
