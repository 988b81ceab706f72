//! Worker loop shared by every engine.
//!
//! A worker blocks on its engine's queue and its generation's shutdown channel. It never
//! exits because a job failed: errors and panics are logged, counted, and discarded.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crossbeam_channel::{select, Receiver, TryRecvError};
use tracing::{debug, error};

use super::engine::EngineCounters;
use super::job::BoxedJob;

/// Outcome of running one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JobOutcome {
    Completed,
    Failed,
    Panicked(String),
}

/// A single consumer of an engine queue.
pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) engine: Arc<str>,
    pub(crate) jobs: Receiver<BoxedJob>,
    /// Never carries a message; disconnection is the stop signal.
    pub(crate) shutdown: Receiver<()>,
    pub(crate) counters: Arc<EngineCounters>,
}

impl Worker {
    /// Consume jobs until the shutdown channel disconnects.
    pub(crate) fn run(self) {
        self.counters.live_workers.fetch_add(1, Ordering::AcqRel);
        debug!(engine = %self.engine, worker_id = self.id, "worker started");

        loop {
            if matches!(self.shutdown.try_recv(), Err(TryRecvError::Disconnected)) {
                break;
            }

            select! {
                recv(self.jobs) -> msg => match msg {
                    Ok(job) => {
                        self.execute(job);
                    }
                    Err(_) => break,
                },
                recv(self.shutdown) -> _ => break,
            }
        }

        self.counters.live_workers.fetch_sub(1, Ordering::AcqRel);
        debug!(engine = %self.engine, worker_id = self.id, "worker stopped");
    }

    fn execute(&self, job: BoxedJob) -> JobOutcome {
        let kind = job.kind();
        let label = job.label();

        self.counters.active_jobs.fetch_add(1, Ordering::Relaxed);
        debug!(engine = %self.engine, worker_id = self.id, job = %label, "executing job");

        let outcome = match catch_unwind(AssertUnwindSafe(move || job.execute())) {
            Ok(Ok(())) => JobOutcome::Completed,
            Ok(Err(err)) => {
                error!(
                    engine = %self.engine,
                    worker_id = self.id,
                    kind,
                    job = %label,
                    step = err.step(),
                    error = %err,
                    "job failed"
                );
                JobOutcome::Failed
            }
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                error!(
                    engine = %self.engine,
                    worker_id = self.id,
                    kind,
                    job = %label,
                    panic = %msg,
                    "job panicked"
                );
                JobOutcome::Panicked(msg)
            }
        };

        self.counters.active_jobs.fetch_sub(1, Ordering::Relaxed);
        match outcome {
            JobOutcome::Completed => {
                self.counters.completed_jobs.fetch_add(1, Ordering::Relaxed);
            }
            JobOutcome::Failed | JobOutcome::Panicked(_) => {
                self.counters.failed_jobs.fetch_add(1, Ordering::Relaxed);
            }
        }
        outcome
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Job, JobError, QueueFullError};
    use crossbeam_channel::bounded;

    struct Noop;

    impl Job for Noop {
        fn kind(&self) -> &'static str {
            "noop"
        }

        fn execute(self: Box<Self>) -> Result<(), JobError> {
            Ok(())
        }
    }

    struct Failing;

    impl Job for Failing {
        fn kind(&self) -> &'static str {
            "failing"
        }

        fn execute(self: Box<Self>) -> Result<(), JobError> {
            Err(JobError::NotificationQueue(QueueFullError {
                engine: "notification".into(),
                capacity: 1,
            }))
        }
    }

    struct Panicking;

    impl Job for Panicking {
        fn kind(&self) -> &'static str {
            "panicking"
        }

        fn execute(self: Box<Self>) -> Result<(), JobError> {
            panic!("boom")
        }
    }

    fn make_worker() -> (Worker, crossbeam_channel::Sender<()>) {
        let (_job_tx, job_rx) = bounded::<BoxedJob>(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let worker = Worker {
            id: 0,
            engine: Arc::from("test"),
            jobs: job_rx,
            shutdown: shutdown_rx,
            counters: Arc::new(EngineCounters::default()),
        };
        (worker, shutdown_tx)
    }

    #[test]
    fn test_execute_outcomes_are_counted() {
        let (worker, _shutdown) = make_worker();

        assert_eq!(worker.execute(Box::new(Noop)), JobOutcome::Completed);
        assert_eq!(worker.execute(Box::new(Failing)), JobOutcome::Failed);
        assert_eq!(
            worker.execute(Box::new(Panicking)),
            JobOutcome::Panicked("boom".to_string())
        );

        let stats = worker.counters.snapshot("test", 1, 0);
        assert_eq!(stats.completed_jobs, 1);
        assert_eq!(stats.failed_jobs, 2);
        assert_eq!(stats.active_jobs, 0);
    }

    #[test]
    fn test_run_exits_when_shutdown_disconnects() {
        let (worker, shutdown) = make_worker();
        let counters = Arc::clone(&worker.counters);
        drop(shutdown);

        // Returns immediately instead of blocking on the empty queue.
        worker.run();
        assert_eq!(counters.live_workers.load(Ordering::Acquire), 0);
    }
}
