//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: pipeline events at `info`, everything else at `warn`.
pub const DEFAULT_LOG_FILTER: &str = "warn,ubernow=info";

/// Install a fmt subscriber filtered by `RUST_LOG`, or by [`DEFAULT_LOG_FILTER`] when the
/// variable is unset or invalid.
///
/// Does nothing if a global subscriber is already installed, so it is safe to call from
/// every test and from embedding applications that set up their own.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_FILTER);
}

/// Like [`init_tracing`] with an explicit fallback filter.
pub fn init_tracing_with(default_filter: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Worker threads are named `{engine}-worker-{id}`; keep that in every line.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_target(false)
        .try_init();
}
