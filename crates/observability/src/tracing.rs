//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize structured logging for the process.
///
/// JSON lines on stdout, filtered via `RUST_LOG` (default `info`). Calling
/// this more than once is a no-op, so tests can init freely.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_target(true)
        .try_init();
}
