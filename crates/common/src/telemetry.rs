//! Tracing setup for embedding applications

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Call once at process start; the filter is taken from `RUST_LOG`.
/// Returns quietly if a subscriber is already installed so embedders
/// and test harnesses can both call it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
