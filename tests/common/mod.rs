//! Shared test setup.

use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once; later calls are no-ops.
/// Run with `RUST_LOG=stowage=debug` to see registry activity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
