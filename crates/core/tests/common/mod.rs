//! Shared setup for integration tests

use tracing_subscriber::EnvFilter;

/// Route engine logs through the test harness; `RUST_LOG` overrides the level
#[ctor::ctor]
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
