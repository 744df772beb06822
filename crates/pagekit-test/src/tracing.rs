//! Tracing initialization for tests.

use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber.
///
/// The filter is read from `RUST_LOG` and defaults to debug output for the
/// pagekit crates.
/// Output goes through the test harness writer so it is only shown for
/// failing tests. Calling this more than once is harmless.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pagekit_core=debug,pagekit_postgres=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}
