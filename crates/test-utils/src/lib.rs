pub mod builders;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Route tugbot's logs into the per-test capture buffer.
///
/// Defaults to `warn`, so only skipped fires and failed launches show up in
/// a failing test's output; set `RUST_LOG=tugbot=debug` for the full trace.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        // Another harness may have installed a subscriber already.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Run a future with a 5-second timeout.
///
/// Under `start_paused` this is 5 seconds of virtual time; timer tests that
/// wait longer should not use it.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
