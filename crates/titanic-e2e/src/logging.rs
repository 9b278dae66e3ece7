// crates/titanic-e2e/src/logging.rs
// ============================================================================
// Module: Test Logging
// Description: Idempotent tracing subscriber setup for test binaries.
// Purpose: Route harness progress lines through the libtest output capture.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Every test calls [`init_test_logging`]; only the first call installs a
//! subscriber, later calls are no-ops. `RUST_LOG` overrides the default
//! filter.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "titanic_e2e=info,system_tests=info";

/// Installs a compact, test-captured subscriber once per process.
///
/// Returns true when this call installed the subscriber.
pub fn init_test_logging() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init()
        .is_ok()
}
