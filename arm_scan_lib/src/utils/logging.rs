//! Tracing initialization for the scan tools.
//!
//! The subscriber is installed as the thread default rather than globally, so
//! tests and embedding programs can install their own.

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with the `info` level unless `RUST_LOG` says otherwise.
///
/// # Returns
/// A `DefaultGuard` that keeps the subscriber active. The guard must be kept
/// in scope for the duration of the program.
///
/// # Example
/// ```no_run
/// use arm_scan_lib::init_tracing;
///
/// fn main() {
///     let _guard = init_tracing();
///     // Plan and send the scan here
/// }
/// ```
pub fn init_tracing() -> DefaultGuard {
    init_tracing_with_default("info")
}

/// Same as [`init_tracing`] with a caller-chosen fallback filter, used when
/// `RUST_LOG` is unset or invalid.
pub fn init_tracing_with_default(default_filter: &str) -> DefaultGuard {
    use tracing_subscriber::layer::SubscriberExt;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(fmt_layer);

    tracing::subscriber::set_default(subscriber)
}
