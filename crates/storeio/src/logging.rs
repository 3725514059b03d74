//! `tracing-subscriber` initializer for binaries and tests, matching the
//! teacher's and `fraiseql-wire`'s use of an `EnvFilter`-based subscriber.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber reading its filter from
/// `RUST_LOG` (default: `info`). Safe to call more than once; subsequent
/// calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}
