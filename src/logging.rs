//! Logging setup for binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the application.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "TABSURFACE_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install a fmt subscriber filtered by `TABSURFACE_LOG` (default `info`).
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
