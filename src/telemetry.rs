//! Log subscriber installation for binaries.
//!
//! Library code only emits `tracing` events; binaries call [`init`] once at
//! start-up to route them to stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "CPI_LOG";
/// Filter used when [`LOG_ENV_VAR`] is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Builds the filter from [`LOG_ENV_VAR`], falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a formatting subscriber writing to stderr.
///
/// A subscriber that is already installed is left in place.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
