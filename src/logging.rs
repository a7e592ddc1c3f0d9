//! Structured logging setup for hosts embedding the bridge.
//!
//! The library only emits `tracing` events; nothing is installed unless the
//! embedding process calls [`init_tracing`].

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Filter used when [`LOG_LEVEL_ENV`] is unset or invalid.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Builds the filter from [`LOG_LEVEL_ENV`], falling back to `info`.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs a JSON subscriber as the global default.
///
/// Returns `false` when another global subscriber is already installed; the
/// existing subscriber is kept.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_current_span(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_is_tolerated() {
        let _first = init_tracing();
        assert!(!init_tracing());
    }
}
