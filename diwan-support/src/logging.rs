//! Structured logging bootstrap.
//!
//! The container crates only emit `tracing` events. Applications decide
//! where they go; this helper covers the common case of a formatted
//! stderr subscriber filtered by an environment variable.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive (e.g. `diwan=trace`).
pub const LOG_ENV: &str = "DIWAN_LOG";

/// Installs a global `fmt` subscriber.
///
/// The filter is read from [`LOG_ENV`], falling back to `default_filter`.
/// Returns `false` if a global subscriber was already installed, which
/// makes this safe to call from several tests or entry points.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let _ = init_tracing("warn");
        assert!(!init_tracing("warn"));
    }
}
