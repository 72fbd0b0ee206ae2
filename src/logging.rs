//! Logging configuration using tracing
//!
//! Log lines go to stderr so stdout stays clean JSON for the CLI.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize the tracing subscriber
///
/// Filtering follows `RUST_LOG` (e.g. `RUST_LOG=taskhub=debug` shows cache
/// hits and misses), defaulting to [`DEFAULT_FILTER`].
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init() -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test();
        // A second install always fails, the first may have happened elsewhere
        assert!(init().is_err());
    }

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::try_new(DEFAULT_FILTER).expect("default filter is valid");
        assert_eq!(filter.to_string(), "warn");
    }
}
