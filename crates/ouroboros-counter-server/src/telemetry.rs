//! Logging setup

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Build the log filter from `RUST_LOG`, falling back to `default_level`.
///
/// The process environment is read at call time, so a `.env` file has to be
/// loaded before this runs for its `RUST_LOG` to count.
pub fn log_filter(default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level.as_str().to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global fmt subscriber
pub fn init(default_level: Level) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(default_level))
        .init();
}
