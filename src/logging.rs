//! Logging setup
//!
//! Installs the global tracing subscriber. Output goes to stderr so command
//! results on stdout stay machine-readable.

use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter when neither `RUST_LOG` nor a level is supplied
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Build the filter: `RUST_LOG` wins, then `log_level`.
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Initialize tracing subscriber with the specified log level
///
/// `json` switches the stderr layer from human-readable lines to JSON.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = env_filter(log_level);
    let registry = tracing_subscriber::registry();

    if json {
        let layer = fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_filter(filter);
        registry.with(layer).init();
    } else {
        let layer = fmt::layer()
            .with_target(false)
            .with_writer(io::stderr)
            .with_filter(filter);
        registry.with(layer).init();
    }
}
