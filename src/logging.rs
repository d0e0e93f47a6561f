//! Tracing subscriber setup for the binary.
//!
//! Level precedence: explicit level (CLI or settings file) > `RUST_LOG` >
//! `warn`. Logs go to stderr so report output on stdout stays parseable.

use crate::settings::DEFAULT_LOG_LEVEL;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter for `level`, falling back to the environment.
pub fn filter_for(level: Option<&str>) -> EnvFilter {
    if let Some(level) = level {
        match EnvFilter::try_new(level) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("invalid log level '{}': {}", level, e),
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(level: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(filter_for(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
