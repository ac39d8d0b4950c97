//! Logging setup
//!
//! The library only emits `tracing` events, each client inside its own
//! `intranet` span carrying school and user. Applications that want those
//! events on stderr can install the subscriber below.

use crate::{Error, Result, config::LoggingSettings};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for `settings`: `debug` when verbose, otherwise the
/// configured level
pub fn filter_directive(settings: &LoggingSettings) -> String {
    if settings.verbose {
        "debug".to_string()
    } else {
        settings.level.clone()
    }
}

/// Install a global stderr subscriber. `RUST_LOG` wins over `settings`.
///
/// # Errors
///
/// [`Error::Config`] if a global subscriber is already installed.
pub fn init(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(settings)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| Error::config(format!("Logging already initialised: {}", e)))
}
