//! Tracing setup for memoduet
//!
//! Logs go to stderr so a memo printed on stdout stays clean. `RUST_LOG`
//! wins over the verbosity flags when set.

use crate::cli::Verbosity;
use crate::errors::{DialogueError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG`, falling back to the verbosity level
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()))
}

/// Initialize the global tracing subscriber
pub fn init_tracing(verbosity: Verbosity, json: bool) -> Result<()> {
    let filter = env_filter(verbosity);

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(verbosity == Verbosity::VeryVerbose)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| DialogueError::Generic(format!("Failed to initialize tracing: {}", e)))?;

    tracing::debug!(verbosity = verbosity.as_str(), json, "tracing initialized");
    Ok(())
}
