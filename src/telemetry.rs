//! Tracing subscriber initialisation.

use crate::config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive is invalid.
    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser failure.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over [`LoggingConfig::level`].
///
/// # Errors
///
/// Returns [`TelemetryError`] when the directive does not parse or a
/// subscriber is already installed.
pub fn init_tracing(logging: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&logging.level).map_err(|source| TelemetryError::InvalidFilter {
            directive: logging.level.clone(),
            source,
        })
    })?;

    if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }
    Ok(())
}
