//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::logging::LoggingConfig;
use crate::error::AppError;
use crate::AppResult;

/// Install the global tracing subscriber from the logging settings.
///
/// `RUST_LOG` takes precedence over the configured level. Fails when a
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> AppResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    result.map_err(|e| {
        AppError::configuration(format!("Failed to install tracing subscriber: {e}"))
    })
}
