//! Process-wide log output.

use kunai_core::config::LoggingConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Installs the global `tracing` subscriber with the configured level.
///
/// `level` accepts any `EnvFilter` directive, such as `info` or
/// `kunai_db=debug,kunai_db::sql=trace`.
///
/// ## Errors
/// Returns [`ServiceError::InvalidConfiguration`] if the level is not a valid
/// directive or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> ServiceResult<()> {
    let filter = EnvFilter::try_new(config.level.as_str()).map_err(|e| {
        ServiceError::InvalidConfiguration(format!("invalid log level {:?}: {e}", config.level))
    })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
        .try_init()
        .map_err(|e| ServiceError::InvalidConfiguration(format!("logging already initialized: {e}")))?;

    tracing::debug!(level = %config.level, "Logging initialized");

    Ok(())
}
