//! Structured logging with tracing.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LogConfig;
use crate::errors::{ExporterError, Result};

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|err| ExporterError::Logging(err.to_string()))?;

    let registry = Registry::default().with(filter);
    let installed = if config.json_format {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.map_err(|err| ExporterError::Logging(err.to_string()))?;
    tracing::info!(level = %config.level, "logging initialized");
    Ok(())
}
