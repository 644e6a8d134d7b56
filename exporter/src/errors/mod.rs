//! Global exporter error types.
//!
//! Only startup paths return these. Failures during a scrape are logged by
//! the collector and never surface as an `ExporterError`.

use adapters::LightningError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Construction(#[from] LightningError),

    #[error("invalid metric descriptor: {0}")]
    Descriptor(#[from] prometheus::Error),

    #[error("failed to encode metrics: {0}")]
    Encode(String),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
