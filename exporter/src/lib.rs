//! Prometheus exporter for Lightning node state.
//!
//! The crate maps the snapshot produced by `adapters::NodeStatsClient` onto a
//! fixed set of gauge families. Serving the metrics over HTTP and parsing
//! flags are left to the host process.

pub mod collector;
pub mod config;
pub mod errors;
pub mod logging;
pub mod services;

pub use collector::{encode_text, MetricDescriptor, MetricKind, MetricSample, MetricsCollector};
pub use config::{ExporterConfig, LogConfig};
pub use errors::{ExporterError, Result};
