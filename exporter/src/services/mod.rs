//! Module for startup services.
//!
//! These services wire configuration, node adapters and the collector
//! together when the exporter is hosted against a real node.

#[cfg(feature = "lnd")]
pub mod node_manager;
