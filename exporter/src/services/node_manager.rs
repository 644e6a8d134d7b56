//! Connects the exporter to an LND node.
//!
//! Builds the `LndConnection` from the exporter configuration, dials the node
//! and wraps it in a validated `NodeStatsClient` and `MetricsCollector`. Any
//! failure here is a startup failure.

use adapters::lnd::{LndConnection, LndNode};
use adapters::NodeStatsClient;
use tracing::info;

use crate::collector::MetricsCollector;
use crate::config::ExporterConfig;
use crate::errors::Result;

pub fn lnd_connection(config: &ExporterConfig) -> LndConnection {
    LndConnection {
        address: config.rpc_address(),
        cert: config.tls_cert_path.clone(),
        macaroon: config.macaroon_path.clone(),
    }
}

pub async fn connect_lnd(config: &ExporterConfig) -> Result<MetricsCollector<LndNode>> {
    config.validate()?;

    let node = LndNode::connect(lnd_connection(config)).await?;
    let client = NodeStatsClient::new(node).await?;
    let collector = MetricsCollector::new(client, config)?;

    info!(
        address = %config.rpc_address(),
        namespace = %config.namespace,
        "lightning collector ready"
    );
    Ok(collector)
}
