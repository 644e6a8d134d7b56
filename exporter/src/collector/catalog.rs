//! Static catalog of the metric families the exporter publishes.
//!
//! The table order is the emission order of a scrape.

use std::collections::HashMap;
use std::sync::Arc;

use prometheus::core::Desc;

use crate::errors::Result;

/// One metric family exported per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    WalletBalance,
    Peers,
    Channels,
    BlockHeight,
    SyncedToChain,
    ChannelLimboBalance,
    ChannelPending,
    ChannelWaitingClose,
}

struct MetricSpec {
    kind: MetricKind,
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
}

// Entries must stay in `MetricKind` declaration order.
const METRICS: [MetricSpec; 8] = [
    MetricSpec {
        kind: MetricKind::WalletBalance,
        name: "wallet_balance_satoshis_total",
        help: "Wallet balance in satoshis by confirmation status.",
        labels: &["status"],
    },
    MetricSpec {
        kind: MetricKind::Peers,
        name: "peers",
        help: "Number of connected peers.",
        labels: &[],
    },
    MetricSpec {
        kind: MetricKind::Channels,
        name: "channels",
        help: "Number of channels by status.",
        labels: &["status"],
    },
    MetricSpec {
        kind: MetricKind::BlockHeight,
        name: "block_height",
        help: "Height of the best block known to the node.",
        labels: &[],
    },
    MetricSpec {
        kind: MetricKind::SyncedToChain,
        name: "synced_to_chain",
        help: "Whether the node is synced to the chain (1) or not (0).",
        labels: &[],
    },
    MetricSpec {
        kind: MetricKind::ChannelLimboBalance,
        name: "channel_limbo_balance_satoshis",
        help: "Balance in satoshis held in pending channels.",
        labels: &[],
    },
    MetricSpec {
        kind: MetricKind::ChannelPending,
        name: "channel_pending",
        help: "Number of pending channels by status and whether the close is forced.",
        labels: &["status", "forced"],
    },
    MetricSpec {
        kind: MetricKind::ChannelWaitingClose,
        name: "channel_waiting_close",
        help: "Number of channels waiting for their closing transaction to confirm.",
        labels: &[],
    },
];

/// Joins namespace and name the way Prometheus client libraries do.
pub fn build_fq_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}_{name}")
    }
}

/// Immutable description of one metric family.
#[derive(Debug, Clone)]
pub struct MetricDescriptor {
    kind: MetricKind,
    desc: Desc,
}

impl MetricDescriptor {
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Fully-qualified metric name.
    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    pub fn help(&self) -> &str {
        &self.desc.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.desc.variable_labels
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }
}

impl PartialEq for MetricDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name() == other.name()
            && self.help() == other.help()
            && self.label_names() == other.label_names()
    }
}

pub struct Catalog {
    descriptors: Vec<Arc<MetricDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Builds every descriptor under `namespace`, validating the names.
    pub fn new(namespace: &str) -> Result<Self> {
        let mut descriptors = Vec::with_capacity(METRICS.len());
        let mut by_name = HashMap::with_capacity(METRICS.len());

        for spec in &METRICS {
            let desc = Desc::new(
                build_fq_name(namespace, spec.name),
                spec.help.to_string(),
                spec.labels.iter().map(|l| l.to_string()).collect(),
                HashMap::new(),
            )?;
            by_name.insert(desc.fq_name.clone(), descriptors.len());
            descriptors.push(Arc::new(MetricDescriptor {
                kind: spec.kind,
                desc,
            }));
        }

        Ok(Self {
            descriptors,
            by_name,
        })
    }

    pub fn get(&self, kind: MetricKind) -> &Arc<MetricDescriptor> {
        &self.descriptors[kind as usize]
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<MetricDescriptor>> {
        self.by_name.get(name).map(|&i| &self.descriptors[i])
    }

    pub fn descriptors(&self) -> &[Arc<MetricDescriptor>] {
        &self.descriptors
    }
}
