//! Prometheus-style collector over a Lightning node.
//!
//! The collector implements the two operations a pull-based registry expects
//! from a plugin: describing the fixed set of metric families, and sampling
//! them. Each scrape fetches one fresh [`NodeSnapshot`] and maps it onto
//! gauge samples in catalog order. A failed fetch is logged and yields an
//! empty scrape; the error never reaches the registry.

pub mod catalog;
pub mod sample;

use std::iter;
use std::sync::Arc;

use adapters::{NodeAdapter, NodeSnapshot, NodeStatsClient};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use tokio::runtime::{Builder, Handle, RuntimeFlavor};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub use catalog::{build_fq_name, Catalog, MetricDescriptor, MetricKind};
pub use sample::{encode_text, to_metric_families, MetricSample};

use crate::config::ExporterConfig;
use crate::errors::Result;

pub struct MetricsCollector<A> {
    client: NodeStatsClient<A>,
    catalog: Catalog,
    // Held for a whole scrape so concurrent scrapes never interleave.
    scrape_lock: Mutex<()>,
}

impl<A: NodeAdapter> MetricsCollector<A> {
    pub fn new(client: NodeStatsClient<A>, config: &ExporterConfig) -> Result<Self> {
        Ok(Self {
            client,
            catalog: Catalog::new(&config.namespace)?,
            scrape_lock: Mutex::new(()),
        })
    }

    /// Every family this collector can emit, whatever the node state.
    pub fn describe_all(&self) -> &[Arc<MetricDescriptor>] {
        self.catalog.descriptors()
    }

    pub fn descs(&self) -> Vec<&Desc> {
        self.catalog.descriptors().iter().map(|d| d.desc()).collect()
    }

    /// Runs one scrape, pushing samples into `sink` one at a time.
    ///
    /// Nothing is pushed if fetching the snapshot fails.
    pub async fn collect_into<S: Extend<MetricSample>>(&self, sink: &mut S) {
        let _scrape = self.scrape_lock.lock().await;

        let snapshot = match self.client.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "error getting node stats, skipping scrape");
                return;
            }
        };

        let emitted = emit_snapshot(&self.catalog, &snapshot, sink);
        debug!(samples = emitted, "scrape complete");
    }

    pub async fn collect_samples(&self) -> Vec<MetricSample> {
        let mut samples = Vec::new();
        self.collect_into(&mut samples).await;
        samples
    }

    /// Runs one scrape and returns it as Prometheus metric families.
    pub async fn gather(&self) -> Vec<MetricFamily> {
        to_metric_families(&self.collect_samples().await)
    }
}

/// Lets a `prometheus::Registry` drive scrapes.
///
/// The registry calls `collect` synchronously. Inside a multi-thread runtime
/// the scrape runs on the current runtime via `block_in_place`; outside any
/// runtime a throwaway current-thread runtime is used. A current-thread
/// runtime cannot be blocked on, so such a scrape is skipped.
impl<A: NodeAdapter + 'static> Collector for MetricsCollector<A> {
    fn desc(&self) -> Vec<&Desc> {
        self.descs()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                warn!("cannot scrape from a current-thread runtime, skipping scrape");
                Vec::new()
            }
            Ok(handle) => tokio::task::block_in_place(|| handle.block_on(self.gather())),
            Err(_) => match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(self.gather()),
                Err(err) => {
                    warn!(error = %err, "could not start runtime for scrape, skipping scrape");
                    Vec::new()
                }
            },
        }
    }
}

fn emit_snapshot<S: Extend<MetricSample>>(
    catalog: &Catalog,
    snapshot: &NodeSnapshot,
    sink: &mut S,
) -> usize {
    let mut emitted = 0;
    let mut emit = |kind: MetricKind, value: f64, labels: &[&str]| {
        sink.extend(iter::once(MetricSample {
            descriptor: catalog.get(kind).clone(),
            value,
            label_values: labels.iter().map(|l| l.to_string()).collect(),
        }));
        emitted += 1;
    };

    let NodeSnapshot {
        wallet,
        info,
        pending,
    } = snapshot;

    emit(MetricKind::WalletBalance, wallet.confirmed as f64, &["confirmed"]);
    emit(MetricKind::WalletBalance, wallet.unconfirmed as f64, &["unconfirmed"]);

    emit(MetricKind::Peers, f64::from(info.peers), &[]);
    emit(MetricKind::Channels, f64::from(info.active_channels), &["active"]);
    emit(MetricKind::Channels, f64::from(info.pending_channels), &["pending"]);
    emit(MetricKind::Channels, f64::from(info.inactive_channels), &["inactive"]);
    emit(MetricKind::BlockHeight, f64::from(info.block_height), &[]);
    emit(MetricKind::SyncedToChain, f64::from(info.synced_to_chain), &[]);

    emit(MetricKind::ChannelLimboBalance, pending.limbo_balance as f64, &[]);
    emit(MetricKind::ChannelPending, pending.opening as f64, &["opening", "false"]);
    emit(MetricKind::ChannelPending, pending.closing as f64, &["closing", "false"]);
    emit(MetricKind::ChannelPending, pending.force_closing as f64, &["closing", "true"]);
    emit(MetricKind::ChannelWaitingClose, pending.waiting_close as f64, &[]);

    emitted
}
