use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use adapters::mock::MockNode;
use adapters::{
    GetInfoResponse, LightningError, NodeStatsClient, PendingChannel, PendingChannelsResponse,
    RpcCall, WalletBalanceResponse,
};
use exporter::collector::to_metric_families;
use exporter::{encode_text, ExporterConfig, MetricSample, MetricsCollector};
use prometheus::Registry;

fn busy_node() -> MockNode {
    let node = MockNode::new();
    node.set_wallet(WalletBalanceResponse {
        total_balance: 500,
        confirmed_balance: 400,
        unconfirmed_balance: 100,
    });
    let mut info = node.info();
    info.num_peers = 8;
    info.num_active_channels = 5;
    info.num_pending_channels = 6;
    info.num_inactive_channels = 1;
    info.block_height = 840_000;
    node.set_info(info);
    node.set_pending(PendingChannelsResponse {
        total_limbo_balance: 250_000,
        pending_open_channels: vec![PendingChannel::default(); 3],
        pending_closing_channels: vec![PendingChannel::default()],
        pending_force_closing_channels: vec![PendingChannel::default(); 2],
        waiting_close_channels: vec![PendingChannel::default(); 4],
    });
    node
}

async fn collector_for(node: &MockNode) -> MetricsCollector<MockNode> {
    let client = NodeStatsClient::new(node.clone()).await.unwrap();
    MetricsCollector::new(client, &ExporterConfig::default()).unwrap()
}

fn values_of<'a>(samples: &'a [MetricSample], name: &str) -> Vec<(f64, Vec<&'a str>)> {
    samples
        .iter()
        .filter(|s| s.name() == name)
        .map(|s| (s.value, s.label_values.iter().map(String::as_str).collect()))
        .collect()
}

#[tokio::test]
async fn wallet_emits_confirmed_and_unconfirmed_only() {
    let node = busy_node();
    let collector = collector_for(&node).await;

    let samples = collector.collect_samples().await;
    assert_eq!(
        values_of(&samples, "lnd_wallet_balance_satoshis_total"),
        vec![(400.0, vec!["confirmed"]), (100.0, vec!["unconfirmed"])]
    );
    assert!(samples.iter().all(|s| s.value != 500.0));
}

#[tokio::test]
async fn pending_channels_are_counted_per_status() {
    let node = busy_node();
    let collector = collector_for(&node).await;

    let samples = collector.collect_samples().await;
    assert_eq!(
        values_of(&samples, "lnd_channel_pending"),
        vec![
            (3.0, vec!["opening", "false"]),
            (1.0, vec!["closing", "false"]),
            (2.0, vec!["closing", "true"]),
        ]
    );
    assert_eq!(values_of(&samples, "lnd_channel_waiting_close"), vec![(4.0, vec![])]);
    assert_eq!(
        values_of(&samples, "lnd_channel_limbo_balance_satoshis"),
        vec![(250_000.0, vec![])]
    );
}

#[tokio::test]
async fn node_info_is_mapped() {
    let node = busy_node();
    let collector = collector_for(&node).await;

    let samples = collector.collect_samples().await;
    assert_eq!(values_of(&samples, "lnd_peers"), vec![(8.0, vec![])]);
    assert_eq!(
        values_of(&samples, "lnd_channels"),
        vec![
            (5.0, vec!["active"]),
            (6.0, vec!["pending"]),
            (1.0, vec!["inactive"]),
        ]
    );
    assert_eq!(values_of(&samples, "lnd_block_height"), vec![(840_000.0, vec![])]);
    assert_eq!(values_of(&samples, "lnd_synced_to_chain"), vec![(1.0, vec![])]);

    let mut info = node.info();
    info.synced_to_chain = false;
    node.set_info(info);
    let samples = collector.collect_samples().await;
    assert_eq!(values_of(&samples, "lnd_synced_to_chain"), vec![(0.0, vec![])]);
}

#[tokio::test]
async fn repeated_scrapes_are_identical() {
    let node = busy_node();
    let collector = collector_for(&node).await;

    let first = collector.collect_samples().await;
    let second = collector.collect_samples().await;
    assert_eq!(first, second);
    assert_eq!(
        encode_text(&to_metric_families(&first)).unwrap(),
        encode_text(&to_metric_families(&second)).unwrap()
    );
}

#[tokio::test]
async fn collected_names_are_described() {
    let node = busy_node();
    let collector = collector_for(&node).await;

    let described: HashSet<String> = collector
        .describe_all()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let again: HashSet<String> = collector
        .describe_all()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    assert_eq!(described, again);
    assert_eq!(described.len(), 8);

    for sample in collector.collect_samples().await {
        assert!(described.contains(sample.name()), "{} not described", sample.name());
        assert_eq!(sample.label_values.len(), sample.descriptor.label_names().len());
    }
}

#[tokio::test]
async fn failed_scrape_is_empty_and_next_one_recovers() {
    let node = busy_node();
    let collector = collector_for(&node).await;

    node.fail(RpcCall::WalletBalance);
    assert!(collector.collect_samples().await.is_empty());

    node.recover(RpcCall::WalletBalance);
    assert_eq!(collector.collect_samples().await.len(), 13);
}

#[tokio::test]
async fn any_failed_call_suppresses_all_metrics() {
    for call in [RpcCall::WalletBalance, RpcCall::GetInfo, RpcCall::PendingChannels] {
        let node = busy_node();
        let collector = collector_for(&node).await;

        node.fail(call);
        assert!(collector.collect_samples().await.is_empty(), "{call} leaked samples");
        assert!(collector.gather().await.is_empty());
    }
}

#[tokio::test]
async fn unreachable_node_fails_construction() {
    let node = busy_node();
    node.fail(RpcCall::WalletBalance);

    let err = NodeStatsClient::new(node).await.err().unwrap();
    assert!(matches!(err, LightningError::ConnectionError(_)));
}

#[tokio::test]
async fn malformed_info_empties_the_scrape() {
    let node = busy_node();
    let collector = collector_for(&node).await;

    node.set_info(GetInfoResponse {
        identity_pubkey: "zz".to_string(),
        ..Default::default()
    });
    assert!(collector.collect_samples().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scrapes_do_not_interleave() {
    let node = busy_node();
    let collector = Arc::new(collector_for(&node).await);
    node.clear_calls();
    node.set_delay(Duration::from_millis(10));

    let scrapes: Vec<_> = (0..4)
        .map(|_| {
            let collector = collector.clone();
            tokio::spawn(async move { collector.collect_samples().await })
        })
        .collect();
    for scrape in scrapes {
        assert_eq!(scrape.await.unwrap().len(), 13);
    }

    assert_eq!(node.max_in_flight(), 1);
    let calls = node.calls();
    assert_eq!(calls.len(), 12);
    for chunk in calls.chunks(3) {
        assert_eq!(
            chunk,
            &[RpcCall::WalletBalance, RpcCall::GetInfo, RpcCall::PendingChannels]
        );
    }
}

#[tokio::test]
async fn exposition_lists_every_family() {
    let node = busy_node();
    let collector = collector_for(&node).await;

    let families = collector.gather().await;
    assert_eq!(families.len(), 8);

    let text = encode_text(&families).unwrap();
    assert!(text.contains("# TYPE lnd_peers gauge"));
    assert!(text.contains("lnd_wallet_balance_satoshis_total{status=\"confirmed\"} 400"));
    assert!(text.contains("lnd_channel_pending{status=\"closing\",forced=\"true\"} 2"));
    assert!(text.contains("lnd_block_height 840000"));
}

#[tokio::test]
async fn namespace_prefixes_names() {
    let node = busy_node();
    let client = NodeStatsClient::new(node.clone()).await.unwrap();
    let config = ExporterConfig {
        namespace: "alice".to_string(),
        ..Default::default()
    };
    let collector = MetricsCollector::new(client, &config).unwrap();

    let samples = collector.collect_samples().await;
    assert!(samples.iter().all(|s| s.name().starts_with("alice_")));
    assert_eq!(samples[0].label("status"), Some("confirmed"));
}

/// Sink that logs which scrape pushed each sample and pauses on every push.
struct SlowSink {
    scrape: usize,
    log: Arc<Mutex<Vec<usize>>>,
}

impl Extend<MetricSample> for SlowSink {
    fn extend<I: IntoIterator<Item = MetricSample>>(&mut self, samples: I) {
        for _ in samples {
            self.log.lock().unwrap().push(self.scrape);
            thread::sleep(Duration::from_millis(5));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scrape_emission_is_not_interleaved() {
    let node = busy_node();
    let collector = Arc::new(collector_for(&node).await);
    node.set_delay(Duration::from_millis(1));
    let log = Arc::new(Mutex::new(Vec::new()));

    let scrapes: Vec<_> = (0..2)
        .map(|scrape| {
            let collector = collector.clone();
            let mut sink = SlowSink {
                scrape,
                log: log.clone(),
            };
            tokio::spawn(async move { collector.collect_into(&mut sink).await })
        })
        .collect();
    for scrape in scrapes {
        scrape.await.unwrap();
    }

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 26);
    // One scrape's samples all come before the other's.
    let switches = log.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(switches, 1, "scrapes interleaved: {log:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn registry_gathers_through_collector() {
    let node = busy_node();
    let registry = Registry::new();
    registry
        .register(Box::new(collector_for(&node).await))
        .unwrap();

    let families = registry.gather();
    assert_eq!(families.len(), 8);
    let pending = families
        .iter()
        .find(|f| f.get_name() == "lnd_channel_pending")
        .unwrap();
    assert_eq!(pending.get_metric().len(), 3);

    node.fail(RpcCall::GetInfo);
    assert!(registry.gather().is_empty());

    node.recover(RpcCall::GetInfo);
    assert_eq!(registry.gather().len(), 8);
}

#[test]
fn registry_gathers_outside_a_runtime() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let node = busy_node();
    let collector = runtime.block_on(collector_for(&node));
    drop(runtime);

    let registry = Registry::new();
    registry.register(Box::new(collector)).unwrap();
    assert_eq!(registry.gather().len(), 8);
}
