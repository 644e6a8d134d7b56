//! Scripted in-memory node for tests.
//!
//! A `MockNode` answers every query from canned responses that the test can
//! change at any time through a clone of the same handle. Individual calls
//! can be made to fail, and every call is recorded in order.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{BoxError, RpcCall};
use crate::models::{GetInfoResponse, PendingChannelsResponse, WalletBalanceResponse};
use crate::NodeAdapter;

/// Compressed generator point, a valid secp256k1 public key.
pub const TEST_IDENTITY: &str =
    "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

#[derive(Default)]
struct State {
    wallet: WalletBalanceResponse,
    info: GetInfoResponse,
    pending: PendingChannelsResponse,
    failing: HashSet<RpcCall>,
    calls: Vec<RpcCall>,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct MockNode {
    state: Arc<Mutex<State>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockNode {
    /// A synced node with a valid identity and otherwise empty state.
    pub fn new() -> Self {
        let node = MockNode::default();
        node.set_info(GetInfoResponse {
            identity_pubkey: TEST_IDENTITY.to_string(),
            alias: "mock".to_string(),
            synced_to_chain: true,
            ..Default::default()
        });
        node
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn set_wallet(&self, wallet: WalletBalanceResponse) {
        self.state().wallet = wallet;
    }

    pub fn set_info(&self, info: GetInfoResponse) {
        self.state().info = info;
    }

    pub fn info(&self) -> GetInfoResponse {
        self.state().info.clone()
    }

    pub fn set_pending(&self, pending: PendingChannelsResponse) {
        self.state().pending = pending;
    }

    /// Makes every later `call` fail until [`MockNode::recover`].
    pub fn fail(&self, call: RpcCall) {
        self.state().failing.insert(call);
    }

    pub fn recover(&self, call: RpcCall) {
        self.state().failing.remove(&call);
    }

    /// Delays every answer, to widen windows in concurrency tests.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<RpcCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Highest number of calls that were ever running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, call: RpcCall) -> Result<(), BoxError> {
        let _running = InFlight::enter(&self.in_flight, &self.max_in_flight);

        let (delay, failing) = {
            let mut state = self.state();
            state.calls.push(call);
            (state.delay, state.failing.contains(&call))
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if failing {
            return Err(format!("mock {call} unavailable").into());
        }
        Ok(())
    }
}

/// Counts a running call until dropped, including when the call is cancelled.
struct InFlight<'a> {
    count: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(count: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let running = count.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(running, Ordering::SeqCst);
        Self { count }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl NodeAdapter for MockNode {
    async fn wallet_balance(&mut self) -> Result<WalletBalanceResponse, BoxError> {
        self.answer(RpcCall::WalletBalance).await?;
        Ok(self.state().wallet.clone())
    }

    async fn get_info(&mut self) -> Result<GetInfoResponse, BoxError> {
        self.answer(RpcCall::GetInfo).await?;
        Ok(self.state().info.clone())
    }

    async fn pending_channels(&mut self) -> Result<PendingChannelsResponse, BoxError> {
        self.answer(RpcCall::PendingChannels).await?;
        Ok(self.state().pending.clone())
    }
}
