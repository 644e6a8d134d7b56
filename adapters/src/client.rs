//! Client that samples node state through a [`NodeAdapter`].
//!
//! The client owns the adapter and is the only thing that issues RPC calls on
//! it. Construction performs one full fetch so that a wrong address, a bad
//! credential or a node that answers with garbage is reported at startup
//! instead of on the first scrape.

use secp256k1::PublicKey;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::{LightningError, RpcCall};
use crate::models::{
    GetInfoResponse, NodeInfo, NodeSnapshot, PendingChannels, WalletBalances,
};
use crate::NodeAdapter;

/// Maps the node's synced flag onto a metric value.
pub fn synced_flag(synced: bool) -> u8 {
    if synced {
        1
    } else {
        0
    }
}

pub struct NodeStatsClient<A> {
    adapter: Mutex<A>,
}

impl<A: NodeAdapter> NodeStatsClient<A> {
    /// Wraps `adapter` after checking that a full snapshot can be fetched.
    pub async fn new(adapter: A) -> Result<Self, LightningError> {
        let client = Self {
            adapter: Mutex::new(adapter),
        };

        let snapshot = client
            .fetch_snapshot()
            .await
            .map_err(|err| LightningError::ConnectionError(Box::new(err)))?;

        info!(
            identity = %snapshot.info.identity,
            block_height = snapshot.info.block_height,
            "connected to lightning node"
        );

        Ok(client)
    }

    /// Fetches wallet, node-info and pending-channel state in one go.
    ///
    /// The adapter is held for all three calls so no other fetch can slip in
    /// between them. The first failing call fails the whole fetch.
    pub async fn fetch_snapshot(&self) -> Result<NodeSnapshot, LightningError> {
        let mut adapter = self.adapter.lock().await;

        let wallet = wallet_balances(&mut *adapter).await?;
        let info = node_info(&mut *adapter).await?;
        let pending = pending_channels(&mut *adapter).await?;

        debug!(
            peers = info.peers,
            block_height = info.block_height,
            "fetched node snapshot"
        );

        Ok(NodeSnapshot {
            wallet,
            info,
            pending,
        })
    }

    pub async fn fetch_wallet_balances(&self) -> Result<WalletBalances, LightningError> {
        let mut adapter = self.adapter.lock().await;
        wallet_balances(&mut *adapter).await
    }

    pub async fn fetch_node_info(&self) -> Result<NodeInfo, LightningError> {
        let mut adapter = self.adapter.lock().await;
        node_info(&mut *adapter).await
    }

    pub async fn fetch_pending_channels(&self) -> Result<PendingChannels, LightningError> {
        let mut adapter = self.adapter.lock().await;
        pending_channels(&mut *adapter).await
    }
}

async fn wallet_balances<A: NodeAdapter>(adapter: &mut A) -> Result<WalletBalances, LightningError> {
    let resp = adapter
        .wallet_balance()
        .await
        .map_err(|err| LightningError::remote(RpcCall::WalletBalance, err))?;

    Ok(WalletBalances::from(resp))
}

async fn node_info<A: NodeAdapter>(adapter: &mut A) -> Result<NodeInfo, LightningError> {
    let resp = adapter
        .get_info()
        .await
        .map_err(|err| LightningError::remote(RpcCall::GetInfo, err))?;

    convert_node_info(resp)
}

async fn pending_channels<A: NodeAdapter>(
    adapter: &mut A,
) -> Result<PendingChannels, LightningError> {
    let resp = adapter
        .pending_channels()
        .await
        .map_err(|err| LightningError::remote(RpcCall::PendingChannels, err))?;

    Ok(PendingChannels::from(&resp))
}

/// Parses the hex identity key reported by the node.
fn parse_identity(identity_pubkey: &str) -> Result<PublicKey, LightningError> {
    let malformed =
        |err: &dyn std::fmt::Display| LightningError::remote(RpcCall::GetInfo, format!("identity_pubkey: {err}"));

    let bytes = hex::decode(identity_pubkey).map_err(|err| malformed(&err))?;
    PublicKey::from_slice(&bytes).map_err(|err| malformed(&err))
}

fn convert_node_info(resp: GetInfoResponse) -> Result<NodeInfo, LightningError> {
    Ok(NodeInfo {
        identity: parse_identity(&resp.identity_pubkey)?,
        peers: resp.num_peers,
        active_channels: resp.num_active_channels,
        inactive_channels: resp.num_inactive_channels,
        pending_channels: resp.num_pending_channels,
        block_height: resp.block_height,
        synced_to_chain: synced_flag(resp.synced_to_chain),
    })
}
