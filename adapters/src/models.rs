//! Generic data models for the `adapters` crate.
//!
//! Two families live here: the response records a [`NodeAdapter`](crate::NodeAdapter)
//! returns for each RPC query, shaped after LND's `lnrpc` messages, and the
//! [`NodeSnapshot`] the client assembles from them. The snapshot is what the
//! rest of the workspace consumes; it carries no transport details.

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

/// Response of the wallet-balance query, in satoshis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletBalanceResponse {
    pub total_balance: i64,
    pub confirmed_balance: i64,
    pub unconfirmed_balance: i64,
}

/// Response of the node-info query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInfoResponse {
    /// Hex-encoded compressed secp256k1 key of the node.
    pub identity_pubkey: String,
    pub alias: String,
    pub num_peers: u32,
    pub num_active_channels: u32,
    pub num_inactive_channels: u32,
    pub num_pending_channels: u32,
    pub block_height: u32,
    pub synced_to_chain: bool,
}

/// A channel that has not reached its final open or closed state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingChannel {
    pub remote_node_pub: String,
    pub channel_point: String,
    pub capacity: i64,
    pub local_balance: i64,
}

/// Response of the pending-channels query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingChannelsResponse {
    pub total_limbo_balance: i64,
    pub pending_open_channels: Vec<PendingChannel>,
    pub pending_closing_channels: Vec<PendingChannel>,
    pub pending_force_closing_channels: Vec<PendingChannel>,
    pub waiting_close_channels: Vec<PendingChannel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletBalances {
    pub total: i64,
    pub confirmed: i64,
    pub unconfirmed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo {
    pub identity: PublicKey,
    pub peers: u32,
    pub active_channels: u32,
    pub inactive_channels: u32,
    pub pending_channels: u32,
    pub block_height: u32,
    /// `1` when the node reports itself synced to the chain, `0` otherwise.
    pub synced_to_chain: u8,
}

/// Counts of pending channels by sub-state plus the balance held in limbo.
///
/// Counts are always the lengths of the lists returned by the node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingChannels {
    pub limbo_balance: i64,
    pub opening: u64,
    pub closing: u64,
    pub force_closing: u64,
    pub waiting_close: u64,
}

/// One self-consistent read of everything the exporter samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub wallet: WalletBalances,
    pub info: NodeInfo,
    pub pending: PendingChannels,
}

impl From<WalletBalanceResponse> for WalletBalances {
    fn from(resp: WalletBalanceResponse) -> Self {
        WalletBalances {
            total: resp.total_balance,
            confirmed: resp.confirmed_balance,
            unconfirmed: resp.unconfirmed_balance,
        }
    }
}

impl From<&PendingChannelsResponse> for PendingChannels {
    fn from(resp: &PendingChannelsResponse) -> Self {
        PendingChannels {
            limbo_balance: resp.total_limbo_balance,
            opening: resp.pending_open_channels.len() as u64,
            closing: resp.pending_closing_channels.len() as u64,
            force_closing: resp.pending_force_closing_channels.len() as u64,
            waiting_close: resp.waiting_close_channels.len() as u64,
        }
    }
}
