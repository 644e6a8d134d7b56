//! Core `adapters` crate for abstracting Lightning Network node interactions.
//!
//! This crate defines the `NodeAdapter` trait, the RPC surface the exporter
//! needs from a Lightning node, and the `NodeStatsClient` that turns those
//! calls into a consistent `NodeSnapshot`. Concrete implementations live
//! behind features: `lnd` for a real node over gRPC, `mock` for tests.

pub mod client;
pub mod errors;
#[cfg(feature = "lnd")]
pub mod lnd;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod models;

use async_trait::async_trait;

pub use client::{synced_flag, NodeStatsClient};
pub use errors::{BoxError, LightningError, RpcCall};
pub use models::{
    GetInfoResponse, NodeInfo, NodeSnapshot, PendingChannel, PendingChannels,
    PendingChannelsResponse, WalletBalanceResponse, WalletBalances,
};

/// The RPC queries a node must answer for its state to be sampled.
///
/// Each call is independent and takes no input. Implementations report any
/// transport or protocol failure as an opaque [`BoxError`]; they should not
/// retry.
#[async_trait]
pub trait NodeAdapter: Send {
    async fn wallet_balance(&mut self) -> Result<WalletBalanceResponse, BoxError>;

    async fn get_info(&mut self) -> Result<GetInfoResponse, BoxError>;

    async fn pending_channels(&mut self) -> Result<PendingChannelsResponse, BoxError>;
}
