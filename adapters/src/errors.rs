//! Custom error types specific to the `adapters` crate.
//!
//! This module defines errors that can occur during node connection, RPC calls,
//! or data conversions within the adapter layer, providing a unified error
//! handling mechanism for all node interactions.

use std::fmt;

use thiserror::Error;

/// Opaque error returned by a [`NodeAdapter`](crate::NodeAdapter) call.
///
/// The transport decides what goes in here (a `tonic::Status`, an I/O error,
/// a malformed-response message); callers only ever display or wrap it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The RPC queries issued against a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcCall {
    WalletBalance,
    GetInfo,
    PendingChannels,
}

impl fmt::Display for RpcCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RpcCall::WalletBalance => "WalletBalance",
            RpcCall::GetInfo => "GetInfo",
            RpcCall::PendingChannels => "PendingChannels",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum LightningError {
    /// The initial fetch performed while constructing a client failed.
    #[error("failed to create lightning client")]
    ConnectionError(#[source] Box<LightningError>),

    /// A single RPC failed or returned data that could not be mapped.
    ///
    /// The transport error is opaque, so it is rendered into the message
    /// rather than exposed as a source.
    #[error("{call} rpc failed: {reason}")]
    RemoteError { call: RpcCall, reason: BoxError },

    /// The transport to the node could not be set up.
    #[error("could not connect to node: {0}")]
    ConnectError(String),
}

impl LightningError {
    pub fn remote(call: RpcCall, reason: impl Into<BoxError>) -> Self {
        LightningError::RemoteError {
            call,
            reason: reason.into(),
        }
    }

    /// The RPC that failed, if this error came from one.
    pub fn failed_call(&self) -> Option<RpcCall> {
        match self {
            LightningError::ConnectionError(inner) => inner.failed_call(),
            LightningError::RemoteError { call, .. } => Some(*call),
            LightningError::ConnectError(_) => None,
        }
    }
}
