//! LND-specific adapter implementation for Lightning Network node interactions.
//!
//! This file contains the concrete implementation of the `NodeAdapter` trait for LND,
//! including the connection parameters, the gRPC client wrapper and the conversion
//! of `lnrpc` messages into the crate's response models.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tonic_lnd::lnrpc::{self, pending_channels_response};
use tonic_lnd::Client;
use tracing::debug;

use crate::errors::{BoxError, LightningError};
use crate::models::{
    GetInfoResponse, PendingChannel, PendingChannelsResponse, WalletBalanceResponse,
};
use crate::NodeAdapter;

/// Where and how to reach an LND node.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LndConnection {
    /// `https://host:port` of the gRPC listener.
    pub address: String,
    pub cert: PathBuf,
    pub macaroon: PathBuf,
}

pub struct LndNode {
    client: Client,
}

impl LndNode {
    /// Dials the node. TLS and macaroon handling are left to `tonic_lnd`.
    pub async fn connect(connection: LndConnection) -> Result<Self, LightningError> {
        debug!(address = %connection.address, "dialing lnd");

        let client = tonic_lnd::connect(connection.address, connection.cert, connection.macaroon)
            .await
            .map_err(|err| LightningError::ConnectError(err.to_string()))?;

        Ok(Self { client })
    }
}

fn convert_channel(
    channel: Option<&pending_channels_response::PendingChannel>,
) -> Result<PendingChannel, BoxError> {
    let channel = channel.ok_or("pending channel entry without channel record")?;

    Ok(PendingChannel {
        remote_node_pub: channel.remote_node_pub.clone(),
        channel_point: channel.channel_point.clone(),
        capacity: channel.capacity,
        local_balance: channel.local_balance,
    })
}

#[async_trait]
impl NodeAdapter for LndNode {
    async fn wallet_balance(&mut self) -> Result<WalletBalanceResponse, BoxError> {
        let resp = self
            .client
            .lightning()
            .wallet_balance(lnrpc::WalletBalanceRequest::default())
            .await?
            .into_inner();

        Ok(WalletBalanceResponse {
            total_balance: resp.total_balance,
            confirmed_balance: resp.confirmed_balance,
            unconfirmed_balance: resp.unconfirmed_balance,
        })
    }

    async fn get_info(&mut self) -> Result<GetInfoResponse, BoxError> {
        let resp = self
            .client
            .lightning()
            .get_info(lnrpc::GetInfoRequest::default())
            .await?
            .into_inner();

        Ok(GetInfoResponse {
            identity_pubkey: resp.identity_pubkey,
            alias: resp.alias,
            num_peers: resp.num_peers,
            num_active_channels: resp.num_active_channels,
            num_inactive_channels: resp.num_inactive_channels,
            num_pending_channels: resp.num_pending_channels,
            block_height: resp.block_height,
            synced_to_chain: resp.synced_to_chain,
        })
    }

    async fn pending_channels(&mut self) -> Result<PendingChannelsResponse, BoxError> {
        let resp = self
            .client
            .lightning()
            .pending_channels(lnrpc::PendingChannelsRequest::default())
            .await?
            .into_inner();

        Ok(PendingChannelsResponse {
            total_limbo_balance: resp.total_limbo_balance,
            pending_open_channels: resp
                .pending_open_channels
                .iter()
                .map(|c| convert_channel(c.channel.as_ref()))
                .collect::<Result<_, _>>()?,
            pending_closing_channels: resp
                .pending_closing_channels
                .iter()
                .map(|c| convert_channel(c.channel.as_ref()))
                .collect::<Result<_, _>>()?,
            pending_force_closing_channels: resp
                .pending_force_closing_channels
                .iter()
                .map(|c| convert_channel(c.channel.as_ref()))
                .collect::<Result<_, _>>()?,
            waiting_close_channels: resp
                .waiting_close_channels
                .iter()
                .map(|c| convert_channel(c.channel.as_ref()))
                .collect::<Result<_, _>>()?,
        })
    }
}
