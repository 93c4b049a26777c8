//! Indexing gateway client.
//!
//! # Responsibilities
//! - Build authenticated JSON-RPC envelopes against the gateway
//! - Normalize success and error shapes into `SyncResult`
//! - Keep the access credential out of logs and error messages
//!
//! This layer performs no retries: reads are idempotent and retry
//! policy, if any, belongs to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::config::GatewayConfig;
use crate::error::{SyncError, SyncResult};
use crate::indexer::types::{
    parse_quantity, AssetTransferParams, AssetTransfersResult, NftOwnershipResult, OwnedNft,
    RpcRequest, RpcResponse, TokenBalanceResult, TokenMetadata,
};
use crate::session::WalletAddress;

use alloy::primitives::U256;

/// Client for the remote indexing gateway.
#[derive(Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    /// Full endpoint including the access credential. Never logged.
    endpoint: Url,
    next_id: Arc<AtomicU64>,
    metadata_cache: Arc<DashMap<String, TokenMetadata>>,
}

impl LedgerClient {
    /// Create a client, reading the access credential from the
    /// environment variable named in the config.
    pub fn new(config: &GatewayConfig) -> SyncResult<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            SyncError::Config(format!(
                "environment variable {} not set",
                config.api_key_env
            ))
        })?;
        Self::with_credential(config, &api_key)
    }

    /// Create a client with an explicitly supplied credential.
    pub fn with_credential(config: &GatewayConfig, api_key: &str) -> SyncResult<Self> {
        let raw = format!(
            "{}/{}/{}",
            config.base_url.trim_end_matches('/'),
            config.api_version,
            api_key
        );
        let endpoint = Url::parse(&raw)
            .map_err(|e| SyncError::Config(format!("invalid gateway endpoint: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {}", e)))?;

        tracing::info!(
            base_url = %config.base_url,
            api_version = %config.api_version,
            "Ledger client initialized"
        );

        Ok(Self {
            http,
            endpoint,
            next_id: Arc::new(AtomicU64::new(1)),
            metadata_cache: Arc::new(DashMap::new()),
        })
    }

    /// Issue one JSON-RPC call and decode the `result` field.
    ///
    /// Errors carry the method name, never the endpoint URL, so the
    /// credential cannot leak through `Display`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> SyncResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::debug!(method = %method, id = id, "Gateway call");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                SyncError::Transport {
                    message: format!("{} request failed: {}", method, e),
                    status: e.status().map(|s| s.as_u16()),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Transport {
                message: format!("{} returned HTTP {}", method, status),
                status: Some(status.as_u16()),
            });
        }

        let envelope: RpcResponse<T> = response.json().await.map_err(|e| SyncError::Transport {
            message: format!("{} returned malformed payload: {}", method, e.without_url()),
            status: Some(status.as_u16()),
        })?;

        decode_envelope(method, envelope)
    }

    /// Native balance of an address at the latest block.
    pub async fn get_native_balance(&self, address: &WalletAddress) -> SyncResult<U256> {
        let raw: String = self
            .call("eth_getBalance", json!([address.as_str(), "latest"]))
            .await?;
        parse_quantity(&raw)
    }

    /// Full raw token-balance list for a wallet.
    pub async fn get_token_balances(
        &self,
        address: &WalletAddress,
    ) -> SyncResult<TokenBalanceResult> {
        self.call(
            "alchemy_getTokenBalances",
            json!([address.as_str(), "erc20"]),
        )
        .await
    }

    /// Metadata for one token contract, cached per lowercase address.
    pub async fn get_token_metadata(
        &self,
        contract: &WalletAddress,
    ) -> SyncResult<TokenMetadata> {
        let key = contract.to_lowercase();
        if let Some(cached) = self.metadata_cache.get(&key) {
            return Ok(cached.value().clone());
        }

        let metadata: TokenMetadata = self
            .call("alchemy_getTokenMetadata", json!([contract.as_str()]))
            .await?;
        self.metadata_cache.insert(key, metadata.clone());
        Ok(metadata)
    }

    /// One sub-query of ledger transfer history.
    pub async fn get_asset_transfers(
        &self,
        params: &AssetTransferParams,
    ) -> SyncResult<AssetTransfersResult> {
        self.call("alchemy_getAssetTransfers", json!([params])).await
    }

    /// NFTs currently owned by a wallet.
    pub async fn get_nfts(&self, owner: &WalletAddress) -> SyncResult<Vec<OwnedNft>> {
        let result: NftOwnershipResult = self
            .call("alchemy_getNFTs", json!([{ "owner": owner.as_str() }]))
            .await?;
        Ok(result.owned_nfts)
    }
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Endpoint omitted: it embeds the credential.
        f.debug_struct("LedgerClient")
            .field("cached_metadata", &self.metadata_cache.len())
            .finish()
    }
}

/// Collapse the gateway's success-or-error envelope into a result.
fn decode_envelope<T>(method: &str, envelope: RpcResponse<T>) -> SyncResult<T> {
    if let Some(err) = envelope.error {
        return Err(SyncError::Remote {
            message: err.message,
            code: err.code,
        });
    }
    envelope
        .result
        .ok_or_else(|| SyncError::remote(format!("{} returned neither result nor error", method)))
}
