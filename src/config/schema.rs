//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! The gateway access credential is deliberately NOT part of the schema:
//! it is read from an environment variable at client construction and
//! never serialized or logged.

use serde::{Deserialize, Serialize};

/// Root configuration for the synchronization layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Indexing gateway settings.
    pub gateway: GatewayConfig,

    /// Ledger RPC settings for contract interaction.
    pub chain: ChainConfig,

    /// Escrow lifecycle settings.
    pub escrow: EscrowConfig,
}

/// Indexing gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base endpoint of the indexing gateway.
    pub base_url: String,

    /// Versioned path segment appended to the base endpoint.
    pub api_version: String,

    /// Environment variable the access credential is read from.
    pub api_key_env: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eth-sepolia.g.alchemy.com".to_string(),
            api_version: "v2".to_string(),
            api_key_env: "ESCROW_SYNC_API_KEY".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Ledger RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// RPC endpoint for contract calls and transaction submission.
    pub rpc_url: String,

    /// Expected chain ID.
    pub chain_id: u64,

    /// RPC timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Interval between event-log polls in milliseconds.
    pub event_poll_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 11155111, // Sepolia
            rpc_timeout_secs: 10,
            event_poll_interval_ms: 2_000,
        }
    }
}

/// Escrow lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EscrowConfig {
    /// Fixed deposit locked at deployment, in wei.
    pub deposit_wei: String,

    /// Delay between the approval event and the automatic reset.
    pub reset_delay_ms: u64,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            // One native-asset unit.
            deposit_wei: "1000000000000000000".to_string(),
            reset_delay_ms: 2_000,
        }
    }
}
