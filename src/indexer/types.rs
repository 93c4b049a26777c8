//! Wire types for the indexing gateway.
//!
//! Request and response shapes mirror the gateway's JSON-RPC surface.
//! Quantities arrive as strings (hex or decimal) and are parsed into
//! `U256` before any arithmetic; no floating point anywhere.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorBody>,
}

/// Structured error payload from the gateway.
#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Result of a token-balances-by-address query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceResult {
    pub address: String,
    pub token_balances: Vec<TokenBalanceEntry>,
}

/// One raw token balance, string-encoded to avoid precision loss.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceEntry {
    pub contract_address: String,
    pub token_balance: String,
}

/// Token metadata as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Transfer category reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferCategory {
    External,
    Internal,
    Erc20,
    Erc721,
    Erc1155,
}

/// Parameters for an asset-transfers query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransferParams {
    pub from_block: String,
    pub to_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_addresses: Option<Vec<String>>,
    pub category: Vec<TransferCategory>,
    pub with_metadata: bool,
    pub exclude_zero_value: bool,
}

/// Result of an asset-transfers query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfersResult {
    pub transfers: Vec<RawTransfer>,
}

/// One raw transfer record as returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransfer {
    pub unique_id: String,
    /// Hex-encoded block number, e.g. "0x5".
    pub block_num: String,
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
    pub category: TransferCategory,
    #[serde(default)]
    pub raw_contract: RawContract,
}

/// Raw value and precision carried alongside a transfer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContract {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Hex-encoded decimals, e.g. "0x12".
    #[serde(default)]
    pub decimal: Option<String>,
}

/// Result of an NFT-ownership-by-address query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftOwnershipResult {
    pub owned_nfts: Vec<OwnedNft>,
}

/// One NFT owned by the queried wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedNft {
    pub contract_address: String,
    pub token_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Parse a gateway quantity, accepting both "0x.." hex and decimal forms.
pub fn parse_quantity(raw: &str) -> SyncResult<U256> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(raw, 10),
    };
    parsed.map_err(|e| SyncError::remote(format!("unparseable quantity {:?}: {}", raw, e)))
}

/// Parse a hex block number ("0x5") into its integer value.
pub fn parse_block_number(raw: &str) -> SyncResult<u64> {
    let hex = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    u64::from_str_radix(hex, 16)
        .map_err(|e| SyncError::remote(format!("unparseable block number {:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity_hex_and_decimal() {
        assert_eq!(parse_quantity("0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("0xa").unwrap(), U256::from(10));
        assert_eq!(parse_quantity("1500000").unwrap(), U256::from(1_500_000u64));
        assert!(parse_quantity("zzz").is_err());
    }

    #[test]
    fn test_parse_block_number() {
        assert_eq!(parse_block_number("0x5").unwrap(), 5);
        assert_eq!(parse_block_number("0x10").unwrap(), 16);
        assert!(parse_block_number("0xgg").is_err());
    }

    #[test]
    fn test_transfer_params_omit_absent_filters() {
        let params = AssetTransferParams {
            from_block: "0x0".to_string(),
            to_block: "latest".to_string(),
            to_address: Some("0xabc".to_string()),
            from_address: None,
            contract_addresses: None,
            category: vec![TransferCategory::Erc20],
            with_metadata: true,
            exclude_zero_value: false,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["toAddress"], "0xabc");
        assert!(json.get("fromAddress").is_none());
        assert!(json.get("contractAddresses").is_none());
        assert_eq!(json["category"][0], "erc20");
    }

    #[test]
    fn test_raw_transfer_deserializes_gateway_shape() {
        let raw: RawTransfer = serde_json::from_value(serde_json::json!({
            "uniqueId": "0xabc:log:1",
            "blockNum": "0x5",
            "hash": "0xdeadbeef",
            "from": "0x1111",
            "to": "0x2222",
            "asset": "FTT",
            "category": "erc20",
            "rawContract": { "value": "0x16e360", "address": "0x3333", "decimal": "0x6" }
        }))
        .unwrap();
        assert_eq!(raw.unique_id, "0xabc:log:1");
        assert_eq!(raw.category, TransferCategory::Erc20);
        assert_eq!(raw.raw_contract.decimal.as_deref(), Some("0x6"));
    }
}
