//! Normalized holding types.

use serde::{Serialize, Serializer};

use crate::indexer::TokenMetadata;
use crate::session::WalletAddress;

/// Identifies an asset: the native unit or a token contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetId {
    Native,
    Contract(WalletAddress),
}

impl AssetId {
    pub fn is_native(&self) -> bool {
        matches!(self, AssetId::Native)
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetId::Native => f.write_str("native"),
            AssetId::Contract(addr) => f.write_str(addr.as_str()),
        }
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// One normalized asset holding of a wallet.
///
/// `raw_balance` is the exact integer balance as a decimal string;
/// `balance` is the exact decimal rendering at the asset's precision.
#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    pub asset: AssetId,
    pub raw_balance: String,
    pub balance: String,
    pub metadata: TokenMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_display() {
        assert_eq!(AssetId::Native.to_string(), "native");
        let contract = AssetId::Contract(WalletAddress::new("0xAbC").unwrap());
        assert_eq!(contract.to_string(), "0xAbC");
    }

    #[test]
    fn test_asset_id_contract_equality_ignores_case() {
        let a = AssetId::Contract(WalletAddress::new("0xABC").unwrap());
        let b = AssetId::Contract(WalletAddress::new("0xabc").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, AssetId::Native);
    }
}
