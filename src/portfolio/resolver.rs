//! Balance resolution.
//!
//! # Responsibilities
//! - Enumerate non-zero token holdings for a wallet
//! - Fetch per-asset metadata concurrently
//! - Normalize raw balances to decimal form with exact arithmetic
//! - Append the synthetic native holding, always present, always last
//!
//! Failure policy is fail-fast: any metadata fetch error fails the
//! whole call. Callers wanting a skip-failed-asset policy must layer
//! it on top.

use std::sync::Arc;

use alloy::primitives::U256;
use async_trait::async_trait;
use futures_util::future::try_join_all;

use crate::error::SyncResult;
use crate::indexer::types::{parse_quantity, TokenBalanceResult};
use crate::indexer::{LedgerClient, TokenMetadata};
use crate::portfolio::types::{AssetId, Holding};
use crate::portfolio::units::format_units_exact;
use crate::session::WalletAddress;

/// Precision of the native asset.
pub const NATIVE_DECIMALS: u8 = 18;

/// Gateway queries the resolver depends on.
#[async_trait]
pub trait PortfolioQueries: Send + Sync {
    async fn token_balances(&self, wallet: &WalletAddress) -> SyncResult<TokenBalanceResult>;

    async fn token_metadata(&self, contract: &WalletAddress) -> SyncResult<TokenMetadata>;

    async fn native_balance(&self, wallet: &WalletAddress) -> SyncResult<U256>;
}

#[async_trait]
impl PortfolioQueries for LedgerClient {
    async fn token_balances(&self, wallet: &WalletAddress) -> SyncResult<TokenBalanceResult> {
        self.get_token_balances(wallet).await
    }

    async fn token_metadata(&self, contract: &WalletAddress) -> SyncResult<TokenMetadata> {
        self.get_token_metadata(contract).await
    }

    async fn native_balance(&self, wallet: &WalletAddress) -> SyncResult<U256> {
        self.get_native_balance(wallet).await
    }
}

/// Resolves a wallet's holdings against the indexing gateway.
#[derive(Clone)]
pub struct BalanceResolver {
    queries: Arc<dyn PortfolioQueries>,
}

impl BalanceResolver {
    pub fn new(queries: Arc<dyn PortfolioQueries>) -> Self {
        Self { queries }
    }

    /// Enumerate the wallet's holdings, native entry last.
    pub async fn get_holdings(&self, wallet: &WalletAddress) -> SyncResult<Vec<Holding>> {
        let balances = self.queries.token_balances(wallet).await?;
        let entries = nonzero_entries(balances)?;

        // Metadata fetches run concurrently; the first error aborts.
        let metadata = try_join_all(
            entries
                .iter()
                .map(|(contract, _)| self.queries.token_metadata(contract)),
        )
        .await?;

        let native_balance = self.queries.native_balance(wallet).await?;

        tracing::debug!(
            wallet = %wallet,
            token_count = entries.len(),
            "Resolved holdings"
        );

        Ok(build_holdings(entries, metadata, native_balance))
    }
}

/// Parse the raw balance list, dropping zero-balance entries.
fn nonzero_entries(result: TokenBalanceResult) -> SyncResult<Vec<(WalletAddress, U256)>> {
    let mut entries = Vec::with_capacity(result.token_balances.len());
    for entry in result.token_balances {
        let raw = parse_quantity(&entry.token_balance)?;
        if raw.is_zero() {
            continue;
        }
        entries.push((WalletAddress::new(entry.contract_address)?, raw));
    }
    Ok(entries)
}

/// Assemble holdings in gateway order, native appended last.
fn build_holdings(
    entries: Vec<(WalletAddress, U256)>,
    metadata: Vec<TokenMetadata>,
    native_balance: U256,
) -> Vec<Holding> {
    debug_assert_eq!(entries.len(), metadata.len());

    let mut holdings: Vec<Holding> = entries
        .into_iter()
        .zip(metadata)
        .map(|((contract, raw), meta)| Holding {
            asset: AssetId::Contract(contract),
            raw_balance: raw.to_string(),
            balance: format_units_exact(raw, meta.decimals),
            metadata: meta,
        })
        .collect();

    holdings.push(Holding {
        asset: AssetId::Native,
        raw_balance: native_balance.to_string(),
        balance: format_units_exact(native_balance, NATIVE_DECIMALS),
        metadata: TokenMetadata {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: NATIVE_DECIMALS,
            logo: None,
        },
    });

    holdings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::indexer::types::TokenBalanceEntry;

    fn balances(entries: &[(&str, &str)]) -> TokenBalanceResult {
        TokenBalanceResult {
            address: "0xwallet".to_string(),
            token_balances: entries
                .iter()
                .map(|(addr, bal)| TokenBalanceEntry {
                    contract_address: addr.to_string(),
                    token_balance: bal.to_string(),
                })
                .collect(),
        }
    }

    fn meta(symbol: &str, decimals: u8) -> TokenMetadata {
        TokenMetadata {
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            decimals,
            logo: None,
        }
    }

    #[test]
    fn test_zero_balances_dropped() {
        let result = balances(&[
            ("0xaaa", "0x0"),
            ("0xbbb", "0x16e360"),
            ("0xccc", "0"),
        ]);
        let entries = nonzero_entries(result).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0.as_str(), "0xbbb");
        assert_eq!(entries[0].1, U256::from(0x16e360u64));
    }

    #[test]
    fn test_native_holding_always_present_and_last() {
        let holdings = build_holdings(Vec::new(), Vec::new(), U256::ZERO);
        assert_eq!(holdings.len(), 1);
        let native = holdings.last().unwrap();
        assert!(native.asset.is_native());
        assert_eq!(native.raw_balance, "0");
        assert_eq!(native.balance, "0");
    }

    #[test]
    fn test_holdings_preserve_gateway_order() {
        let entries = vec![
            (WalletAddress::new("0xbbb").unwrap(), U256::from(1_500_000u64)),
            (WalletAddress::new("0xaaa").unwrap(), U256::from(7u64)),
        ];
        let metadata = vec![meta("USDX", 6), meta("WEI7", 0)];
        let holdings = build_holdings(entries, metadata, U256::from(10u64).pow(U256::from(18u64)));

        assert_eq!(holdings.len(), 3);
        assert_eq!(holdings[0].balance, "1.5");
        assert_eq!(holdings[0].asset.to_string(), "0xbbb");
        assert_eq!(holdings[1].balance, "7");
        assert!(holdings[2].asset.is_native());
        assert_eq!(holdings[2].balance, "1");
    }

    #[test]
    fn test_no_zero_entry_except_native() {
        let result = balances(&[("0xaaa", "0x0")]);
        let entries = nonzero_entries(result).unwrap();
        let holdings = build_holdings(entries, Vec::new(), U256::ZERO);
        assert!(holdings
            .iter()
            .all(|h| h.asset.is_native() || h.raw_balance != "0"));
        assert!(holdings.iter().any(|h| h.asset.is_native()));
    }

    #[test]
    fn test_unparseable_balance_is_error() {
        let result = balances(&[("0xaaa", "wat")]);
        assert!(nonzero_entries(result).is_err());
    }

    struct MockQueries {
        entries: Vec<(&'static str, &'static str)>,
        fail_metadata_for: Option<&'static str>,
    }

    #[async_trait]
    impl PortfolioQueries for MockQueries {
        async fn token_balances(
            &self,
            _wallet: &WalletAddress,
        ) -> SyncResult<TokenBalanceResult> {
            Ok(balances(&self.entries))
        }

        async fn token_metadata(&self, contract: &WalletAddress) -> SyncResult<TokenMetadata> {
            if self.fail_metadata_for == Some(contract.as_str()) {
                return Err(SyncError::remote("metadata unavailable"));
            }
            Ok(meta("TOK", 6))
        }

        async fn native_balance(&self, _wallet: &WalletAddress) -> SyncResult<U256> {
            Ok(U256::from(10u64).pow(U256::from(18u64)))
        }
    }

    fn wallet() -> WalletAddress {
        WalletAddress::new("0xwallet").unwrap()
    }

    #[tokio::test]
    async fn test_metadata_failure_fails_whole_call() {
        let resolver = BalanceResolver::new(Arc::new(MockQueries {
            entries: vec![("0xaaa", "0x5"), ("0xbbb", "0x7")],
            fail_metadata_for: Some("0xbbb"),
        }));
        let err = resolver.get_holdings(&wallet()).await.unwrap_err();
        assert!(matches!(err, SyncError::Remote { .. }));
    }

    #[tokio::test]
    async fn test_get_holdings_joins_metadata_and_native() {
        let resolver = BalanceResolver::new(Arc::new(MockQueries {
            entries: vec![("0xaaa", "0x16e360"), ("0xzero", "0x0")],
            fail_metadata_for: None,
        }));
        let holdings = resolver.get_holdings(&wallet()).await.unwrap();

        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].asset.to_string(), "0xaaa");
        assert_eq!(holdings[0].balance, "1.5");
        assert!(holdings[1].asset.is_native());
        assert_eq!(holdings[1].balance, "1");
    }
}
