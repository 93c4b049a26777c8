//! Transfer history aggregation.
//!
//! # Responsibilities
//! - Issue the inbound and outbound history sub-queries concurrently
//! - Merge both result sets into one deterministically ordered list
//! - Fail fast: either sub-query error aborts the whole call
//!
//! Ordering is descending by integer block number with ascending
//! unique id as tie-break, scoped to a single invocation. A transfer
//! appearing in both sub-queries (a self-transfer) is kept twice.

use crate::error::SyncResult;
use crate::indexer::types::{AssetTransferParams, RawTransfer};
use crate::indexer::{LedgerClient, TransferCategory};
use crate::session::WalletAddress;
use crate::transfers::types::TransferRecord;

const GENESIS_BLOCK: &str = "0x0";
const LATEST_BLOCK: &str = "latest";

const TOKEN_CATEGORIES: [TransferCategory; 3] = [
    TransferCategory::Erc20,
    TransferCategory::Erc721,
    TransferCategory::Erc1155,
];

const NATIVE_CATEGORIES: [TransferCategory; 2] =
    [TransferCategory::External, TransferCategory::Internal];

/// Aggregates ledger transfer history split across inbound and
/// outbound queries.
#[derive(Debug, Clone)]
pub struct TransferAggregator {
    client: LedgerClient,
}

impl TransferAggregator {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    /// Token transfer history for a wallet, optionally narrowed to one
    /// contract.
    pub async fn get_transfers(
        &self,
        wallet: &WalletAddress,
        asset_filter: Option<&WalletAddress>,
    ) -> SyncResult<Vec<TransferRecord>> {
        self.fetch_merged(
            wallet,
            TOKEN_CATEGORIES.to_vec(),
            asset_filter.map(|a| vec![a.as_str().to_string()]),
        )
        .await
    }

    /// Native-asset transfer history; no contract filter applies.
    pub async fn get_native_transfers(
        &self,
        wallet: &WalletAddress,
    ) -> SyncResult<Vec<TransferRecord>> {
        self.fetch_merged(wallet, NATIVE_CATEGORIES.to_vec(), None).await
    }

    async fn fetch_merged(
        &self,
        wallet: &WalletAddress,
        category: Vec<TransferCategory>,
        contract_addresses: Option<Vec<String>>,
    ) -> SyncResult<Vec<TransferRecord>> {
        let inbound_params = AssetTransferParams {
            from_block: GENESIS_BLOCK.to_string(),
            to_block: LATEST_BLOCK.to_string(),
            to_address: Some(wallet.as_str().to_string()),
            from_address: None,
            contract_addresses: contract_addresses.clone(),
            category: category.clone(),
            with_metadata: true,
            exclude_zero_value: false,
        };
        let outbound_params = AssetTransferParams {
            to_address: None,
            from_address: Some(wallet.as_str().to_string()),
            ..inbound_params.clone()
        };

        let (inbound, outbound) = tokio::try_join!(
            self.client.get_asset_transfers(&inbound_params),
            self.client.get_asset_transfers(&outbound_params),
        )?;

        tracing::debug!(
            wallet = %wallet,
            inbound = inbound.transfers.len(),
            outbound = outbound.transfers.len(),
            "Merging transfer history"
        );

        merge_transfers(inbound.transfers, outbound.transfers, wallet)
    }
}

/// Concatenate both sub-query results and normalize the order.
fn merge_transfers(
    inbound: Vec<RawTransfer>,
    outbound: Vec<RawTransfer>,
    wallet: &WalletAddress,
) -> SyncResult<Vec<TransferRecord>> {
    let mut records = Vec::with_capacity(inbound.len() + outbound.len());
    for raw in inbound.into_iter().chain(outbound) {
        records.push(TransferRecord::from_raw(raw, wallet)?);
    }
    records.sort_by(|a, b| {
        b.block_number
            .cmp(&a.block_number)
            .then_with(|| a.unique_id.cmp(&b.unique_id))
    });
    Ok(records)
}
