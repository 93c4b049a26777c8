//! Chain-backed governance calls.
//!
//! Reads go through the shared provider; a revert or empty returndata
//! on the vote-accounting methods means the token does not expose the
//! governance capability and maps to `UnsupportedCapability`.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::U256;
use alloy::providers::Provider;
use alloy::rpc::types::eth::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tokio::time::timeout;

use crate::chain::{parse_address, ChainContext, TxSigner};
use crate::error::{SyncError, SyncResult};
use crate::governance::adapter::GovernanceCalls;
use crate::session::WalletAddress;

sol! {
    function getVotes(address account) external view returns (uint256);
    function delegates(address account) external view returns (address);
    function decimals() external view returns (uint8);
    function transfer(address to, uint256 amount) external returns (bool);
    function delegate(address delegatee) external;
}

/// Governance collaborator backed by the ledger RPC.
pub struct ChainGovernance {
    context: Arc<ChainContext>,
    /// Needed only for writes; reads work without one.
    signer: Option<TxSigner>,
    wallet_provider: tokio::sync::OnceCell<Arc<dyn Provider + Send + Sync>>,
}

impl ChainGovernance {
    pub fn new(context: Arc<ChainContext>, signer: Option<TxSigner>) -> Self {
        Self {
            context,
            signer,
            wallet_provider: tokio::sync::OnceCell::new(),
        }
    }

    async fn read_call(
        &self,
        token: &WalletAddress,
        method: &'static str,
        calldata: Vec<u8>,
    ) -> SyncResult<alloy::primitives::Bytes> {
        let provider = self.context.provider().await?;
        let address = parse_address(token)?;

        let tx = TransactionRequest::default()
            .with_to(address)
            .with_input(calldata);

        let output = timeout(self.context.timeout(), provider.call(tx))
            .await
            .map_err(|_| SyncError::transport(format!("{} call timed out", method)))?
            .map_err(|e| map_read_error(method, e))?;

        if output.is_empty() {
            // No code or no such method at this address.
            return Err(SyncError::UnsupportedCapability(format!(
                "{} returned no data",
                method
            )));
        }
        Ok(output)
    }

    async fn wallet_provider(&self) -> SyncResult<Arc<dyn Provider + Send + Sync>> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            SyncError::Unauthorized("no signing identity configured".to_string())
        })?;
        self.wallet_provider
            .get_or_try_init(|| async {
                let url: url::Url = self.context.config().rpc_url.parse().map_err(|e| {
                    SyncError::Config(format!(
                        "invalid RPC URL '{}': {}",
                        self.context.config().rpc_url, e
                    ))
                })?;
                Ok(Arc::new(
                    alloy::providers::ProviderBuilder::new()
                        .wallet(signer.wallet())
                        .connect_http(url),
                ) as Arc<dyn Provider + Send + Sync>)
            })
            .await
            .cloned()
    }

    async fn write_call(
        &self,
        token: &WalletAddress,
        method: &'static str,
        calldata: Vec<u8>,
    ) -> SyncResult<()> {
        let provider = self.wallet_provider().await?;
        let address = parse_address(token)?;

        let tx = TransactionRequest::default()
            .with_to(address)
            .with_input(calldata);

        let pending = timeout(self.context.timeout(), provider.send_transaction(tx))
            .await
            .map_err(|_| SyncError::transport(format!("{} submission timed out", method)))?
            .map_err(|e| SyncError::transport(format!("{} submission failed: {}", method, e)))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| SyncError::transport(format!("{} confirmation failed: {}", method, e)))?;

        if !receipt.status() {
            return Err(SyncError::remote(format!("{} transaction reverted", method)));
        }
        Ok(())
    }
}

/// A revert on a read means the capability is absent; anything else is
/// transport noise.
fn map_read_error(method: &str, e: impl std::fmt::Display) -> SyncError {
    let message = e.to_string();
    if message.contains("revert") {
        SyncError::UnsupportedCapability(format!("{} reverted", method))
    } else {
        SyncError::transport(format!("{} call failed: {}", method, message))
    }
}

#[async_trait]
impl GovernanceCalls for ChainGovernance {
    async fn get_votes(
        &self,
        token: &WalletAddress,
        holder: &WalletAddress,
    ) -> SyncResult<U256> {
        let account = parse_address(holder)?;
        let output = self
            .read_call(token, "getVotes", getVotesCall { account }.abi_encode())
            .await?;
        getVotesCall::abi_decode_returns(&output).map_err(|e| {
            SyncError::UnsupportedCapability(format!("getVotes returned malformed data: {}", e))
        })
    }

    async fn delegates(
        &self,
        token: &WalletAddress,
        holder: &WalletAddress,
    ) -> SyncResult<WalletAddress> {
        let account = parse_address(holder)?;
        let output = self
            .read_call(token, "delegates", delegatesCall { account }.abi_encode())
            .await?;
        let delegate = delegatesCall::abi_decode_returns(&output).map_err(|e| {
            SyncError::UnsupportedCapability(format!("delegates returned malformed data: {}", e))
        })?;
        WalletAddress::new(delegate.to_string())
    }

    async fn decimals(&self, token: &WalletAddress) -> SyncResult<u8> {
        let output = self
            .read_call(token, "decimals", decimalsCall {}.abi_encode())
            .await?;
        decimalsCall::abi_decode_returns(&output)
            .map_err(|e| SyncError::remote(format!("decimals returned malformed data: {}", e)))
    }

    async fn delegate(&self, token: &WalletAddress, delegatee: &WalletAddress) -> SyncResult<()> {
        let delegatee = parse_address(delegatee)?;
        self.write_call(token, "delegate", delegateCall { delegatee }.abi_encode())
            .await
    }

    async fn transfer(
        &self,
        token: &WalletAddress,
        to: &WalletAddress,
        amount: U256,
    ) -> SyncResult<()> {
        let to = parse_address(to)?;
        self.write_call(token, "transfer", transferCall { to, amount }.abi_encode())
            .await
    }
}

impl std::fmt::Debug for ChainGovernance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainGovernance")
            .field("can_write", &self.signer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_revert_maps_to_unsupported() {
        let err = map_read_error("getVotes", "execution reverted: no ERC20Votes");
        assert!(matches!(err, SyncError::UnsupportedCapability(_)));
    }

    #[test]
    fn test_read_transport_failure_stays_transport() {
        let err = map_read_error("getVotes", "connection refused");
        assert!(matches!(err, SyncError::Transport { .. }));
    }

    #[test]
    fn test_capability_selectors_distinct() {
        let selectors = [
            getVotesCall::SELECTOR,
            delegatesCall::SELECTOR,
            decimalsCall::SELECTOR,
            transferCall::SELECTOR,
            delegateCall::SELECTOR,
        ];
        for (i, a) in selectors.iter().enumerate() {
            for b in &selectors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
