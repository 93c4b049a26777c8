//! Chain-backed escrow collaborators.
//!
//! Implements deployment, approval submission, and the approval-event
//! watch over the shared RPC provider. Event observation polls
//! `eth_getLogs` from the deployment block forward.

use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Bytes, U256};
use alloy::providers::Provider;
use alloy::rpc::types::eth::{Filter, TransactionRequest};
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::time::{sleep, timeout};

use crate::chain::{parse_address, ChainContext, TxSigner};
use crate::error::{SyncError, SyncResult};
use crate::escrow::types::{
    ApprovalEvent, ApprovalSubscription, ApprovalWatcher, DeployedEscrow, EscrowDeployer,
};
use crate::session::WalletAddress;

sol! {
    /// Emitted once when the arbiter approves the escrow.
    #[derive(Debug)]
    event Approved(address arbiter);

    function approve() external;
    function isApproved() external view returns (bool);
}

/// Escrow collaborator backed by the ledger RPC.
pub struct ChainEscrow {
    context: Arc<ChainContext>,
    signer: TxSigner,
    /// Escrow creation bytecode; constructor args are appended at
    /// deployment.
    init_code: Bytes,
    wallet_provider: tokio::sync::OnceCell<Arc<dyn Provider + Send + Sync>>,
    poll_interval: Duration,
}

impl ChainEscrow {
    pub fn new(context: Arc<ChainContext>, signer: TxSigner, init_code: Bytes) -> Self {
        let poll_interval = Duration::from_millis(context.config().event_poll_interval_ms);
        Self {
            context,
            signer,
            init_code,
            wallet_provider: tokio::sync::OnceCell::new(),
            poll_interval,
        }
    }

    /// Signing provider, constructed on first write.
    async fn wallet_provider(&self) -> SyncResult<Arc<dyn Provider + Send + Sync>> {
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
                        .wallet(self.signer.wallet())
                        .connect_http(url),
                ) as Arc<dyn Provider + Send + Sync>)
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl EscrowDeployer for ChainEscrow {
    async fn deploy(
        &self,
        arbiter: &WalletAddress,
        beneficiary: &WalletAddress,
        deposit_wei: U256,
    ) -> SyncResult<DeployedEscrow> {
        let provider = self.wallet_provider().await?;
        let arbiter = parse_address(arbiter)?;
        let beneficiary = parse_address(beneficiary)?;

        let mut code = self.init_code.to_vec();
        code.extend_from_slice(&(arbiter, beneficiary).abi_encode_params());

        let tx = TransactionRequest::default()
            .with_deploy_code(Bytes::from(code))
            .with_value(deposit_wei);

        let pending = timeout(self.context.timeout(), provider.send_transaction(tx))
            .await
            .map_err(|_| SyncError::transport("escrow deployment timed out"))?
            .map_err(|e| SyncError::transport(format!("escrow deployment failed: {}", e)))?;

        let receipt = pending.get_receipt().await.map_err(|e| {
            SyncError::transport(format!("deployment confirmation failed: {}", e))
        })?;

        if !receipt.status() {
            return Err(SyncError::remote("escrow deployment reverted"));
        }
        let address = receipt.contract_address.ok_or_else(|| {
            SyncError::remote("deployment receipt carried no contract address")
        })?;

        Ok(DeployedEscrow {
            contract_address: WalletAddress::new(address.to_string())?,
            block_number: receipt.block_number.unwrap_or_default(),
        })
    }

    async fn is_approved(&self, contract: &WalletAddress) -> SyncResult<bool> {
        let provider = self.context.provider().await?;
        let address = parse_address(contract)?;

        let tx = TransactionRequest::default()
            .with_to(address)
            .with_input(isApprovedCall {}.abi_encode());

        let output = timeout(self.context.timeout(), provider.call(tx))
            .await
            .map_err(|_| SyncError::transport("isApproved call timed out"))?
            .map_err(|e| SyncError::transport(format!("isApproved call failed: {}", e)))?;

        isApprovedCall::abi_decode_returns(&output)
            .map_err(|e| SyncError::remote(format!("isApproved returned malformed data: {}", e)))
    }

    async fn submit_approval(&self, contract: &WalletAddress) -> SyncResult<()> {
        let provider = self.wallet_provider().await?;
        let address = parse_address(contract)?;

        let tx = TransactionRequest::default()
            .with_to(address)
            .with_input(approveCall {}.abi_encode());

        let pending = timeout(self.context.timeout(), provider.send_transaction(tx))
            .await
            .map_err(|_| SyncError::transport("approval submission timed out"))?
            .map_err(|e| SyncError::transport(format!("approval submission failed: {}", e)))?;

        let receipt = pending.get_receipt().await.map_err(|e| {
            SyncError::transport(format!("approval confirmation failed: {}", e))
        })?;

        if !receipt.status() {
            return Err(SyncError::remote("approval transaction reverted"));
        }
        Ok(())
    }
}

#[async_trait]
impl ApprovalWatcher for ChainEscrow {
    async fn subscribe(
        &self,
        contract: &WalletAddress,
        from_block: u64,
    ) -> SyncResult<ApprovalSubscription> {
        let provider = self.context.provider().await?;
        let address = parse_address(contract)?;
        let poll_interval = self.poll_interval;
        let (tx, rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let filter = Filter::new()
                .address(address)
                .from_block(from_block)
                .event(Approved::SIGNATURE);
            let mut sender = Some(tx);

            loop {
                match provider.get_logs(&filter).await {
                    Ok(logs) => {
                        for log in logs {
                            if let Ok(decoded) = log.log_decode::<Approved>() {
                                let event = decoded.inner;
                                let arbiter = event.arbiter.to_string();
                                if let (Some(sender), Ok(arbiter)) =
                                    (sender.take(), WalletAddress::new(arbiter))
                                {
                                    let _ = sender.send(ApprovalEvent { arbiter });
                                }
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Approval log poll failed");
                    }
                }
                sleep(poll_interval).await;
            }
        });

        Ok(ApprovalSubscription::new(rx, Some(task)))
    }
}

impl std::fmt::Debug for ChainEscrow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEscrow")
            .field("signer", &self.signer.address())
            .field("init_code_len", &self.init_code.len())
            .finish()
    }
}
