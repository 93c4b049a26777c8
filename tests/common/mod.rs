//! Shared mock collaborators for escrow lifecycle testing.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;
use tokio::sync::oneshot;

use escrow_sync::error::{SyncError, SyncResult};
use escrow_sync::escrow::{
    ApprovalEvent, ApprovalSubscription, ApprovalWatcher, DeployedEscrow, EscrowDeployer,
};
use escrow_sync::session::WalletAddress;

pub const MOCK_CONTRACT: &str = "0x00000000000000000000000000000000000e5c20";

/// Deployer with scriptable failure, confirmation delay, and approval
/// flag. Counts every deployment and approval submission.
pub struct MockDeployer {
    fail_deploy: bool,
    deploy_delay: Duration,
    pub approved: Arc<AtomicBool>,
    pub deployments: Arc<AtomicU32>,
    pub submissions: Arc<AtomicU32>,
}

impl MockDeployer {
    pub fn new() -> Self {
        Self {
            fail_deploy: false,
            deploy_delay: Duration::ZERO,
            approved: Arc::new(AtomicBool::new(false)),
            deployments: Arc::new(AtomicU32::new(0)),
            submissions: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_deploy: true,
            ..Self::new()
        }
    }

    /// Deployer whose confirmation takes `delay` to land.
    pub fn slow(delay: Duration) -> Self {
        Self {
            deploy_delay: delay,
            ..Self::new()
        }
    }
}

#[async_trait]
impl EscrowDeployer for MockDeployer {
    async fn deploy(
        &self,
        _arbiter: &WalletAddress,
        _beneficiary: &WalletAddress,
        _deposit_wei: U256,
    ) -> SyncResult<DeployedEscrow> {
        if self.fail_deploy {
            return Err(SyncError::remote("deployment transaction reverted"));
        }
        if !self.deploy_delay.is_zero() {
            tokio::time::sleep(self.deploy_delay).await;
        }
        self.deployments.fetch_add(1, Ordering::SeqCst);
        Ok(DeployedEscrow {
            contract_address: WalletAddress::new(MOCK_CONTRACT)?,
            block_number: 1,
        })
    }

    async fn is_approved(&self, _contract: &WalletAddress) -> SyncResult<bool> {
        Ok(self.approved.load(Ordering::SeqCst))
    }

    async fn submit_approval(&self, _contract: &WalletAddress) -> SyncResult<()> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Watcher handing out oneshot-backed subscriptions the test can fire.
pub struct MockWatcher {
    fail_subscribe: bool,
    senders: Mutex<Vec<oneshot::Sender<ApprovalEvent>>>,
}

impl MockWatcher {
    pub fn new() -> Self {
        Self {
            fail_subscribe: false,
            senders: Mutex::new(Vec::new()),
        }
    }

    /// Watcher whose subscriptions never establish.
    pub fn failing() -> Self {
        Self {
            fail_subscribe: true,
            senders: Mutex::new(Vec::new()),
        }
    }

    /// Emit the approval event to every outstanding subscription.
    pub fn fire(&self, arbiter: &str) {
        let mut senders = self.senders.lock().unwrap();
        for tx in senders.drain(..) {
            let _ = tx.send(ApprovalEvent {
                arbiter: WalletAddress::new(arbiter).unwrap(),
            });
        }
    }
}

#[async_trait]
impl ApprovalWatcher for MockWatcher {
    async fn subscribe(
        &self,
        _contract: &WalletAddress,
        _from_block: u64,
    ) -> SyncResult<ApprovalSubscription> {
        if self.fail_subscribe {
            return Err(SyncError::transport("log subscription refused"));
        }
        let (tx, rx) = oneshot::channel();
        self.senders.lock().unwrap().push(tx);
        Ok(ApprovalSubscription::new(rx, None))
    }
}
