//! Escrow lifecycle types and collaborator seams.

use alloy::primitives::U256;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::SyncResult;
use crate::session::WalletAddress;

/// Lifecycle state of an escrow instance.
///
/// Transitions are strictly monotonic; `Reset` is terminal and
/// equivalent to "no active instance".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EscrowState {
    Deploying,
    AwaitingApproval,
    Approved,
    Reset,
}

impl EscrowState {
    /// Whether `next` is the single legal successor of `self`.
    pub fn can_advance_to(self, next: EscrowState) -> bool {
        matches!(
            (self, next),
            (EscrowState::Deploying, EscrowState::AwaitingApproval)
                | (EscrowState::AwaitingApproval, EscrowState::Approved)
                | (EscrowState::Approved, EscrowState::Reset)
        )
    }
}

impl std::fmt::Display for EscrowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EscrowState::Deploying => "Deploying",
            EscrowState::AwaitingApproval => "AwaitingApproval",
            EscrowState::Approved => "Approved",
            EscrowState::Reset => "Reset",
        };
        f.write_str(s)
    }
}

/// One deployed escrow tracked in memory.
#[derive(Debug, Clone, Serialize)]
pub struct EscrowInstance {
    pub contract_address: WalletAddress,
    pub arbiter: WalletAddress,
    pub beneficiary: WalletAddress,
    /// Locked deposit in wei, as a decimal string.
    pub deposit_wei: String,
    pub state: EscrowState,
    /// Unix timestamp of deployment confirmation.
    pub created_at: u64,
}

/// Result of a confirmed deployment.
#[derive(Debug, Clone)]
pub struct DeployedEscrow {
    pub contract_address: WalletAddress,
    /// Block the deployment landed in; event watching starts here.
    pub block_number: u64,
}

/// Payload of the contract's approval event.
///
/// The carried arbiter identity is informational, not authorizing:
/// capability checks live at the presentation boundary.
#[derive(Debug, Clone)]
pub struct ApprovalEvent {
    pub arbiter: WalletAddress,
}

/// Explicit, cancellable subscription to an escrow's approval event.
///
/// Resolves at most once. Dropping or unsubscribing tears down the
/// underlying watch so no listener leaks past the owning session.
#[derive(Debug)]
pub struct ApprovalSubscription {
    rx: oneshot::Receiver<ApprovalEvent>,
    watch_task: Option<JoinHandle<()>>,
}

impl ApprovalSubscription {
    pub fn new(rx: oneshot::Receiver<ApprovalEvent>, watch_task: Option<JoinHandle<()>>) -> Self {
        Self { rx, watch_task }
    }

    /// Wait for the approval event. `None` means the watch ended
    /// without observing one.
    pub async fn resolved(mut self) -> Option<ApprovalEvent> {
        (&mut self.rx).await.ok()
    }

    /// Tear down the watch without waiting.
    pub fn unsubscribe(mut self) {
        if let Some(task) = self.watch_task.take() {
            task.abort();
        }
    }
}

impl Drop for ApprovalSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.watch_task.take() {
            task.abort();
        }
    }
}

/// Contract deployment and transaction submission collaborator.
#[async_trait]
pub trait EscrowDeployer: Send + Sync {
    /// Deploy a new escrow with the fixed deposit. Resolves once the
    /// deployment transaction is confirmed.
    async fn deploy(
        &self,
        arbiter: &WalletAddress,
        beneficiary: &WalletAddress,
        deposit_wei: U256,
    ) -> SyncResult<DeployedEscrow>;

    /// Read the contract's current approved flag.
    async fn is_approved(&self, contract: &WalletAddress) -> SyncResult<bool>;

    /// Submit the approval transaction and wait for confirmation.
    async fn submit_approval(&self, contract: &WalletAddress) -> SyncResult<()>;
}

/// Event-subscription collaborator.
#[async_trait]
pub trait ApprovalWatcher: Send + Sync {
    /// Subscribe to the contract's approval event, watching from
    /// `from_block` onward.
    async fn subscribe(
        &self,
        contract: &WalletAddress,
        from_block: u64,
    ) -> SyncResult<ApprovalSubscription>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(EscrowState::Deploying.can_advance_to(EscrowState::AwaitingApproval));
        assert!(EscrowState::AwaitingApproval.can_advance_to(EscrowState::Approved));
        assert!(EscrowState::Approved.can_advance_to(EscrowState::Reset));
    }

    #[test]
    fn test_backward_and_skip_transitions_rejected() {
        assert!(!EscrowState::Approved.can_advance_to(EscrowState::AwaitingApproval));
        assert!(!EscrowState::Approved.can_advance_to(EscrowState::Deploying));
        assert!(!EscrowState::AwaitingApproval.can_advance_to(EscrowState::Deploying));
        assert!(!EscrowState::Deploying.can_advance_to(EscrowState::Approved));
        assert!(!EscrowState::Reset.can_advance_to(EscrowState::Approved));
    }

    #[tokio::test]
    async fn test_subscription_resolves_once() {
        let (tx, rx) = oneshot::channel();
        let sub = ApprovalSubscription::new(rx, None);
        tx.send(ApprovalEvent {
            arbiter: WalletAddress::new("0xarb").unwrap(),
        })
        .unwrap();
        let event = sub.resolved().await.unwrap();
        assert_eq!(event.arbiter.as_str(), "0xarb");
    }

    #[tokio::test]
    async fn test_subscription_none_when_sender_dropped() {
        let (tx, rx) = oneshot::channel::<ApprovalEvent>();
        drop(tx);
        let sub = ApprovalSubscription::new(rx, None);
        assert!(sub.resolved().await.is_none());
    }
}
