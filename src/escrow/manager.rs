//! Escrow lifecycle state machine.
//!
//! # Responsibilities
//! - Drive Deploying → AwaitingApproval → Approved → Reset for a
//!   single escrow instance
//! - Observe the approval event through a cancellable subscription
//! - Schedule the automatic reset as an abortable task
//!
//! Approval submission does not transition state; transitions are
//! driven purely by observation of the contract's event.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use alloy::primitives::U256;
use tokio::task::JoinHandle;

use crate::config::EscrowConfig;
use crate::error::{SyncError, SyncResult};
use crate::escrow::types::{
    ApprovalSubscription, ApprovalWatcher, EscrowDeployer, EscrowInstance, EscrowState,
};
use crate::session::WalletAddress;

struct Inner {
    /// Observable lifecycle phase; `Reset` doubles as "idle".
    phase: EscrowState,
    instance: Option<EscrowInstance>,
    monitor_task: Option<JoinHandle<()>>,
    reset_task: Option<JoinHandle<()>>,
}

/// Manages the lifecycle of a single escrow instance.
pub struct EscrowLifecycleManager {
    deployer: Arc<dyn EscrowDeployer>,
    watcher: Arc<dyn ApprovalWatcher>,
    deposit_wei: U256,
    reset_delay: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl EscrowLifecycleManager {
    pub fn new(
        deployer: Arc<dyn EscrowDeployer>,
        watcher: Arc<dyn ApprovalWatcher>,
        config: &EscrowConfig,
    ) -> SyncResult<Self> {
        let deposit_wei = config
            .deposit_wei
            .parse::<U256>()
            .map_err(|e| SyncError::Config(format!("invalid deposit amount: {}", e)))?;

        Ok(Self {
            deployer,
            watcher,
            deposit_wei,
            reset_delay: Duration::from_millis(config.reset_delay_ms),
            inner: Arc::new(Mutex::new(Inner {
                phase: EscrowState::Reset,
                instance: None,
                monitor_task: None,
                reset_task: None,
            })),
        })
    }

    /// Deploy a new escrow with the configured deposit.
    ///
    /// Failure leaves no instance created. Rejected while an instance
    /// is still active or another deployment is in flight, so at most
    /// one deployment transaction is ever submitted per cycle.
    pub async fn deploy(
        &self,
        arbiter: &WalletAddress,
        beneficiary: &WalletAddress,
    ) -> SyncResult<EscrowInstance> {
        {
            let mut inner = lock(&self.inner);
            // The Deploying phase marks an in-flight deployment whose
            // instance does not exist yet; it counts as active.
            if inner.phase != EscrowState::Reset || inner.instance.is_some() {
                return Err(SyncError::InvalidState {
                    from: inner.phase.to_string(),
                    to: EscrowState::Deploying.to_string(),
                });
            }
            inner.phase = EscrowState::Deploying;
        }

        tracing::info!(arbiter = %arbiter, beneficiary = %beneficiary, "Deploying escrow");

        let deployed = match self
            .deployer
            .deploy(arbiter, beneficiary, self.deposit_wei)
            .await
        {
            Ok(deployed) => deployed,
            Err(e) => {
                // Back to idle; the failed attempt never produced an instance.
                lock(&self.inner).phase = EscrowState::Reset;
                return Err(e);
            }
        };
        debug_assert!(!deployed.contract_address.as_str().is_empty());

        let instance = EscrowInstance {
            contract_address: deployed.contract_address.clone(),
            arbiter: arbiter.clone(),
            beneficiary: beneficiary.clone(),
            deposit_wei: self.deposit_wei.to_string(),
            state: EscrowState::AwaitingApproval,
            created_at: unix_now(),
        };

        tracing::info!(
            address = %instance.contract_address,
            "Escrow deployed, awaiting approval"
        );

        let subscription = self
            .watcher
            .subscribe(&deployed.contract_address, deployed.block_number)
            .await;

        let mut inner = lock(&self.inner);
        inner.phase = EscrowState::AwaitingApproval;
        inner.instance = Some(instance.clone());
        match subscription {
            Ok(subscription) => {
                if let Some(stale) = inner.monitor_task.take() {
                    stale.abort();
                }
                inner.monitor_task = Some(tokio::spawn(monitor_approval(
                    subscription,
                    Arc::clone(&self.inner),
                    self.reset_delay,
                )));
            }
            Err(e) => {
                // The contract is live either way; only the automatic
                // Approved transition is lost.
                tracing::warn!(error = %e, "Approval subscription failed");
            }
        }

        Ok(instance)
    }

    /// Submit the approval transaction for the active instance.
    ///
    /// Queries the contract's approved flag first and rejects without
    /// submitting when it is already set. Submission failure leaves
    /// state untouched.
    pub async fn approve(&self) -> SyncResult<()> {
        let (address, phase) = {
            let inner = lock(&self.inner);
            (
                inner.instance.as_ref().map(|i| i.contract_address.clone()),
                inner.phase,
            )
        };
        let address =
            address.ok_or_else(|| SyncError::NotFound("no active escrow instance".to_string()))?;

        if phase == EscrowState::Approved {
            return Err(SyncError::AlreadyApproved);
        }
        if self.deployer.is_approved(&address).await? {
            return Err(SyncError::AlreadyApproved);
        }

        self.deployer.submit_approval(&address).await
    }

    /// Current observable lifecycle phase; `Reset` when idle.
    pub fn current_state(&self) -> EscrowState {
        lock(&self.inner).phase
    }

    /// Snapshot of the active instance, if any.
    pub fn instance(&self) -> Option<EscrowInstance> {
        lock(&self.inner).instance.clone()
    }

    /// Address of the active instance, if any.
    pub fn contract_address(&self) -> Option<WalletAddress> {
        lock(&self.inner)
            .instance
            .as_ref()
            .map(|i| i.contract_address.clone())
    }

    /// Whether a background watch or pending reset is still running.
    ///
    /// `false` with an active instance means the approval subscription
    /// was lost and no further transitions will happen on their own.
    pub fn is_watching(&self) -> bool {
        let inner = lock(&self.inner);
        inner
            .monitor_task
            .as_ref()
            .is_some_and(|t| !t.is_finished())
            || inner.reset_task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Tear down background tasks. Pending resets are aborted so a
    /// dead session cannot later mutate disposed state.
    pub fn shutdown(&self) {
        let mut inner = lock(&self.inner);
        if let Some(task) = inner.monitor_task.take() {
            task.abort();
        }
        if let Some(task) = inner.reset_task.take() {
            task.abort();
        }
    }
}

impl Drop for EscrowLifecycleManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Await the approval event, advance the state machine, and schedule
/// the automatic reset.
async fn monitor_approval(
    subscription: ApprovalSubscription,
    state: Arc<Mutex<Inner>>,
    reset_delay: Duration,
) {
    let Some(event) = subscription.resolved().await else {
        tracing::debug!("Approval subscription closed without an event");
        return;
    };

    tracing::info!(arbiter = %event.arbiter, "Approval event observed");

    let reset_state = Arc::clone(&state);
    let mut inner = lock(&state);
    if !inner.phase.can_advance_to(EscrowState::Approved) {
        tracing::warn!(phase = %inner.phase, "Ignoring approval event in this phase");
        return;
    }
    inner.phase = EscrowState::Approved;
    if let Some(instance) = inner.instance.as_mut() {
        instance.state = EscrowState::Approved;
    }
    if let Some(stale) = inner.reset_task.take() {
        stale.abort();
    }
    inner.reset_task = Some(tokio::spawn(schedule_reset(reset_state, reset_delay)));
}

/// After the configured delay, clear the instance so a new escrow may
/// be created.
async fn schedule_reset(state: Arc<Mutex<Inner>>, delay: Duration) {
    tokio::time::sleep(delay).await;
    let mut inner = lock(&state);
    if !inner.phase.can_advance_to(EscrowState::Reset) {
        return;
    }
    inner.phase = EscrowState::Reset;
    inner.instance = None;
    tracing::info!("Escrow reset; contract reference cleared");
}

fn lock(inner: &Arc<Mutex<Inner>>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
