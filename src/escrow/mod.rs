//! Escrow lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! manager.rs (state machine: Deploying → AwaitingApproval → Approved → Reset)
//!     → EscrowDeployer / ApprovalWatcher seams (types.rs)
//!     → contract.rs (chain-backed implementation)
//! ```
//!
//! The manager tracks exactly one instance at a time; reaching Reset
//! clears the reference so a new instance may be created.

pub mod contract;
pub mod manager;
pub mod types;

pub use contract::ChainEscrow;
pub use manager::EscrowLifecycleManager;
pub use types::{
    ApprovalEvent, ApprovalSubscription, ApprovalWatcher, DeployedEscrow, EscrowDeployer,
    EscrowInstance, EscrowState,
};
