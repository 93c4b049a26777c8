//! Governance subsystem.
//!
//! # Data Flow
//! ```text
//! adapter.rs (session gating, vote formatting, amount parsing)
//!     → GovernanceCalls seam
//!     → contract.rs (chain-backed reads and writes)
//! ```

pub mod adapter;
pub mod contract;

pub use adapter::{GovernanceAdapter, GovernanceCalls, VotingPower};
pub use contract::ChainGovernance;
