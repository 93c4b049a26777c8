//! Ledger connection subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (signing key)
//!     → signer.rs (key loading, wallet handle)
//!     → provider.rs (lazy shared RPC provider)
//!     → escrow / governance collaborators
//! ```
//!
//! # Security Constraints
//! - Signing keys ONLY from environment variables
//! - Never log keys or the gateway credential
//! - All RPC calls have configurable timeouts

pub mod provider;
pub mod signer;

pub use provider::ChainContext;
pub use signer::TxSigner;

use alloy::primitives::Address;

use crate::error::{SyncError, SyncResult};
use crate::session::WalletAddress;

/// Parse an opaque wallet address into a ledger address.
pub fn parse_address(addr: &WalletAddress) -> SyncResult<Address> {
    addr.as_str()
        .parse()
        .map_err(|e| SyncError::InvalidAddress(format!("{}: {}", addr.as_str(), e)))
}
