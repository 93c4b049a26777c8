//! Signing identity for transaction submission.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::error::{SyncError, SyncResult};

/// Environment variable name for the signing key.
pub const SIGNING_KEY_ENV_VAR: &str = "ESCROW_SYNC_SIGNING_KEY";

/// Wraps the locally held signing key.
#[derive(Clone)]
pub struct TxSigner {
    signer: PrivateKeySigner,
}

impl TxSigner {
    /// Create a signer from a hex-encoded private key string, with or
    /// without the 0x prefix. The key is never logged.
    pub fn from_private_key(private_key_hex: &str) -> SyncResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| SyncError::Config(format!("invalid signing key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Signer initialized");

        Ok(Self { signer })
    }

    /// Load the signing key from `ESCROW_SYNC_SIGNING_KEY`.
    pub fn from_env() -> SyncResult<Self> {
        let private_key = std::env::var(SIGNING_KEY_ENV_VAR).map_err(|_| {
            SyncError::Config(format!(
                "environment variable {} not set",
                SIGNING_KEY_ENV_VAR
            ))
        })?;
        Self::from_private_key(&private_key)
    }

    /// The ledger address this key controls.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wallet handle for provider construction.
    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for TxSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxSigner")
            .field("address", &self.signer.address())
            .finish()
    }
}
