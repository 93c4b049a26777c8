//! Session identity for wallet-scoped operations.
//!
//! # Responsibilities
//! - Hold the client wallet address for the lifetime of a session
//! - Reject wallet-scoped operations when no identity is present
//!
//! Ledger addresses compare case-insensitively: the same account may be
//! rendered checksummed or lowercased depending on the source.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Environment variable holding the session wallet address.
pub const WALLET_ENV_VAR: &str = "ESCROW_SYNC_WALLET";

/// An opaque ledger identity. Equality and hashing ignore ASCII case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create an address, rejecting empty strings.
    pub fn new(raw: impl Into<String>) -> SyncResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SyncError::InvalidAddress("empty address".to_string()));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form, used for cache keys and wire parameters.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl PartialEq for WalletAddress {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for WalletAddress {}

impl Hash for WalletAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A client-held identity supplied to all wallet-scoped operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    wallet: WalletAddress,
}

impl Session {
    /// Open a session for a known wallet address.
    pub fn new(wallet: WalletAddress) -> Self {
        Self { wallet }
    }

    /// Build a session from an optional address string.
    ///
    /// Absence or emptiness yields `Unauthorized` so callers can skip
    /// the remote call entirely.
    pub fn try_from_address(address: Option<&str>) -> SyncResult<Self> {
        match address {
            Some(raw) if !raw.trim().is_empty() => Ok(Self::new(WalletAddress::new(raw)?)),
            _ => Err(SyncError::Unauthorized(
                "no wallet address in session".to_string(),
            )),
        }
    }

    /// Read the session identity from `ESCROW_SYNC_WALLET`.
    pub fn from_env() -> SyncResult<Self> {
        let raw = std::env::var(WALLET_ENV_VAR).ok();
        Self::try_from_address(raw.as_deref())
    }

    pub fn wallet(&self) -> &WalletAddress {
        &self.wallet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(addr: &WalletAddress) -> u64 {
        let mut h = DefaultHasher::new();
        addr.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_address_equality_ignores_case() {
        let a = WalletAddress::new("0xAbCd1234").unwrap();
        let b = WalletAddress::new("0xabcd1234").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_empty_address_rejected() {
        assert!(WalletAddress::new("").is_err());
        assert!(WalletAddress::new("   ").is_err());
    }

    #[test]
    fn test_missing_session_is_unauthorized() {
        let err = Session::try_from_address(None).unwrap_err();
        assert!(matches!(err, SyncError::Unauthorized(_)));

        let err = Session::try_from_address(Some("")).unwrap_err();
        assert!(matches!(err, SyncError::Unauthorized(_)));
    }

    #[test]
    fn test_session_keeps_original_casing() {
        let session = Session::try_from_address(Some("0xAbCd")).unwrap();
        assert_eq!(session.wallet().as_str(), "0xAbCd");
    }
}
