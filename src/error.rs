//! Error taxonomy shared by every component.
//!
//! # Design Decisions
//! - Every operation returns `SyncResult<T>`; no raw transport or
//!   contract error escapes a component boundary
//! - Nothing is retried here. Reads are idempotent and retry is the
//!   caller's concern; writes are never silently retried
//! - Error messages never contain the gateway access credential

use thiserror::Error;

/// Errors that can occur while synchronizing against the ledger.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network or HTTP failure reaching the indexing gateway.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status, when the gateway answered at all.
        status: Option<u16>,
    },

    /// The gateway returned a structured error payload.
    #[error("remote error: {message}")]
    Remote {
        message: String,
        code: Option<i64>,
    },

    /// No matching balance, metadata, or contract data.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or invalid session identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Approval attempted on an escrow whose approved flag is already set.
    #[error("escrow already approved")]
    AlreadyApproved,

    /// Target contract lacks an expected read-only capability.
    #[error("unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// A lifecycle transition that would move backward.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidState { from: String, to: String },

    /// A string that should be a ledger address but is not.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Locally supplied input rejected before any remote call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Transport error without a status code.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Remote error without a gateway code.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            code: None,
        }
    }
}

/// Result type for all synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::Transport {
            message: "connection refused".to_string(),
            status: Some(502),
        };
        assert_eq!(err.to_string(), "transport error: connection refused");

        let err = SyncError::InvalidState {
            from: "Approved".to_string(),
            to: "Deploying".to_string(),
        };
        assert!(err.to_string().contains("Approved -> Deploying"));
    }

    #[test]
    fn test_already_approved_is_distinct() {
        let err = SyncError::AlreadyApproved;
        assert!(matches!(err, SyncError::AlreadyApproved));
    }
}
