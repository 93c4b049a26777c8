//! Indexing gateway subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (access credential)
//!     → client.rs (authenticated JSON-RPC envelope)
//!     → types.rs (wire shapes, quantity parsing)
//! ```
//!
//! The client is the sole leaf dependency of the transfer aggregator
//! and the balance resolver.

pub mod client;
pub mod types;

pub use client::LedgerClient;
pub use types::{OwnedNft, TokenMetadata, TransferCategory};
