//! Client layer keeping local state synchronized with an on-ledger
//! escrow and a remote indexing gateway.

pub mod chain;
pub mod config;
pub mod error;
pub mod escrow;
pub mod governance;
pub mod indexer;
pub mod portfolio;
pub mod session;
pub mod transfers;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use session::{Session, WalletAddress};
