//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SyncConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Secrets (gateway credential, signing key) come only from
//!   environment variables, never from the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{ChainConfig, EscrowConfig, GatewayConfig, SyncConfig};
