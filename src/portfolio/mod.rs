//! Holdings subsystem.
//!
//! # Data Flow
//! ```text
//! indexer (raw balances, metadata, native balance)
//!     → resolver.rs (filter zeros, join metadata, append native)
//!     → units.rs (exact decimal conversion)
//!     → Vec<Holding>
//! ```

pub mod resolver;
pub mod types;
pub mod units;

pub use resolver::{BalanceResolver, PortfolioQueries, NATIVE_DECIMALS};
pub use types::{AssetId, Holding};
