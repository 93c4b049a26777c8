//! Transfer history subsystem.
//!
//! # Data Flow
//! ```text
//! indexer (inbound sub-query ∥ outbound sub-query)
//!     → aggregator.rs (fail-fast join, merge, order)
//!     → types.rs (normalization, direction derivation)
//!     → Vec<TransferRecord>
//! ```

pub mod aggregator;
pub mod types;

pub use aggregator::TransferAggregator;
pub use types::{Direction, TransferRecord};
