//! Shared ledger connection handle.
//!
//! # Responsibilities
//! - Build the RPC provider lazily on first use and reuse it for the
//!   session lifetime
//! - Verify the connected chain matches configuration
//!
//! The context is passed explicitly into every collaborator; there is
//! no module-level singleton. Teardown is dropping the context.

use std::sync::Arc;
use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder};
use tokio::sync::OnceCell;
use tokio::time::timeout;

use crate::config::ChainConfig;
use crate::error::{SyncError, SyncResult};

/// Explicit session-scoped connection context.
pub struct ChainContext {
    config: ChainConfig,
    provider: OnceCell<Arc<dyn Provider + Send + Sync>>,
}

impl ChainContext {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            provider: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// RPC timeout for individual calls.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.rpc_timeout_secs)
    }

    /// The read provider, constructed on first use.
    pub async fn provider(&self) -> SyncResult<Arc<dyn Provider + Send + Sync>> {
        self.provider
            .get_or_try_init(|| async {
                let url: url::Url = self.config.rpc_url.parse().map_err(|e| {
                    SyncError::Config(format!(
                        "invalid RPC URL '{}': {}",
                        self.config.rpc_url, e
                    ))
                })?;
                tracing::info!(
                    rpc_url = %self.config.rpc_url,
                    chain_id = self.config.chain_id,
                    "Chain provider initialized"
                );
                Ok(Arc::new(ProviderBuilder::new().connect_http(url))
                    as Arc<dyn Provider + Send + Sync>)
            })
            .await
            .cloned()
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> SyncResult<()> {
        let provider = self.provider().await?;
        let chain_id = timeout(self.timeout(), provider.get_chain_id())
            .await
            .map_err(|_| SyncError::transport("chain ID query timed out"))?
            .map_err(|e| SyncError::transport(format!("chain ID query failed: {}", e)))?;
        if chain_id != self.config.chain_id {
            return Err(SyncError::Config(format!(
                "chain ID mismatch: expected {}, got {}",
                self.config.chain_id, chain_id
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ChainContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContext")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("connected", &self.provider.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_starts_disconnected() {
        let context = ChainContext::new(ChainConfig::default());
        assert!(!context.provider.initialized());
        assert_eq!(context.timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_invalid_rpc_url_is_config_error() {
        let mut config = ChainConfig::default();
        config.rpc_url = "not a url".to_string();
        let context = ChainContext::new(config);
        let err = context.provider().await.err().unwrap();
        assert!(matches!(err, SyncError::Config(_)));
    }
}
