//! Semantic validation, separate from serde's syntactic checks.

use alloy::primitives::U256;

use crate::config::schema::SyncConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a loaded configuration. Collects all failures.
pub fn validate_config(config: &SyncConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.gateway.base_url.trim().is_empty() {
        errors.push(ValidationError("gateway.base_url must not be empty".to_string()));
    }
    if url::Url::parse(&config.gateway.base_url).is_err() {
        errors.push(ValidationError(format!(
            "gateway.base_url is not a valid URL: {}",
            config.gateway.base_url
        )));
    }
    if config.gateway.request_timeout_secs == 0 {
        errors.push(ValidationError(
            "gateway.request_timeout_secs must be positive".to_string(),
        ));
    }
    if config.chain.rpc_url.trim().is_empty() {
        errors.push(ValidationError("chain.rpc_url must not be empty".to_string()));
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError(
            "chain.rpc_timeout_secs must be positive".to_string(),
        ));
    }
    match config.escrow.deposit_wei.parse::<U256>() {
        Ok(v) if v.is_zero() => {
            errors.push(ValidationError("escrow.deposit_wei must be nonzero".to_string()));
        }
        Ok(_) => {}
        Err(_) => {
            errors.push(ValidationError(format!(
                "escrow.deposit_wei is not a decimal integer: {}",
                config.escrow.deposit_wei
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
