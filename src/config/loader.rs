//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::SyncConfig;
use crate::config::validation::validate_config;
use crate::error::{SyncError, SyncResult};

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> SyncResult<SyncConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| SyncError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    let config: SyncConfig = toml::from_str(&content)
        .map_err(|e| SyncError::Config(format!("failed to parse {}: {}", path.display(), e)))?;

    validate_config(&config).map_err(|errors| {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        SyncError::Config(format!("validation failed: {}", joined))
    })?;

    Ok(config)
}
