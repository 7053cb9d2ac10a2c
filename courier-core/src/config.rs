//! Configuration types
//!
//! All fields are required. No defaults; `validate` rejects values that would
//! make a component unusable.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Durable proposition cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Directory holding the LMDB environment.
    pub path: PathBuf,
    /// Maximum size of the LMDB map in megabytes.
    pub map_size_mb: usize,
}

/// Asset resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetConfig {
    /// Root of the packaged resource tree (manifest, drawable/, raw/).
    pub resource_root: PathBuf,
    /// Whole-request timeout for remote image downloads.
    pub image_timeout_ms: u64,
    /// Largest image body accepted, in bytes.
    pub max_image_bytes: u64,
}

impl AssetConfig {
    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }
}

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// Application (package) id; base of every surface URI and resource locator.
    pub app_id: String,
    pub cache: CacheConfig,
    pub assets: AssetConfig,
}

impl CourierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(invalid("app_id", &self.app_id, "must not be empty"));
        }
        if self.app_id.contains(['/', ' ']) {
            return Err(invalid(
                "app_id",
                &self.app_id,
                "must not contain '/' or spaces",
            ));
        }
        if self.cache.path.as_os_str().is_empty() {
            return Err(invalid("cache.path", "", "must not be empty"));
        }
        if self.cache.map_size_mb == 0 {
            return Err(invalid("cache.map_size_mb", "0", "must be > 0"));
        }
        if self.cache.map_size_mb.checked_mul(1024 * 1024).is_none() {
            return Err(invalid(
                "cache.map_size_mb",
                &self.cache.map_size_mb.to_string(),
                "exceeds the addressable size",
            ));
        }
        if self.assets.resource_root.as_os_str().is_empty() {
            return Err(invalid("assets.resource_root", "", "must not be empty"));
        }
        if self.assets.image_timeout_ms == 0 {
            return Err(invalid("assets.image_timeout_ms", "0", "must be > 0"));
        }
        if self.assets.max_image_bytes == 0 {
            return Err(invalid("assets.max_image_bytes", "0", "must be > 0"));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
