//! Error types for the CLI.

use courier_core::{AssetError, ConfigError, CourierError};
use courier_storage::LmdbCacheError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Courier(#[from] CourierError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("Failed to open cache: {0}")]
    Cache(#[from] LmdbCacheError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid proposition document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("Image unavailable: {url}")]
    ImageUnavailable { url: String },
    #[error("Failed to initialize logging: {0}")]
    Telemetry(String),
}
