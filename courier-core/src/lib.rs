//! COURIER Core - Data Types
//!
//! Value types shared by the proposition cache and the asset resolver:
//! surfaces, propositions, content-card templates, resource identifiers,
//! configuration and the error taxonomy. No I/O lives here.

pub mod card;
pub mod config;
pub mod error;
pub mod proposition;
pub mod resource;
pub mod surface;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

pub use card::{
    CardButton, CardColor, CardFont, CardImage, CardText, DismissButton, SmallImageTemplate,
};
pub use config::{AssetConfig, CacheConfig, CourierConfig};
pub use error::{
    AssetError, ConfigError, CourierError, CourierResult, StorageError, ValidationError,
};
pub use proposition::{ItemSchema, Proposition, PropositionItem, PropositionMap};
pub use resource::{
    ResourceId, ResourceKind, ResourceLocator, APP_ICON_UNAVAILABLE, ICON_NOT_FOUND,
    RESOURCE_SCHEME,
};
pub use surface::{Surface, SURFACE_SCHEME};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// SHA-256 content hash for integrity verification.
pub type ContentHash = [u8; 32];

/// Compute SHA-256 hash of content.
pub fn compute_content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}
