//! COURIER Assets - Notification Asset Resolution
//!
//! Resolves what a push notification needs to render: remote images
//! (blocking download with timeout and size cap), packaged icons and sound
//! locators. Missing or unreachable assets degrade to absent values and
//! sentinels instead of errors.

pub mod remote_image;
pub mod resolver;
pub mod resources;

pub use remote_image::{
    decode_image, RemoteImage, RemoteImageLoader, DEFAULT_IMAGE_TIMEOUT, DEFAULT_MAX_IMAGE_BYTES,
};
pub use resolver::AssetResolver;
pub use resources::{
    PackageManifest, PackagedResources, ResourceCatalog, StaticResources, DRAWABLE_ID_BASE,
    MANIFEST_FILE, RAW_ID_BASE,
};

// Re-exported so callers can match on the detected encoding.
pub use image::ImageFormat;
