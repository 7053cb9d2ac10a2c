//! Notification asset resolver.
//!
//! Combines a [`ResourceCatalog`] with a [`RemoteImageLoader`]. Nothing is
//! cached: every call resolves on demand.

use courier_core::{
    AssetError, ResourceId, ResourceKind, ResourceLocator, APP_ICON_UNAVAILABLE, ICON_NOT_FOUND,
};
use tracing::{debug, warn};

use crate::remote_image::{RemoteImage, RemoteImageLoader};
use crate::resources::ResourceCatalog;

/// Resolves the images, icons and sounds a notification refers to.
#[derive(Debug)]
pub struct AssetResolver<R: ResourceCatalog> {
    catalog: R,
    images: RemoteImageLoader,
}

impl<R: ResourceCatalog> AssetResolver<R> {
    pub fn new(catalog: R, images: RemoteImageLoader) -> Self {
        Self { catalog, images }
    }

    pub fn catalog(&self) -> &R {
        &self.catalog
    }

    pub fn images(&self) -> &RemoteImageLoader {
        &self.images
    }

    /// Download and decode `url`. `None` on any failure.
    pub fn fetch_remote_image(&self, url: &str) -> Option<RemoteImage> {
        self.images.fetch_remote_image(url)
    }

    /// Resource id of the host application's icon, or
    /// [`APP_ICON_UNAVAILABLE`] (-1).
    pub fn default_application_icon(&self) -> i32 {
        match self.catalog.application_icon() {
            Ok(id) => id.get(),
            Err(err) => {
                warn!(
                    package = %self.catalog.package_name(),
                    error = %err,
                    "Application icon unavailable"
                );
                APP_ICON_UNAVAILABLE
            }
        }
    }

    /// Locator of the raw sound resource `name`. Existence is not checked.
    pub fn resolve_sound_resource(&self, name: &str) -> ResourceLocator {
        ResourceLocator::new(self.catalog.package_name(), ResourceKind::Raw, name)
    }

    /// Resource id of the drawable `name`, or [`ICON_NOT_FOUND`] (0).
    pub fn resolve_icon_resource(&self, name: &str) -> i32 {
        match self.lookup_icon(name) {
            Ok(id) => id.get(),
            Err(err) => {
                debug!(name, error = %err, "Icon not resolved");
                ICON_NOT_FOUND
            }
        }
    }

    /// Resource id of the drawable `name`.
    ///
    /// An empty name fails with [`AssetError::EmptyName`] without consulting
    /// the catalog.
    pub fn lookup_icon(&self, name: &str) -> Result<ResourceId, AssetError> {
        if name.is_empty() {
            return Err(AssetError::EmptyName);
        }
        self.catalog.lookup(ResourceKind::Drawable, name)
    }
}
