//! Packaged resource identifiers and locators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel returned when a named icon cannot be resolved.
pub const ICON_NOT_FOUND: i32 = 0;

/// Sentinel returned when the host application's icon cannot be resolved.
pub const APP_ICON_UNAVAILABLE: i32 = -1;

/// URI scheme for packaged resources.
pub const RESOURCE_SCHEME: &str = "android.resource";

/// Identifier of a packaged resource. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(i32);

impl ResourceId {
    /// Wrap a raw identifier. Returns `None` for zero or negative values,
    /// which are reserved for sentinels.
    pub fn new(raw: i32) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Resource directories a package exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Drawable,
    Raw,
}

impl ResourceKind {
    /// Directory name of this kind inside a package.
    pub fn dir_name(self) -> &'static str {
        match self {
            ResourceKind::Drawable => "drawable",
            ResourceKind::Raw => "raw",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Locator of a packaged resource: `android.resource://<package>/<kind>/<name>`.
///
/// Construction never touches the filesystem; existence is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLocator(String);

impl ResourceLocator {
    pub fn new(package: &str, kind: ResourceKind, name: &str) -> Self {
        Self(format!(
            "{}://{}/{}/{}",
            RESOURCE_SCHEME,
            package,
            kind.dir_name(),
            name
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_rejects_sentinels() {
        assert!(ResourceId::new(0).is_none());
        assert!(ResourceId::new(-1).is_none());
        assert_eq!(ResourceId::new(0x7f02_0001).map(ResourceId::get), Some(0x7f02_0001));
    }

    #[test]
    fn test_locator_format() {
        let locator = ResourceLocator::new("com.example.shop", ResourceKind::Raw, "chime");
        assert_eq!(locator.as_str(), "android.resource://com.example.shop/raw/chime");
    }
}
