//! Packaged resource catalogs.
//!
//! A catalog answers three questions about the host package: its name, its
//! application icon, and the identifier of a named drawable or raw resource.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use courier_core::{AssetError, ResourceId, ResourceKind};
use serde::Deserialize;
use tracing::{debug, warn};

/// First identifier assigned to drawables.
pub const DRAWABLE_ID_BASE: i32 = 0x7f02_0001;

/// First identifier assigned to raw resources.
pub const RAW_ID_BASE: i32 = 0x7f0b_0001;

/// File holding package metadata at the root of a resource tree.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Lookup of packaged resources by name.
pub trait ResourceCatalog: Send + Sync {
    /// Name of the host package. Always available.
    fn package_name(&self) -> &str;

    /// Identifier of the host application's icon.
    ///
    /// # Errors
    ///
    /// [`AssetError::PackageUnavailable`] when the package metadata cannot be
    /// read or names no icon; [`AssetError::ResourceNotFound`] when the icon it
    /// names does not exist.
    fn application_icon(&self) -> Result<ResourceId, AssetError>;

    /// Identifier of the resource `name` of `kind`.
    fn lookup(&self, kind: ResourceKind, name: &str) -> Result<ResourceId, AssetError>;
}

fn base_id(kind: ResourceKind) -> i32 {
    match kind {
        ResourceKind::Drawable => DRAWABLE_ID_BASE,
        ResourceKind::Raw => RAW_ID_BASE,
    }
}

fn not_found(kind: ResourceKind, name: &str) -> AssetError {
    AssetError::ResourceNotFound {
        kind,
        name: name.to_string(),
    }
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    pub package: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Identifiers for one resource kind, assigned from sorted file stems.
#[derive(Debug, Clone, Default)]
struct ResourceTable {
    ids: BTreeMap<String, ResourceId>,
}

impl ResourceTable {
    fn from_names(kind: ResourceKind, names: impl IntoIterator<Item = String>) -> Self {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names.dedup();

        let ids = names
            .into_iter()
            .zip(base_id(kind)..)
            .filter_map(|(name, raw)| ResourceId::new(raw).map(|id| (name, id)))
            .collect();
        Self { ids }
    }

    fn get(&self, name: &str) -> Option<ResourceId> {
        self.ids.get(name).copied()
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Resources laid out on disk:
///
/// ```text
/// <root>/manifest.json     {"package": "com.example.app", "icon": "ic_launcher"}
/// <root>/drawable/*.png    icons, looked up by file stem
/// <root>/raw/*.mp3         sounds, looked up by file stem
/// ```
///
/// The tree is scanned once when opened. A missing or unreadable manifest,
/// or one describing another package, leaves drawable and raw lookups working
/// while the application icon reports [`AssetError::PackageUnavailable`].
#[derive(Debug)]
pub struct PackagedResources {
    root: PathBuf,
    package: String,
    manifest: Result<PackageManifest, AssetError>,
    drawables: ResourceTable,
    raw: ResourceTable,
}

impl PackagedResources {
    /// Scan the tree at `root` for `package`.
    pub fn open(root: impl AsRef<Path>, package: &str) -> Self {
        let root = root.as_ref().to_path_buf();
        let manifest = read_manifest(&root, package);
        if let Err(err) = &manifest {
            warn!(root = %root.display(), error = %err, "Package metadata unavailable");
        }

        let drawables = ResourceTable::from_names(
            ResourceKind::Drawable,
            scan_stems(&root.join(ResourceKind::Drawable.dir_name())),
        );
        let raw = ResourceTable::from_names(
            ResourceKind::Raw,
            scan_stems(&root.join(ResourceKind::Raw.dir_name())),
        );

        debug!(
            root = %root.display(),
            package,
            drawables = drawables.len(),
            raw = raw.len(),
            "Scanned packaged resources"
        );

        Self {
            root,
            package: package.to_string(),
            manifest,
            drawables,
            raw,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parsed package metadata, if it was readable.
    pub fn manifest(&self) -> Option<&PackageManifest> {
        self.manifest.as_ref().ok()
    }

    fn table(&self, kind: ResourceKind) -> &ResourceTable {
        match kind {
            ResourceKind::Drawable => &self.drawables,
            ResourceKind::Raw => &self.raw,
        }
    }
}

impl ResourceCatalog for PackagedResources {
    fn package_name(&self) -> &str {
        &self.package
    }

    fn application_icon(&self) -> Result<ResourceId, AssetError> {
        let manifest = self.manifest.as_ref().map_err(Clone::clone)?;
        let icon = manifest
            .icon
            .as_deref()
            .filter(|icon| !icon.is_empty())
            .ok_or_else(|| AssetError::PackageUnavailable {
                reason: format!("manifest for {} declares no icon", manifest.package),
            })?;
        self.lookup(ResourceKind::Drawable, icon)
    }

    fn lookup(&self, kind: ResourceKind, name: &str) -> Result<ResourceId, AssetError> {
        if name.is_empty() {
            return Err(AssetError::EmptyName);
        }
        self.table(kind)
            .get(name)
            .ok_or_else(|| not_found(kind, name))
    }
}

fn read_manifest(root: &Path, package: &str) -> Result<PackageManifest, AssetError> {
    let path = root.join(MANIFEST_FILE);
    let content = fs::read_to_string(&path).map_err(|e| AssetError::PackageUnavailable {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    let manifest: PackageManifest =
        serde_json::from_str(&content).map_err(|e| AssetError::PackageUnavailable {
            reason: format!("failed to parse {}: {}", path.display(), e),
        })?;

    if manifest.package != package {
        return Err(AssetError::PackageUnavailable {
            reason: format!(
                "manifest describes package {:?}, expected {:?}",
                manifest.package, package
            ),
        });
    }
    Ok(manifest)
}

/// File stems of the regular files in `dir`. A missing directory is empty.
fn scan_stems(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "Resource directory not readable");
            return Vec::new();
        }
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            entry
                .path()
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .collect()
}

/// In-memory catalog built in code.
///
/// ```ignore
/// let catalog = StaticResources::new("com.example.app")
///     .with_resource(ResourceKind::Drawable, "ic_launcher")
///     .with_resource(ResourceKind::Raw, "chime")
///     .with_application_icon("ic_launcher");
/// ```
#[derive(Debug)]
pub struct StaticResources {
    package: String,
    app_icon: Option<String>,
    drawables: Vec<String>,
    raw: Vec<String>,
    lookups: AtomicU64,
}

impl StaticResources {
    /// A catalog for `package` with no resources and no application metadata.
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            app_icon: None,
            drawables: Vec::new(),
            raw: Vec::new(),
            lookups: AtomicU64::new(0),
        }
    }

    /// Register a resource. Identifiers follow the same sorted-name scheme
    /// as [`PackagedResources`].
    pub fn with_resource(mut self, kind: ResourceKind, name: impl Into<String>) -> Self {
        match kind {
            ResourceKind::Drawable => self.drawables.push(name.into()),
            ResourceKind::Raw => self.raw.push(name.into()),
        }
        self
    }

    /// Declare application metadata naming `icon` as the application icon.
    pub fn with_application_icon(mut self, icon: impl Into<String>) -> Self {
        self.app_icon = Some(icon.into());
        self
    }

    /// Number of `lookup` calls made against this catalog.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }

    fn names(&self, kind: ResourceKind) -> &[String] {
        match kind {
            ResourceKind::Drawable => &self.drawables,
            ResourceKind::Raw => &self.raw,
        }
    }
}

impl ResourceCatalog for StaticResources {
    fn package_name(&self) -> &str {
        &self.package
    }

    fn application_icon(&self) -> Result<ResourceId, AssetError> {
        let icon = self
            .app_icon
            .as_deref()
            .ok_or_else(|| AssetError::PackageUnavailable {
                reason: format!("no application metadata for {}", self.package),
            })?;
        self.lookup(ResourceKind::Drawable, icon)
    }

    fn lookup(&self, kind: ResourceKind, name: &str) -> Result<ResourceId, AssetError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if name.is_empty() {
            return Err(AssetError::EmptyName);
        }
        ResourceTable::from_names(kind, self.names(kind).iter().cloned())
            .get(name)
            .ok_or_else(|| not_found(kind, name))
    }
}
