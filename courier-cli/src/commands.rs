//! Command implementations. Each returns the text printed on stdout.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use courier_assets::{AssetResolver, PackagedResources, RemoteImageLoader};
use courier_core::{CourierConfig, CourierError, PropositionMap, Surface};
use courier_storage::{ContentCardProvider, LmdbPropositionBackend, PropositionCacheStore};
use tracing::info;

use crate::args::Command;
use crate::error::CliError;

type Store = PropositionCacheStore<LmdbPropositionBackend>;

pub fn execute(config: &CourierConfig, command: &Command) -> Result<String, CliError> {
    match command {
        Command::Inspect => inspect(&*open_store(config)?),
        Command::Import { file } => import(&*open_store(config)?, file),
        Command::Clear => clear(&*open_store(config)?),
        Command::Cards { surface_path } => cards(config, open_store(config)?, surface_path),
        Command::FetchImage { url } => fetch_image(&open_resolver(config)?, url),
        Command::Icon { name } => Ok(open_resolver(config)?.resolve_icon_resource(name).to_string()),
        Command::AppIcon => Ok(open_resolver(config)?.default_application_icon().to_string()),
        Command::Sound { name } => Ok(open_resolver(config)?
            .resolve_sound_resource(name)
            .to_string()),
    }
}

fn open_store(config: &CourierConfig) -> Result<Arc<Store>, CliError> {
    let backend = LmdbPropositionBackend::new(&config.cache.path, config.cache.map_size_mb)?;
    Ok(Arc::new(PropositionCacheStore::new(Arc::new(backend))))
}

fn open_resolver(config: &CourierConfig) -> Result<AssetResolver<PackagedResources>, CliError> {
    let catalog = PackagedResources::open(&config.assets.resource_root, &config.app_id);
    let images = RemoteImageLoader::from_config(&config.assets)?;
    Ok(AssetResolver::new(catalog, images))
}

fn inspect(store: &Store) -> Result<String, CliError> {
    let surfaces = store.surfaces();
    let watermark = store.watermark();
    let mut out = String::new();

    if surfaces.is_empty() {
        let _ = write!(out, "cache is empty (generation {})", watermark.generation);
        return Ok(out);
    }

    let _ = writeln!(
        out,
        "generation {} written {}",
        watermark.generation,
        watermark.observed_at.to_rfc3339()
    );
    let mapping = store.propositions_for_surfaces(&surfaces);
    for surface in &surfaces {
        let count = mapping.get(surface).map(Vec::len).unwrap_or(0);
        let _ = writeln!(out, "{}\t{} propositions", surface, count);
    }
    Ok(out.trim_end().to_string())
}

fn import(store: &Store, file: &Path) -> Result<String, CliError> {
    let contents = std::fs::read_to_string(file).map_err(|source| CliError::Read {
        path: file.display().to_string(),
        source,
    })?;
    let mapping: PropositionMap = serde_json::from_str(&contents)?;
    let surfaces = mapping.len();
    let propositions: usize = mapping.values().map(Vec::len).sum();

    let watermark = store.write(Some(mapping))?;
    info!(
        file = %file.display(),
        surfaces,
        propositions,
        generation = watermark.generation,
        "Imported propositions"
    );
    Ok(format!(
        "imported {} propositions for {} surfaces (generation {})",
        propositions, surfaces, watermark.generation
    ))
}

fn clear(store: &Store) -> Result<String, CliError> {
    let watermark = store.clear()?;
    info!(generation = watermark.generation, "Cleared proposition cache");
    Ok(format!("cleared (generation {})", watermark.generation))
}

fn cards(config: &CourierConfig, store: Arc<Store>, surface_path: &str) -> Result<String, CliError> {
    let surface = Surface::with_path(&config.app_id, surface_path).map_err(CourierError::from)?;
    let cards = ContentCardProvider::new(store, surface).content();
    Ok(serde_json::to_string_pretty(&cards)?)
}

fn fetch_image(resolver: &AssetResolver<PackagedResources>, url: &str) -> Result<String, CliError> {
    let image = resolver
        .fetch_remote_image(url)
        .ok_or_else(|| CliError::ImageUnavailable {
            url: url.to_string(),
        })?;
    Ok(format!(
        "{}x{} {:?} ({} bytes RGBA)",
        image.width,
        image.height,
        image.format,
        image.pixels.len()
    ))
}
