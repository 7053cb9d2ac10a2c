//! COURIER Test Utilities
//!
//! Centralized test infrastructure for the COURIER workspace:
//! - Proptest generators for surfaces, propositions and cache mappings
//! - Test fixtures for common scenarios (payloads, images, resource trees)
//! - Custom assertions for proposition payload fidelity

// Re-export the in-memory backend from its source crate
pub use courier_storage::{InMemoryPropositionBackend, PropositionCacheStore, Watermark};

// Re-export resource catalogs from their source crate
pub use courier_assets::{PackagedResources, StaticResources};

// Re-export core types for convenience
pub use courier_core::{
    AssetConfig, AssetError, CacheConfig, CourierConfig, CourierError, CourierResult, ItemSchema,
    Proposition, PropositionMap, ResourceKind, StorageError, Surface,
};

use serde_json::{json, Value};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating COURIER payloads.

    use super::*;
    use proptest::prelude::*;
    use serde_json::Map;

    /// Generate an application id such as `com.example`.
    pub fn arb_app_id() -> impl Strategy<Value = String> {
        "[a-z]{2,8}\\.[a-z]{2,8}"
    }

    /// Generate a surface, with or without a path.
    ///
    /// Inputs carry the padding and stray slashes callers pass in practice;
    /// only combinations the constructors accept are kept.
    pub fn arb_surface() -> impl Strategy<Value = Surface> {
        (arb_raw_app_id(), proptest::option::of(arb_raw_path())).prop_filter_map(
            "surface input rejected",
            |(app, path)| match path {
                Some(path) => Surface::with_path(&app, &path).ok(),
                None => Surface::for_app(&app).ok(),
            },
        )
    }

    /// Generate an app id as a caller might pass it: possibly padded, with a
    /// trailing slash, or blank.
    pub fn arb_raw_app_id() -> impl Strategy<Value = String> {
        (
            prop_oneof![
                4 => arb_app_id(),
                1 => Just(String::new()),
                1 => "[a-z]{1,4} [a-z]{1,4}",
            ],
            "[ ]{0,2}",
            "/{0,2}",
        )
            .prop_map(|(app, pad, slashes)| format!("{}{}{}{}", pad, app, slashes, pad))
    }

    /// Generate a surface path with optional surrounding slashes or spaces.
    pub fn arb_raw_path() -> impl Strategy<Value = String> {
        "[ /]{0,2}[a-z0-9]{0,8}(/[a-z0-9 ]{1,8}){0,2}[ /]{0,2}"
    }

    /// Generate a JSON leaf value (no floats, so equality is exact).
    pub fn arb_json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
        ]
    }

    /// Generate an object of fields the model does not know about.
    pub fn arb_extra_fields() -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::vec(("x_[a-z]{1,6}", arb_json_leaf()), 0..4)
            .prop_map(|fields| fields.into_iter().collect())
    }

    /// Generate a known item schema URI.
    pub fn arb_schema_uri() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just(ItemSchema::CONTENT_CARD),
            Just(ItemSchema::JSON_CONTENT),
            Just(ItemSchema::HTML_CONTENT),
            Just(ItemSchema::IN_APP),
            Just(ItemSchema::RULESET),
        ]
    }

    /// Generate one proposition item as event data.
    pub fn arb_item() -> impl Strategy<Value = Value> {
        ("[a-z0-9-]{4,16}", arb_schema_uri(), arb_extra_fields(), arb_extra_fields()).prop_map(
            |(id, schema, data, extra)| {
                let mut item = Map::new();
                item.insert("id".to_string(), Value::String(id));
                item.insert("schema".to_string(), Value::String(schema.to_string()));
                item.insert("data".to_string(), Value::Object(data));
                item.extend(extra);
                Value::Object(item)
            },
        )
    }

    /// Generate a proposition scoped to `surface`.
    pub fn arb_proposition_for(surface: Surface) -> impl Strategy<Value = Proposition> {
        (
            "[a-z0-9-]{4,16}",
            arb_extra_fields(),
            prop::collection::vec(arb_item(), 0..3),
            arb_extra_fields(),
        )
            .prop_map(move |(id, scope_details, items, extra)| {
                let mut raw = Map::new();
                raw.insert("id".to_string(), Value::String(id));
                raw.insert("scope".to_string(), Value::String(surface.uri().to_string()));
                raw.insert("scopeDetails".to_string(), Value::Object(scope_details));
                raw.insert("items".to_string(), Value::Array(items));
                raw.extend(extra);
                Proposition::from_event_data(Value::Object(raw))
                    .expect("generated proposition is valid")
            })
    }

    /// Generate a non-empty surface → propositions mapping.
    pub fn arb_proposition_map() -> impl Strategy<Value = PropositionMap> {
        prop::collection::btree_set(arb_surface(), 1..4)
            .prop_flat_map(|surfaces| {
                surfaces
                    .into_iter()
                    .map(|surface| {
                        prop::collection::vec(arb_proposition_for(surface.clone()), 1..4)
                            .prop_map(move |propositions| (surface.clone(), propositions))
                    })
                    .collect::<Vec<_>>()
            })
            .prop_map(|entries| entries.into_iter().collect::<PropositionMap>())
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;

    /// Application id used across fixtures.
    pub const APP_ID: &str = "com.example.shop";

    pub fn home_surface() -> Surface {
        Surface::with_path(APP_ID, "home").expect("fixture surface is valid")
    }

    /// A personalization payload as delivered in event data, including
    /// fields the model does not interpret.
    pub fn personalization_payload() -> Value {
        json!({
            "id": "a6f9e2b0-4c1d-4e8a-9a64-3d2f1c0b7e55",
            "scope": home_surface().uri(),
            "scopeDetails": {
                "decisionProvider": "AJO",
                "correlationID": "c1e4b7a2-0000-4f00-8000-93a1d2e3f4a5",
                "characteristics": { "eventToken": "eyJtZXNzYWdlRXhlY3V0aW9uIjp7fX0=" },
                "activity": { "id": "activity-1#treatment-1" }
            },
            "items": [{
                "id": "9d2c6e7f-5b1a-4c3d-8e9f-0a1b2c3d4e5f",
                "schema": ItemSchema::CONTENT_CARD,
                "data": {
                    "expiryDate": 1893456000,
                    "publishedDate": 1704067200,
                    "contentType": "application/json",
                    "meta": { "surface": home_surface().uri() },
                    "content": {
                        "title": { "content": "Spring sale" },
                        "body": { "content": "Everything 20% off this week." },
                        "image": { "url": "https://example.com/sale.png", "alt": "sale" },
                        "actionUrl": "https://example.com/sale",
                        "buttons": [{
                            "interactId": "shop-now",
                            "actionUrl": "https://example.com/sale/shop",
                            "text": { "content": "Shop now" }
                        }],
                        "dismissBtn": { "style": "simple" }
                    }
                },
                "trackingHint": "kept verbatim"
            }],
            "activity": { "priority": 3 }
        })
    }

    /// A proposition with a single content-card item titled `title`.
    pub fn content_card_proposition(surface: &Surface, id: &str, title: &str) -> Proposition {
        Proposition::from_event_data(json!({
            "id": id,
            "scope": surface.uri(),
            "scopeDetails": { "decisionProvider": "AJO" },
            "items": [{
                "id": format!("{}-card", id),
                "schema": ItemSchema::CONTENT_CARD,
                "data": {
                    "content": {
                        "title": { "content": title },
                        "actionUrl": format!("https://example.com/{}", id)
                    }
                }
            }]
        }))
        .expect("fixture proposition is valid")
    }

    /// Mapping with one surface.
    pub fn single_surface(surface: Surface, propositions: Vec<Proposition>) -> PropositionMap {
        let mut map = PropositionMap::new();
        map.insert(surface, propositions);
        map
    }

    /// A solid-colour PNG.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([200u8, 30, 60, 255]));
        let mut out = Cursor::new(Vec::new());
        buffer
            .write_to(&mut out, ImageFormat::Png)
            .expect("PNG encoding succeeds");
        out.into_inner()
    }

    /// Catalog with an application icon, one extra drawable and one sound.
    pub fn static_resources() -> StaticResources {
        StaticResources::new(APP_ID)
            .with_resource(ResourceKind::Drawable, "ic_launcher")
            .with_resource(ResourceKind::Drawable, "ic_bell")
            .with_resource(ResourceKind::Raw, "chime")
            .with_application_icon("ic_launcher")
    }

    /// Write a resource tree under `root`: manifest (when given), the
    /// drawables `ic_bell.png`, `ic_launcher.png` and the sound `chime.mp3`.
    pub fn write_resource_tree(root: &Path, manifest: Option<&Value>) {
        if let Some(manifest) = manifest {
            fs::write(
                root.join(courier_assets::MANIFEST_FILE),
                serde_json::to_vec_pretty(manifest).expect("manifest serializes"),
            )
            .expect("manifest written");
        }
        let drawable = root.join("drawable");
        let raw = root.join("raw");
        fs::create_dir_all(&drawable).expect("drawable dir created");
        fs::create_dir_all(&raw).expect("raw dir created");
        fs::write(drawable.join("ic_bell.png"), png_bytes(1, 1)).expect("icon written");
        fs::write(drawable.join("ic_launcher.png"), png_bytes(1, 1)).expect("icon written");
        fs::write(raw.join("chime.mp3"), b"ID3").expect("sound written");
    }

    /// Manifest matching [`APP_ID`] with `ic_launcher` as the icon.
    pub fn manifest() -> Value {
        json!({ "package": APP_ID, "icon": "ic_launcher" })
    }

    /// Valid configuration rooted at `dir`.
    pub fn test_config(dir: &Path) -> CourierConfig {
        CourierConfig {
            app_id: APP_ID.to_string(),
            cache: CacheConfig {
                path: dir.join("cache"),
                map_size_mb: 10,
            },
            assets: AssetConfig {
                resource_root: dir.join("res"),
                image_timeout_ms: 2_000,
                max_image_bytes: 1024 * 1024,
            },
        }
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on proposition payloads.

    use super::*;

    /// Assert that `proposition` serializes to exactly `expected`, key order
    /// included.
    pub fn assert_same_event_data(proposition: &Proposition, expected: &Value) {
        let actual = serde_json::to_string(&proposition.to_event_data())
            .expect("proposition serializes");
        let expected = serde_json::to_string(expected).expect("expected value serializes");
        assert_eq!(actual, expected, "proposition event data differs");
    }

    /// Assert two mappings hold the same propositions in the same order,
    /// comparing serialized forms.
    pub fn assert_same_mapping(actual: &PropositionMap, expected: &PropositionMap) {
        assert_eq!(actual.len(), expected.len(), "surface count differs");
        for (surface, propositions) in expected {
            let found = actual
                .get(surface)
                .unwrap_or_else(|| panic!("surface {} missing", surface));
            assert_eq!(found.len(), propositions.len(), "count differs for {}", surface);
            for (a, e) in found.iter().zip(propositions) {
                assert_same_event_data(a, &e.to_event_data());
            }
        }
    }
}
