//! Proposition payloads.
//!
//! A proposition keeps the exact JSON object it was decoded from. Typed
//! accessors read through to that object, so unknown fields and key order
//! survive any number of persistence round trips.

use crate::card::SmallImageTemplate;
use crate::error::ValidationError;
use crate::surface::Surface;
use crate::Timestamp;
use chrono::DateTime;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Mapping from surface to its propositions, in delivery order.
pub type PropositionMap = HashMap<Surface, Vec<Proposition>>;

const FIELD_ID: &str = "id";
const FIELD_SCOPE: &str = "scope";
const FIELD_SCOPE_DETAILS: &str = "scopeDetails";
const FIELD_ITEMS: &str = "items";
const FIELD_SCHEMA: &str = "schema";
const FIELD_DATA: &str = "data";
const FIELD_EXPIRY_DATE: &str = "expiryDate";

/// Personalization payload assigned to a surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Proposition {
    raw: Map<String, Value>,
}

impl Proposition {
    /// Decode a proposition from server-delivered event data.
    pub fn from_event_data(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Self::try_from(map),
            other => Err(ValidationError::InvalidValue {
                field: "proposition".to_string(),
                reason: format!("expected an object, got {}", json_kind(&other)),
            }),
        }
    }

    /// The event data this proposition was decoded from.
    pub fn to_event_data(&self) -> Value {
        Value::Object(self.raw.clone())
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn id(&self) -> &str {
        str_field(&self.raw, FIELD_ID)
    }

    /// Scope identifier, normally the URI of the target surface.
    pub fn scope(&self) -> &str {
        str_field(&self.raw, FIELD_SCOPE)
    }

    pub fn scope_details(&self) -> Option<&Map<String, Value>> {
        self.raw.get(FIELD_SCOPE_DETAILS).and_then(Value::as_object)
    }

    /// The surface this proposition is scoped to.
    pub fn surface(&self) -> Result<Surface, ValidationError> {
        Surface::from_uri(self.scope())
    }

    pub fn items(&self) -> impl Iterator<Item = PropositionItem<'_>> {
        self.raw
            .get(FIELD_ITEMS)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .map(|raw| PropositionItem { raw })
    }

    pub fn first_item(&self) -> Option<PropositionItem<'_>> {
        self.items().next()
    }

    /// True when any item carries an expiry at or before `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.items()
            .filter_map(|item| item.expires_at())
            .any(|expiry| expiry <= now)
    }
}

impl TryFrom<Map<String, Value>> for Proposition {
    type Error = ValidationError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        require_str(&raw, FIELD_ID, "proposition.id")?;
        require_str(&raw, FIELD_SCOPE, "proposition.scope")?;

        if let Some(details) = raw.get(FIELD_SCOPE_DETAILS) {
            if !details.is_object() {
                return Err(ValidationError::InvalidValue {
                    field: "proposition.scopeDetails".to_string(),
                    reason: format!("expected an object, got {}", json_kind(details)),
                });
            }
        }

        if let Some(items) = raw.get(FIELD_ITEMS) {
            let items = items
                .as_array()
                .ok_or_else(|| ValidationError::InvalidValue {
                    field: "proposition.items".to_string(),
                    reason: format!("expected an array, got {}", json_kind(items)),
                })?;
            for (index, item) in items.iter().enumerate() {
                let item = item
                    .as_object()
                    .ok_or_else(|| ValidationError::InvalidValue {
                        field: format!("proposition.items[{}]", index),
                        reason: format!("expected an object, got {}", json_kind(item)),
                    })?;
                require_str(item, FIELD_ID, &format!("proposition.items[{}].id", index))?;
                require_str(
                    item,
                    FIELD_SCHEMA,
                    &format!("proposition.items[{}].schema", index),
                )?;
            }
        }

        Ok(Self { raw })
    }
}

impl Serialize for Proposition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Borrowed view of one item inside a proposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropositionItem<'a> {
    raw: &'a Map<String, Value>,
}

impl<'a> PropositionItem<'a> {
    pub fn id(&self) -> &'a str {
        str_field(self.raw, FIELD_ID)
    }

    pub fn schema_uri(&self) -> &'a str {
        str_field(self.raw, FIELD_SCHEMA)
    }

    pub fn schema(&self) -> ItemSchema {
        ItemSchema::from_uri(self.schema_uri())
    }

    pub fn data(&self) -> Option<&'a Map<String, Value>> {
        self.raw.get(FIELD_DATA).and_then(Value::as_object)
    }

    /// Expiry instant from `data.expiryDate` (unix seconds).
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.data()?
            .get(FIELD_EXPIRY_DATE)
            .and_then(Value::as_i64)
            .filter(|secs| *secs > 0)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Build the small-image content card this item describes, if any.
    pub fn content_card(&self) -> Option<SmallImageTemplate> {
        if self.schema() != ItemSchema::ContentCard {
            return None;
        }
        let content = self.data()?.get("content")?.as_object()?;
        SmallImageTemplate::from_content(self.id(), content)
    }
}

/// Item schema, decoded from the item's schema URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemSchema {
    ContentCard,
    JsonContent,
    HtmlContent,
    DefaultContent,
    InApp,
    Feed,
    NativeAlert,
    Ruleset,
    Unknown(String),
}

impl ItemSchema {
    pub const CONTENT_CARD: &'static str =
        "https://ns.adobe.com/personalization/message/content-card";
    pub const JSON_CONTENT: &'static str =
        "https://ns.adobe.com/personalization/json-content-item";
    pub const HTML_CONTENT: &'static str =
        "https://ns.adobe.com/personalization/html-content-item";
    pub const DEFAULT_CONTENT: &'static str =
        "https://ns.adobe.com/personalization/default-content-item";
    pub const IN_APP: &'static str = "https://ns.adobe.com/personalization/message/in-app";
    pub const FEED: &'static str = "https://ns.adobe.com/personalization/message/feed-item";
    pub const NATIVE_ALERT: &'static str =
        "https://ns.adobe.com/personalization/message/native-alert";
    pub const RULESET: &'static str = "https://ns.adobe.com/personalization/ruleset-item";

    pub fn from_uri(uri: &str) -> Self {
        match uri {
            Self::CONTENT_CARD => Self::ContentCard,
            Self::JSON_CONTENT => Self::JsonContent,
            Self::HTML_CONTENT => Self::HtmlContent,
            Self::DEFAULT_CONTENT => Self::DefaultContent,
            Self::IN_APP => Self::InApp,
            Self::FEED => Self::Feed,
            Self::NATIVE_ALERT => Self::NativeAlert,
            Self::RULESET => Self::Ruleset,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_uri(&self) -> &str {
        match self {
            Self::ContentCard => Self::CONTENT_CARD,
            Self::JsonContent => Self::JSON_CONTENT,
            Self::HtmlContent => Self::HTML_CONTENT,
            Self::DefaultContent => Self::DEFAULT_CONTENT,
            Self::InApp => Self::IN_APP,
            Self::Feed => Self::FEED,
            Self::NativeAlert => Self::NATIVE_ALERT,
            Self::Ruleset => Self::RULESET,
            Self::Unknown(uri) => uri,
        }
    }
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a str {
    map.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn require_str(map: &Map<String, Value>, key: &str, field: &str) -> Result<(), ValidationError> {
    match map.get(key) {
        None | Some(Value::Null) => Err(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        }),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        }),
        Some(Value::String(_)) => Ok(()),
        Some(other) => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a string, got {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "id": "prop-1",
            "scope": "mobileapp://com.example.shop/home",
            "scopeDetails": {
                "decisionProvider": "AJO",
                "correlationID": "c-1",
                "activity": { "id": "act-1" }
            },
            "items": [{
                "id": "item-1",
                "schema": ItemSchema::JSON_CONTENT,
                "data": { "content": { "key": "value" }, "expiryDate": 1_700_000_000 }
            }],
            "vendorExtension": { "z": 1, "a": 2 }
        })
    }

    #[test]
    fn test_from_event_data_reads_fields() {
        let prop = Proposition::from_event_data(payload()).unwrap();
        assert_eq!(prop.id(), "prop-1");
        assert_eq!(prop.scope(), "mobileapp://com.example.shop/home");
        assert_eq!(
            prop.surface().unwrap(),
            Surface::with_path("com.example.shop", "home").unwrap()
        );
        assert_eq!(
            prop.scope_details().unwrap().get("correlationID"),
            Some(&json!("c-1"))
        );
        let item = prop.first_item().unwrap();
        assert_eq!(item.id(), "item-1");
        assert_eq!(item.schema(), ItemSchema::JsonContent);
    }

    #[test]
    fn test_event_data_is_preserved_verbatim() {
        let prop = Proposition::from_event_data(payload()).unwrap();
        assert_eq!(prop.to_event_data(), payload());
        assert_eq!(
            serde_json::to_string(&prop).unwrap(),
            serde_json::to_string(&payload()).unwrap()
        );
    }

    #[test]
    fn test_serde_roundtrip_keeps_unknown_fields() {
        let prop = Proposition::from_event_data(payload()).unwrap();
        let text = serde_json::to_string(&prop).unwrap();
        let back: Proposition = serde_json::from_str(&text).unwrap();
        assert_eq!(back, prop);
        assert_eq!(back.as_map().get("vendorExtension"), Some(&json!({ "z": 1, "a": 2 })));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result = Proposition::from_event_data(json!({ "scope": "mobileapp://app" }));
        assert!(matches!(
            result,
            Err(ValidationError::RequiredFieldMissing { .. })
        ));
    }

    #[test]
    fn test_blank_scope_is_rejected() {
        let result = Proposition::from_event_data(json!({ "id": "p", "scope": "  " }));
        assert!(matches!(result, Err(ValidationError::InvalidValue { .. })));
    }

    #[test]
    fn test_item_without_schema_is_rejected() {
        let result = Proposition::from_event_data(json!({
            "id": "p",
            "scope": "mobileapp://app",
            "items": [{ "id": "i" }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(Proposition::from_event_data(json!([1, 2])).is_err());
    }

    #[test]
    fn test_minimal_proposition_has_no_items() {
        let prop =
            Proposition::from_event_data(json!({ "id": "p", "scope": "mobileapp://app" }))
                .unwrap();
        assert_eq!(prop.items().count(), 0);
        assert!(prop.scope_details().is_none());
    }

    #[test]
    fn test_expiry() {
        let prop = Proposition::from_event_data(payload()).unwrap();
        let expiry = prop.first_item().unwrap().expires_at().unwrap();
        assert_eq!(expiry.timestamp(), 1_700_000_000);
        assert!(prop.is_expired_at(DateTime::from_timestamp(1_700_000_001, 0).unwrap()));
        assert!(!prop.is_expired_at(DateTime::from_timestamp(1_600_000_000, 0).unwrap()));
    }

    #[test]
    fn test_item_schema_uri_roundtrip() {
        for uri in [
            ItemSchema::CONTENT_CARD,
            ItemSchema::JSON_CONTENT,
            ItemSchema::HTML_CONTENT,
            ItemSchema::DEFAULT_CONTENT,
            ItemSchema::IN_APP,
            ItemSchema::FEED,
            ItemSchema::NATIVE_ALERT,
            ItemSchema::RULESET,
            "https://example.com/custom",
        ] {
            assert_eq!(ItemSchema::from_uri(uri).as_uri(), uri);
        }
        assert!(matches!(
            ItemSchema::from_uri("https://example.com/custom"),
            ItemSchema::Unknown(_)
        ));
    }
}
