//! Content-card templates.
//!
//! A content-card item carries a loosely structured `content` object. These
//! types are the renderer-facing view of it. Parsing is lenient: optional
//! parts that are malformed are dropped, and only a missing or invalid title
//! rejects the whole card.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Light/dark colour pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardColor {
    pub light: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFont {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardText {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CardColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<CardFont>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CardImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_bundle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<CardColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardButton {
    pub id: String,
    pub text: CardText,
    pub action_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<CardColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<CardColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<CardImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DismissButton {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Card with a title, optional body, image, buttons and dismiss control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallImageTemplate {
    pub id: String,
    pub title: CardText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<CardText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<CardImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<CardButton>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismiss_button: Option<DismissButton>,
}

impl SmallImageTemplate {
    /// Build a template from a content-card `content` object.
    ///
    /// Returns `None` when the title is missing or has no text content.
    pub fn from_content(id: &str, content: &Map<String, Value>) -> Option<Self> {
        let title = object(content, "title").and_then(parse_text)?;

        Some(Self {
            id: id.to_string(),
            title,
            body: object(content, "body").and_then(parse_text),
            image: object(content, "image").map(parse_image),
            action_url: string(content, "actionUrl"),
            buttons: content
                .get("buttons")
                .and_then(Value::as_array)
                .map(|buttons| {
                    buttons
                        .iter()
                        .filter_map(Value::as_object)
                        .filter_map(parse_button)
                        .collect()
                })
                .unwrap_or_default(),
            dismiss_button: object(content, "dismissBtn").map(|map| DismissButton {
                style: string(map, "style"),
            }),
        })
    }
}

fn parse_text(map: &Map<String, Value>) -> Option<CardText> {
    Some(CardText {
        content: string(map, "content")?,
        color: object(map, "clr").and_then(parse_color),
        align: string(map, "align"),
        font: object(map, "font").map(parse_font),
    })
}

fn parse_color(map: &Map<String, Value>) -> Option<CardColor> {
    Some(CardColor {
        light: string(map, "light")?,
        dark: string(map, "dark"),
    })
}

fn parse_font(map: &Map<String, Value>) -> CardFont {
    CardFont {
        name: string(map, "name"),
        size: map.get("size").and_then(Value::as_f64).map(|s| s as i64),
        weight: string(map, "weight"),
        style: map.get("style").and_then(Value::as_array).map(|styles| {
            styles
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        }),
    }
}

fn parse_image(map: &Map<String, Value>) -> CardImage {
    CardImage {
        url: string(map, "url"),
        dark_url: string(map, "darkUrl"),
        bundle: string(map, "bundle"),
        dark_bundle: string(map, "darkBundle"),
        icon: string(map, "icon"),
        icon_size: map.get("iconSize").and_then(Value::as_f64),
        icon_color: object(map, "iconColor").and_then(parse_color),
        alt: string(map, "alt"),
        placeholder: string(map, "placeholder"),
    }
}

fn parse_button(map: &Map<String, Value>) -> Option<CardButton> {
    Some(CardButton {
        id: string(map, "interactId")?,
        text: object(map, "text").and_then(parse_text)?,
        action_url: string(map, "actionUrl")?,
        border_width: map.get("borWidth").and_then(Value::as_f64),
        border_color: object(map, "borColor").and_then(parse_color),
        background_color: object(map, "bgColor").and_then(parse_color),
        background_image: object(map, "bgImage").map(parse_image),
    })
}

fn object<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

fn string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test content must be an object"),
        }
    }

    #[test]
    fn test_full_card() {
        let content = content(json!({
            "title": { "content": "Sale", "clr": { "light": "#000000", "dark": "#FFFFFF" } },
            "body": { "content": "Everything 20% off", "align": "center" },
            "image": { "url": "https://cdn.example.com/sale.png", "alt": "sale", "iconSize": 24 },
            "actionUrl": "https://example.com/sale",
            "buttons": [
                { "interactId": "buy", "actionUrl": "https://example.com/buy", "text": { "content": "Buy" } },
                { "interactId": "broken", "text": { "content": "No url" } }
            ],
            "dismissBtn": { "style": "circle" }
        }));

        let card = SmallImageTemplate::from_content("item-1", &content).unwrap();
        assert_eq!(card.id, "item-1");
        assert_eq!(card.title.content, "Sale");
        assert_eq!(card.title.color.as_ref().unwrap().dark.as_deref(), Some("#FFFFFF"));
        assert_eq!(card.body.as_ref().unwrap().align.as_deref(), Some("center"));
        let image = card.image.as_ref().unwrap();
        assert_eq!(image.url.as_deref(), Some("https://cdn.example.com/sale.png"));
        assert_eq!(image.icon_size, Some(24.0));
        assert_eq!(card.action_url.as_deref(), Some("https://example.com/sale"));
        assert_eq!(card.buttons.len(), 1);
        assert_eq!(card.buttons[0].id, "buy");
        assert_eq!(
            card.dismiss_button,
            Some(DismissButton {
                style: Some("circle".to_string())
            })
        );
    }

    #[test]
    fn test_button_styling() {
        let content = content(json!({
            "title": { "content": "Hi" },
            "buttons": [{
                "interactId": "go",
                "actionUrl": "https://example.com/go",
                "text": { "content": "Go" },
                "borWidth": 1.5,
                "borColor": { "light": "#CCCCCC" },
                "bgColor": { "light": "#FFFFFF", "dark": "#000000" },
                "bgImage": { "url": "https://cdn.example.com/btn.png", "darkUrl": "https://cdn.example.com/btn-dark.png" }
            }]
        }));
        let card = SmallImageTemplate::from_content("item", &content).unwrap();
        let button = &card.buttons[0];
        assert_eq!(button.border_width, Some(1.5));
        assert_eq!(button.border_color.as_ref().unwrap().light, "#CCCCCC");
        assert_eq!(
            button.background_color.as_ref().unwrap().dark.as_deref(),
            Some("#000000")
        );
        let background = button.background_image.as_ref().unwrap();
        assert_eq!(background.url.as_deref(), Some("https://cdn.example.com/btn.png"));
        assert_eq!(
            background.dark_url.as_deref(),
            Some("https://cdn.example.com/btn-dark.png")
        );
    }

    #[test]
    fn test_missing_title_rejects_card() {
        let content = content(json!({ "body": { "content": "no title" } }));
        assert!(SmallImageTemplate::from_content("item", &content).is_none());
    }

    #[test]
    fn test_title_without_text_rejects_card() {
        let content = content(json!({ "title": { "align": "left" } }));
        assert!(SmallImageTemplate::from_content("item", &content).is_none());
    }

    #[test]
    fn test_font_parsing() {
        let content = content(json!({
            "title": {
                "content": "Hi",
                "font": { "name": "Inter", "size": 14, "weight": "bold", "style": ["italic", 3] }
            }
        }));
        let card = SmallImageTemplate::from_content("item", &content).unwrap();
        let font = card.title.font.unwrap();
        assert_eq!(font.name.as_deref(), Some("Inter"));
        assert_eq!(font.size, Some(14));
        assert_eq!(font.style, Some(vec!["italic".to_string()]));
    }

    #[test]
    fn test_color_without_light_is_dropped() {
        let content = content(json!({ "title": { "content": "Hi", "clr": { "dark": "#111" } } }));
        let card = SmallImageTemplate::from_content("item", &content).unwrap();
        assert!(card.title.color.is_none());
    }
}
