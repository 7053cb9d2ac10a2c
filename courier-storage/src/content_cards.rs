//! Content cards for one surface, read from the proposition cache.

use std::sync::Arc;

use courier_core::{SmallImageTemplate, Surface};
use tokio::sync::watch;

use crate::cache::{PropositionBackend, Watermark};
use crate::store::PropositionCacheStore;

/// Builds small-image content cards from cached propositions.
pub struct ContentCardProvider<B: PropositionBackend> {
    store: Arc<PropositionCacheStore<B>>,
    surface: Surface,
}

impl<B: PropositionBackend> ContentCardProvider<B> {
    pub fn new(store: Arc<PropositionCacheStore<B>>, surface: Surface) -> Self {
        Self { store, surface }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Cards for the surface, in proposition order.
    ///
    /// Only the first item of each proposition is considered. Propositions
    /// whose first item is not a content card, or whose card has no title,
    /// are skipped.
    pub fn content(&self) -> Vec<SmallImageTemplate> {
        self.store
            .propositions_for(&self.surface)
            .iter()
            .filter_map(|proposition| proposition.first_item()?.content_card())
            .collect()
    }

    /// Change notifications for the underlying store.
    pub fn changes(&self) -> watch::Receiver<Watermark> {
        self.store.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryPropositionBackend;
    use courier_core::{ItemSchema, Proposition, PropositionMap};
    use serde_json::{json, Value};

    fn card_proposition(id: &str, surface: &Surface, title: Option<&str>) -> Proposition {
        let mut content = json!({
            "body": { "content": "Body text" },
            "image": { "url": "https://example.com/card.png", "alt": "card" },
            "actionUrl": "https://example.com/open",
            "buttons": [{
                "interactId": "go",
                "actionUrl": "https://example.com/go",
                "text": { "content": "Go" }
            }],
            "dismissBtn": { "style": "simple" }
        });
        if let (Some(title), Value::Object(map)) = (title, &mut content) {
            map.insert("title".to_string(), json!({ "content": title }));
        }
        Proposition::from_event_data(json!({
            "id": id,
            "scope": surface.uri(),
            "scopeDetails": {},
            "items": [{
                "id": format!("{}-item", id),
                "schema": ItemSchema::CONTENT_CARD,
                "data": { "contentType": "application/json", "content": content }
            }]
        }))
        .unwrap()
    }

    fn html_proposition(id: &str, surface: &Surface) -> Proposition {
        Proposition::from_event_data(json!({
            "id": id,
            "scope": surface.uri(),
            "items": [{
                "id": "html",
                "schema": ItemSchema::HTML_CONTENT,
                "data": { "content": "<p>hi</p>" }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_content_builds_cards_in_order() {
        let surface = Surface::with_path("app", "cards").unwrap();
        let store = Arc::new(PropositionCacheStore::new(Arc::new(
            InMemoryPropositionBackend::new(),
        )));
        let mut map = PropositionMap::new();
        map.insert(
            surface.clone(),
            vec![
                card_proposition("first", &surface, Some("First")),
                html_proposition("html", &surface),
                card_proposition("untitled", &surface, None),
                card_proposition("second", &surface, Some("Second")),
            ],
        );
        store.write(Some(map)).unwrap();

        let provider = ContentCardProvider::new(store, surface);
        let cards = provider.content();
        let titles: Vec<_> = cards.iter().map(|c| c.title.content.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(cards[0].id, "first-item");
        assert_eq!(cards[0].buttons.len(), 1);
        assert_eq!(
            cards[0].dismiss_button.as_ref().and_then(|d| d.style.as_deref()),
            Some("simple")
        );
    }

    #[test]
    fn test_content_for_unknown_surface_is_empty() {
        let store = Arc::new(PropositionCacheStore::new(Arc::new(
            InMemoryPropositionBackend::new(),
        )));
        let provider = ContentCardProvider::new(store, Surface::for_app("app").unwrap());
        assert!(provider.content().is_empty());
    }
}
