//! Page layout: the ordered page list, the header strip, and the card ids
//! placed on each page.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key holding cards shown outside the page grid
pub const HEADER_KEY: &str = "header";

/// Key holding the page order
pub const PAGES_KEY: &str = "pages";

/// Page used when no other page survives loading
pub const DEFAULT_PAGE: &str = "home";

/// Ids that are never valid pages
pub const RESERVED_PAGE_IDS: [&str; 3] = ["settings", "lights", "automations"];

/// Top-level keys from older layouts that are dropped on load
pub const LEGACY_PAGE_KEYS: [&str; 2] = ["automations", "lights"];

/// Card ids that no longer exist and are stripped from every page
pub const DEPRECATED_CARD_IDS: [&str; 7] =
    ["power", "rocky", "climate", "shield", "weather", "car", "sonos"];

/// Prefix of retired energy price cards
pub const DEPRECATED_CARD_PREFIX: &str = "energy_price_";

/// Returns true if a card id has been retired
pub fn is_deprecated_card(id: &str) -> bool {
    DEPRECATED_CARD_IDS.contains(&id) || id.starts_with(DEPRECATED_CARD_PREFIX)
}

/// Returns true if an id may not appear in the page order
pub fn is_reserved_page(id: &str) -> bool {
    RESERVED_PAGE_IDS.contains(&id)
}

/// Page layout configuration.
///
/// Serialized as a flat JSON object: `{"header": [...], "pages": [...],
/// "<page id>": [...], ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagesConfig {
    /// Entity ids shown in the header strip
    #[serde(default)]
    pub header: Vec<String>,
    /// Page order
    #[serde(default)]
    pub pages: Vec<String>,
    /// Card ids per page
    #[serde(flatten)]
    pub page_cards: BTreeMap<String, Vec<String>>,
}

impl PagesConfig {
    /// Build the typed view from an already migrated JSON object.
    ///
    /// Array entries that are not strings are converted when they are
    /// numbers and skipped otherwise. Non-array values other than the
    /// known keys are dropped.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let mut config = Self {
            header: Vec::new(),
            pages: Vec::new(),
            page_cards: BTreeMap::new(),
        };

        for (key, value) in object {
            let Some(items) = value.as_array() else {
                continue;
            };
            let ids = string_ids(items);
            match key.as_str() {
                HEADER_KEY => config.header = ids,
                PAGES_KEY => config.pages = ids,
                _ => {
                    config.page_cards.insert(key.clone(), ids);
                }
            }
        }

        config
    }

    /// Cards on a page, or in the header for `"header"`
    pub fn cards(&self, page_id: &str) -> &[String] {
        if page_id == HEADER_KEY {
            return &self.header;
        }
        self.page_cards
            .get(page_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mutable card list for a page, created on demand
    pub fn cards_mut(&mut self, page_id: &str) -> &mut Vec<String> {
        if page_id == HEADER_KEY {
            return &mut self.header;
        }
        self.page_cards.entry(page_id.to_string()).or_default()
    }

    /// Card list for the header or an existing page, without creating one
    pub fn existing_cards_mut(&mut self, page_id: &str) -> Option<&mut Vec<String>> {
        if page_id == HEADER_KEY {
            return Some(&mut self.header);
        }
        self.page_cards.get_mut(page_id)
    }

    /// Returns true if the page is part of the page order
    pub fn has_page(&self, page_id: &str) -> bool {
        self.pages.iter().any(|p| p == page_id)
    }

    /// Total number of cards across all pages (header excluded)
    pub fn card_count(&self) -> usize {
        self.pages.iter().map(|p| self.cards(p).len()).sum()
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        let mut page_cards = BTreeMap::new();
        page_cards.insert(DEFAULT_PAGE.to_string(), Vec::new());
        Self {
            header: Vec::new(),
            pages: vec![DEFAULT_PAGE.to_string()],
            page_cards,
        }
    }
}

fn string_ids(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_has_home_page() {
        let config = PagesConfig::default();
        assert_eq!(config.pages, vec!["home"]);
        assert!(config.cards("home").is_empty());
        assert!(config.header.is_empty());
    }

    #[test]
    fn test_existing_cards_mut_never_inserts() {
        let mut config = PagesConfig::default();
        assert!(config.existing_cards_mut("typo").is_none());
        assert!(!config.page_cards.contains_key("typo"));
        assert!(config.existing_cards_mut(HEADER_KEY).is_some());
        assert!(config.existing_cards_mut("home").is_some());
    }

    #[test]
    fn test_from_object_splits_known_keys() {
        let value = json!({
            "header": ["sensor.outdoor"],
            "pages": ["home", "media"],
            "home": ["light.kitchen", 42, null],
            "media": [],
            "note": "ignored"
        });
        let config = PagesConfig::from_object(value.as_object().unwrap());

        assert_eq!(config.header, vec!["sensor.outdoor"]);
        assert_eq!(config.pages, vec!["home", "media"]);
        assert_eq!(config.cards("home"), ["light.kitchen", "42"]);
        assert!(config.cards("media").is_empty());
        assert!(!config.page_cards.contains_key("note"));
    }

    #[test]
    fn test_serialization_is_flat() {
        let mut config = PagesConfig::default();
        config.cards_mut("home").push("light.kitchen".to_string());
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["home"], json!(["light.kitchen"]));
        assert_eq!(json["pages"], json!(["home"]));
        assert_eq!(json["header"], json!([]));
    }

    #[test]
    fn test_cards_mut_header_targets_header() {
        let mut config = PagesConfig::default();
        config.cards_mut(HEADER_KEY).push("sensor.power".to_string());
        assert_eq!(config.header, vec!["sensor.power"]);
        assert!(!config.page_cards.contains_key(HEADER_KEY));
    }

    #[test]
    fn test_deprecated_ids() {
        assert!(is_deprecated_card("power"));
        assert!(is_deprecated_card("energy_price_today"));
        assert!(!is_deprecated_card("climate_card_1700000000000"));
        assert!(!is_deprecated_card("lamp_1"));
    }
}
