//! Load-time migrations of persisted layout data.
//!
//! Every function here is idempotent: running it on already migrated data
//! changes nothing and reports `false`.

use log::info;
use serde_json::{Map, Value};
use tunet_types::page_settings::{LEGACY_SONOS_PAGE_TYPE, MEDIA_PAGE_TYPE};
use tunet_types::pages::{
    is_deprecated_card, is_reserved_page, DEFAULT_PAGE, DEPRECATED_CARD_IDS, HEADER_KEY,
    LEGACY_PAGE_KEYS, PAGES_KEY,
};

/// Migrate a stored pages config object in place.
///
/// Steps, in order:
/// 1. drop the legacy `automations`/`lights` keys
/// 2. strip retired card ids from every card array
/// 3. derive `pages` from the remaining card arrays when it is missing
/// 4. remove reserved ids from `pages`
/// 5. fall back to `["home"]` when no page is left
/// 6. give every page a card array
/// 7. make sure `header` is an array
///
/// Returns true if anything changed.
pub fn migrate_pages_config(config: &mut Map<String, Value>) -> bool {
    let mut modified = false;

    for legacy in LEGACY_PAGE_KEYS {
        if config.shift_remove(legacy).is_some() {
            info!("Removed legacy '{}' page config", legacy);
            modified = true;
        }
    }

    for (page_id, value) in config.iter_mut() {
        let Value::Array(cards) = value else {
            continue;
        };
        let before = cards.len();
        cards.retain(|card| !is_deprecated_card(&card_id_text(card)));
        if cards.len() != before {
            info!(
                "Removed {} deprecated card(s) from '{}'",
                before - cards.len(),
                page_id
            );
            modified = true;
        }
    }

    if !config.get(PAGES_KEY).is_some_and(Value::is_array) {
        let detected: Vec<Value> = config
            .iter()
            .filter(|(key, value)| {
                value.is_array() && key.as_str() != HEADER_KEY && !is_reserved_page(key)
            })
            .map(|(key, _)| Value::String(key.clone()))
            .collect();
        let pages = if detected.is_empty() {
            vec![Value::String(DEFAULT_PAGE.to_string())]
        } else {
            detected
        };
        config.insert(PAGES_KEY.to_string(), Value::Array(pages));
        modified = true;
    }

    if let Some(Value::Array(pages)) = config.get_mut(PAGES_KEY) {
        let before = pages.len();
        pages.retain(|page| !is_reserved_page(&card_id_text(page)));
        if pages.len() != before {
            modified = true;
        }
        if pages.is_empty() {
            pages.push(Value::String(DEFAULT_PAGE.to_string()));
            modified = true;
        }
    }

    let page_ids: Vec<String> = config
        .get(PAGES_KEY)
        .and_then(Value::as_array)
        .map(|pages| pages.iter().map(card_id_text).collect())
        .unwrap_or_default();
    for page_id in page_ids {
        if !config.get(&page_id).is_some_and(Value::is_array) {
            config.insert(page_id, Value::Array(Vec::new()));
            modified = true;
        }
    }

    if !config.get(HEADER_KEY).is_some_and(Value::is_array) {
        config.insert(HEADER_KEY.to_string(), Value::Array(Vec::new()));
        modified = true;
    }

    modified
}

/// Rewrite the retired `sonos` page type to `media`.
///
/// Returns true if any page was rewritten.
pub fn migrate_page_settings(settings: &mut Map<String, Value>) -> bool {
    let mut modified = false;
    for (page_id, bag) in settings.iter_mut() {
        let Some(bag) = bag.as_object_mut() else {
            continue;
        };
        if bag.get("type").and_then(Value::as_str) == Some(LEGACY_SONOS_PAGE_TYPE) {
            bag.insert("type".to_string(), Value::String(MEDIA_PAGE_TYPE.to_string()));
            info!("Migrated page '{}' from sonos to media", page_id);
            modified = true;
        }
    }
    modified
}

/// Drop retired card ids from the hidden card list.
///
/// Only exact ids are dropped here; prefixed ids stay hidden harmlessly.
pub fn filter_hidden_cards(hidden: Vec<String>) -> Vec<String> {
    hidden
        .into_iter()
        .filter(|id| !DEPRECATED_CARD_IDS.contains(&id.as_str()))
        .collect()
}

/// Ids are normally strings; numbers are compared by their text
fn card_id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_strips_deprecated_cards() {
        let mut config = object(json!({
            "pages": ["home"],
            "header": [],
            "home": ["power", "lamp_1", "energy_price_today"]
        }));
        assert!(migrate_pages_config(&mut config));
        assert_eq!(config["home"], json!(["lamp_1"]));
    }

    #[test]
    fn test_drops_legacy_keys_and_derives_pages() {
        let mut config = object(json!({
            "automations": ["a"],
            "lights": ["light.hall"],
            "home": ["lamp_1"],
            "media": [],
            "header": ["sensor.temp"],
            "settings": []
        }));
        assert!(migrate_pages_config(&mut config));
        assert!(!config.contains_key("automations"));
        assert!(!config.contains_key("lights"));
        assert_eq!(config["pages"], json!(["home", "media"]));
    }

    #[test]
    fn test_reserved_pages_removed_and_default_added() {
        let mut config = object(json!({"pages": ["settings", "lights"], "header": []}));
        assert!(migrate_pages_config(&mut config));
        assert_eq!(config["pages"], json!(["home"]));
        assert_eq!(config["home"], json!([]));
    }

    #[test]
    fn test_missing_arrays_and_header_created() {
        let mut config = object(json!({"pages": ["home", "kitchen"], "home": "oops"}));
        assert!(migrate_pages_config(&mut config));
        assert_eq!(config["home"], json!([]));
        assert_eq!(config["kitchen"], json!([]));
        assert_eq!(config["header"], json!([]));
    }

    #[test]
    fn test_pages_migration_is_idempotent() {
        let mut config = object(json!({
            "lights": [],
            "home": ["power", "lamp_1"],
            "office": ["weather", "calendar_card_1"]
        }));
        assert!(migrate_pages_config(&mut config));
        let once = config.clone();
        assert!(!migrate_pages_config(&mut config));
        assert_eq!(config, once);
    }

    #[test]
    fn test_sonos_pages_become_media() {
        let mut settings = object(json!({
            "music": {"type": "sonos", "label": "Music"},
            "home": {"label": "Home"},
            "broken": 5
        }));
        assert!(migrate_page_settings(&mut settings));
        assert_eq!(settings["music"], json!({"type": "media", "label": "Music"}));
        assert!(!migrate_page_settings(&mut settings));
    }

    #[test]
    fn test_filter_hidden_cards() {
        let hidden = vec!["power".to_string(), "lamp_1".to_string()];
        assert_eq!(filter_hidden_cards(hidden), vec!["lamp_1"]);
    }
}
