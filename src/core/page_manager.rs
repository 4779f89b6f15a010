//! Page and card model manager.
//!
//! `PageManager` owns the in-memory pages config, card settings, page
//! settings and header options. It is built once from the store at
//! startup, and every mutation writes through to the store before
//! returning, so a read straight after a mutation always sees it.
//!
//! Store write failures never reach callers: they are logged and counted,
//! and the in-memory state keeps the attempted change.

use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tunet_core::constants::{
    DEFAULT_GRID_COLUMNS, DEFAULT_GRID_GAP, DEFAULT_HEADER_SCALE, KEY_CARD_SETTINGS,
    KEY_CUSTOM_ICONS, KEY_CUSTOM_NAMES, KEY_GRID_COLUMNS, KEY_GRID_GAP, KEY_HEADER_SCALE,
    KEY_HEADER_SETTINGS, KEY_HEADER_TITLE, KEY_HIDDEN_CARDS, KEY_PAGES_CONFIG,
    KEY_PAGE_SETTINGS, KEY_STATUS_PILLS_CONFIG,
};
use tunet_core::{ConfigStore, StoreError};
use tunet_types::card::{merge_bag, settings_from_value};
use tunet_types::pages::HEADER_KEY;
use tunet_types::{
    settings_key, CardConfig, CardKind, CardSettings, HeaderSettings, PageOptions, PageSettings,
    PagesConfig, SettingsBag,
};

use super::card_id;
use crate::config::migration::{filter_hidden_cards, migrate_page_settings, migrate_pages_config};
use crate::config::snapshot::{SnapshotSink, SnapshotUpdate};

/// In-memory dashboard layout backed by the config store
#[derive(Debug)]
pub struct PageManager {
    store: ConfigStore,
    pages_config: PagesConfig,
    card_settings: CardSettings,
    page_settings: PageSettings,
    custom_names: BTreeMap<String, String>,
    custom_icons: BTreeMap<String, String>,
    hidden_cards: Vec<String>,
    grid_columns: u32,
    grid_gap: f64,
    header_scale: f64,
    header_title: String,
    header_settings: HeaderSettings,
    status_pills_config: Vec<Value>,
    failed_writes: usize,
}

impl PageManager {
    /// Keys owned by this component
    pub const OWNED_KEYS: [&'static str; 12] = [
        KEY_PAGES_CONFIG,
        KEY_HIDDEN_CARDS,
        KEY_CUSTOM_NAMES,
        KEY_CUSTOM_ICONS,
        KEY_GRID_COLUMNS,
        KEY_GRID_GAP,
        KEY_HEADER_SCALE,
        KEY_HEADER_TITLE,
        KEY_PAGE_SETTINGS,
        KEY_CARD_SETTINGS,
        KEY_HEADER_SETTINGS,
        KEY_STATUS_PILLS_CONFIG,
    ];

    /// Load and migrate the persisted layout
    pub fn load(store: ConfigStore) -> Self {
        let mut manager = Self {
            store,
            pages_config: PagesConfig::default(),
            card_settings: CardSettings::new(),
            page_settings: PageSettings::new(),
            custom_names: BTreeMap::new(),
            custom_icons: BTreeMap::new(),
            hidden_cards: Vec::new(),
            grid_columns: DEFAULT_GRID_COLUMNS,
            grid_gap: DEFAULT_GRID_GAP,
            header_scale: DEFAULT_HEADER_SCALE,
            header_title: String::new(),
            header_settings: HeaderSettings::default(),
            status_pills_config: Vec::new(),
            failed_writes: 0,
        };
        manager.reload();
        manager
    }

    /// Re-read everything from the store, e.g. after an import
    pub fn reload(&mut self) {
        let store = self.store.clone();

        self.pages_config = match store.read_json_value(KEY_PAGES_CONFIG) {
            Some(Value::Object(mut raw)) => {
                if migrate_pages_config(&mut raw) {
                    info!("Pages config migrated, saving");
                    self.persist(KEY_PAGES_CONFIG, &raw);
                }
                PagesConfig::from_object(&raw)
            }
            Some(other) => {
                warn!("Ignoring pages config that is not an object: {}", other);
                PagesConfig::default()
            }
            None => PagesConfig::default(),
        };

        self.hidden_cards = filter_hidden_cards(store.read_json(KEY_HIDDEN_CARDS, Vec::new()));
        self.custom_names = store.read_json(KEY_CUSTOM_NAMES, BTreeMap::new());
        self.custom_icons = store.read_json(KEY_CUSTOM_ICONS, BTreeMap::new());
        self.grid_columns = store
            .read_number_opt(KEY_GRID_COLUMNS)
            .map(column_count)
            .unwrap_or(DEFAULT_GRID_COLUMNS);
        self.grid_gap = store
            .read_number_opt(KEY_GRID_GAP)
            .and_then(usable_grid_gap)
            .unwrap_or(DEFAULT_GRID_GAP);
        self.header_scale = store
            .read_number_opt(KEY_HEADER_SCALE)
            .and_then(usable_header_scale)
            .unwrap_or(DEFAULT_HEADER_SCALE);
        self.header_title = store.read_string(KEY_HEADER_TITLE).unwrap_or_default();

        self.page_settings = match store.read_json_value(KEY_PAGE_SETTINGS) {
            Some(Value::Object(mut raw)) => {
                if migrate_page_settings(&mut raw) {
                    self.persist(KEY_PAGE_SETTINGS, &raw);
                }
                settings_from_value(Value::Object(raw))
            }
            _ => PageSettings::new(),
        };

        self.card_settings = store
            .read_json_value(KEY_CARD_SETTINGS)
            .map(settings_from_value)
            .unwrap_or_default();
        self.header_settings = store.read_json(KEY_HEADER_SETTINGS, HeaderSettings::default());
        self.status_pills_config = store.read_json(KEY_STATUS_PILLS_CONFIG, Vec::new());

        debug!(
            "Loaded {} page(s), {} card(s), {} card settings entries",
            self.pages_config.pages.len(),
            self.pages_config.card_count(),
            self.card_settings.len()
        );
    }

    /// Write a value, logging instead of failing
    fn persist<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let result = self.store.write_json(key, value);
        self.record(key, result);
    }

    fn persist_number(&mut self, key: &str, value: f64) {
        let result = self.store.write_number(key, value);
        self.record(key, result);
    }

    fn persist_string(&mut self, key: &str, value: &str) {
        let result = self.store.write_string(key, value);
        self.record(key, result);
    }

    fn record(&mut self, key: &str, result: Result<(), StoreError>) {
        if let Err(e) = result {
            error!("Failed to save {}: {}", key, e);
            self.failed_writes += 1;
        }
    }

    fn save_pages_config(&mut self) {
        let config = self.pages_config.clone();
        self.persist(KEY_PAGES_CONFIG, &config);
    }

    fn save_card_settings(&mut self) {
        let settings = self.card_settings.clone();
        self.persist(KEY_CARD_SETTINGS, &settings);
    }

    fn save_page_settings(&mut self) {
        let settings = self.page_settings.clone();
        self.persist(KEY_PAGE_SETTINGS, &settings);
    }

    // ---- accessors ----

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn pages_config(&self) -> &PagesConfig {
        &self.pages_config
    }

    pub fn card_settings(&self) -> &CardSettings {
        &self.card_settings
    }

    pub fn page_settings(&self) -> &PageSettings {
        &self.page_settings
    }

    pub fn custom_names(&self) -> &BTreeMap<String, String> {
        &self.custom_names
    }

    pub fn custom_icons(&self) -> &BTreeMap<String, String> {
        &self.custom_icons
    }

    pub fn hidden_cards(&self) -> &[String] {
        &self.hidden_cards
    }

    pub fn grid_columns(&self) -> u32 {
        self.grid_columns
    }

    pub fn grid_gap(&self) -> f64 {
        self.grid_gap
    }

    pub fn header_scale(&self) -> f64 {
        self.header_scale
    }

    pub fn header_title(&self) -> &str {
        &self.header_title
    }

    pub fn header_settings(&self) -> &HeaderSettings {
        &self.header_settings
    }

    pub fn status_pills_config(&self) -> &[Value] {
        &self.status_pills_config
    }

    /// Number of store writes that failed since load
    pub fn failed_writes(&self) -> usize {
        self.failed_writes
    }

    pub fn is_card_hidden(&self, card_id: &str) -> bool {
        self.hidden_cards.iter().any(|id| id == card_id)
    }

    /// Settings for a card on a page: the derived key first, then the bare
    /// card id
    pub fn card_settings_for(&self, card_id: &str, page_id: &str) -> Option<&SettingsBag> {
        self.card_settings
            .get(&settings_key(card_id, page_id))
            .or_else(|| self.card_settings.get(card_id))
    }

    /// Typed view of a card's settings
    pub fn card_config(&self, card_id: &str, page_id: &str) -> Option<CardConfig> {
        let bag = self.card_settings_for(card_id, page_id)?;
        CardConfig::from_bag(CardKind::from_card_id(card_id), bag)
    }

    pub fn page_options(&self, page_id: &str) -> PageOptions {
        self.page_settings
            .get(page_id)
            .map(PageOptions::from_bag)
            .unwrap_or_default()
    }

    pub fn is_media_page(&self, page_id: &str) -> bool {
        self.page_options(page_id).is_media()
    }

    /// Pages to show in the navigation; hidden pages only in edit mode
    pub fn visible_pages(&self, edit_mode: bool) -> Vec<&str> {
        self.pages_config
            .pages
            .iter()
            .filter(|page| edit_mode || !self.page_options(page).hidden)
            .map(String::as_str)
            .collect()
    }

    // ---- card mutations ----

    /// Append a card to a page and merge `payload` into its settings.
    ///
    /// For the `header` target the id is an entity id and no settings are
    /// stored.
    pub fn add_card_to_page(&mut self, page_id: &str, card_id: &str, payload: SettingsBag) {
        if page_id != HEADER_KEY && !payload.is_empty() {
            let key = settings_key(card_id, page_id);
            merge_bag(self.card_settings.entry(key).or_default(), &payload);
            self.save_card_settings();
        }
        self.pages_config.cards_mut(page_id).push(card_id.to_string());
        self.save_pages_config();
        debug!("Added card {} to {}", card_id, page_id);
    }

    /// Append several cards at once; `settings_for` gives each card's
    /// payload, if any
    pub fn add_cards_to_page<F>(&mut self, page_id: &str, card_ids: &[String], mut settings_for: F)
    where
        F: FnMut(&str) -> Option<SettingsBag>,
    {
        if card_ids.is_empty() {
            return;
        }
        if page_id != HEADER_KEY {
            let mut changed = false;
            for card_id in card_ids {
                let Some(payload) = settings_for(card_id) else {
                    continue;
                };
                let key = settings_key(card_id, page_id);
                merge_bag(self.card_settings.entry(key).or_default(), &payload);
                changed = true;
            }
            if changed {
                self.save_card_settings();
            }
        }
        self.pages_config
            .cards_mut(page_id)
            .extend(card_ids.iter().cloned());
        self.save_pages_config();
        debug!("Added {} card(s) to {}", card_ids.len(), page_id);
    }

    /// Remove a card from a page.
    ///
    /// The card's settings entry is kept, so re-adding the same id restores
    /// them. Returns false if the card was not on the page.
    pub fn remove_card_from_page(&mut self, page_id: &str, card_id: &str) -> bool {
        let Some(cards) = self.pages_config.existing_cards_mut(page_id) else {
            return false;
        };
        let before = cards.len();
        cards.retain(|id| id != card_id);
        if cards.len() == before {
            return false;
        }
        self.save_pages_config();
        true
    }

    /// Move a card within its page (drag and drop)
    pub fn move_card(&mut self, page_id: &str, from: usize, to: usize) -> bool {
        let Some(cards) = self.pages_config.existing_cards_mut(page_id) else {
            return false;
        };
        if from >= cards.len() || to >= cards.len() {
            return false;
        }
        if from == to {
            return true;
        }
        let card = cards.remove(from);
        cards.insert(to, card);
        self.save_pages_config();
        true
    }

    /// Hide a visible card or show a hidden one; returns the new hidden state
    pub fn toggle_card_visibility(&mut self, card_id: &str) -> bool {
        let hidden = if self.is_card_hidden(card_id) {
            self.hidden_cards.retain(|id| id != card_id);
            false
        } else {
            self.hidden_cards.push(card_id.to_string());
            true
        };
        let list = self.hidden_cards.clone();
        self.persist(KEY_HIDDEN_CARDS, &list);
        hidden
    }

    /// Set one named setting on a card settings entry, keeping its other
    /// settings
    pub fn save_card_setting(&mut self, settings_key: &str, name: &str, value: Value) {
        self.card_settings
            .entry(settings_key.to_string())
            .or_default()
            .insert(name.to_string(), value);
        self.save_card_settings();
    }

    /// Set one named setting on a page, keeping its other settings
    pub fn save_page_setting(&mut self, page_id: &str, name: &str, value: Value) {
        self.page_settings
            .entry(page_id.to_string())
            .or_default()
            .insert(name.to_string(), value);
        self.save_page_settings();
    }

    pub fn save_custom_name(&mut self, id: &str, name: &str) {
        self.custom_names.insert(id.to_string(), name.to_string());
        let names = self.custom_names.clone();
        self.persist(KEY_CUSTOM_NAMES, &names);
    }

    pub fn save_custom_icon(&mut self, id: &str, icon: &str) {
        self.custom_icons.insert(id.to_string(), icon.to_string());
        let icons = self.custom_icons.clone();
        self.persist(KEY_CUSTOM_ICONS, &icons);
    }

    // ---- whole-structure replacement ----

    pub fn persist_pages_config(&mut self, config: PagesConfig) {
        self.pages_config = config;
        self.save_pages_config();
    }

    pub fn persist_card_settings(&mut self, settings: CardSettings) {
        self.card_settings = settings;
        self.save_card_settings();
    }

    pub fn persist_page_settings(&mut self, settings: PageSettings) {
        self.page_settings = settings;
        self.save_page_settings();
    }

    pub fn update_header_settings(&mut self, settings: HeaderSettings) {
        self.header_settings = settings;
        let settings = self.header_settings.clone();
        self.persist(KEY_HEADER_SETTINGS, &settings);
    }

    pub fn save_status_pills_config(&mut self, config: Vec<Value>) {
        self.status_pills_config = config;
        let config = self.status_pills_config.clone();
        self.persist(KEY_STATUS_PILLS_CONFIG, &config);
    }

    // ---- scalars ----

    /// Set the header scale multiplier; non-positive values are ignored
    pub fn update_header_scale(&mut self, scale: f64) {
        let Some(scale) = usable_header_scale(scale) else {
            warn!("Ignoring invalid header scale {}", scale);
            return;
        };
        self.header_scale = scale;
        self.persist_number(KEY_HEADER_SCALE, scale);
    }

    pub fn update_header_title(&mut self, title: &str) {
        self.header_title = title.to_string();
        self.persist_string(KEY_HEADER_TITLE, title);
    }

    pub fn set_grid_columns(&mut self, columns: u32) {
        self.grid_columns = columns.max(1);
        self.persist_number(KEY_GRID_COLUMNS, f64::from(self.grid_columns));
    }

    pub fn set_grid_gap(&mut self, gap: f64) {
        let Some(gap) = usable_grid_gap(gap) else {
            warn!("Ignoring invalid grid gap {}", gap);
            return;
        };
        self.grid_gap = gap;
        self.persist_number(KEY_GRID_GAP, gap);
    }

    // ---- pages ----

    /// Create a page labelled `label`; returns its id
    pub fn add_page(&mut self, label: &str) -> String {
        let mut page_id = format!("page_{}", card_id::now_millis());
        while self.pages_config.page_cards.contains_key(&page_id) || page_id == HEADER_KEY {
            page_id.push('_');
        }
        self.pages_config.pages.push(page_id.clone());
        self.pages_config.cards_mut(&page_id);
        self.save_pages_config();
        self.save_page_setting(&page_id, "label", Value::String(label.to_string()));
        info!("Added page {} ({})", page_id, label);
        page_id
    }

    /// Delete a page with its card list and page settings.
    ///
    /// The last remaining page cannot be removed.
    pub fn remove_page(&mut self, page_id: &str) -> bool {
        if !self.pages_config.has_page(page_id) || self.pages_config.pages.len() <= 1 {
            return false;
        }
        self.pages_config.pages.retain(|p| p != page_id);
        self.pages_config.page_cards.remove(page_id);
        self.save_pages_config();
        if self.page_settings.remove(page_id).is_some() {
            self.save_page_settings();
        }
        info!("Removed page {}", page_id);
        true
    }
}

/// A finite, positive header scale multiplier
pub(crate) fn usable_header_scale(scale: f64) -> Option<f64> {
    (scale.is_finite() && scale > 0.0).then_some(scale)
}

/// A finite, non-negative grid gap
pub(crate) fn usable_grid_gap(gap: f64) -> Option<f64> {
    (gap.is_finite() && gap >= 0.0).then_some(gap)
}

/// Stored column preference to a usable count
fn column_count(value: f64) -> u32 {
    value.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

impl SnapshotSink for PageManager {
    fn apply_update(&mut self, update: &SnapshotUpdate) {
        match update {
            SnapshotUpdate::PagesConfig(raw) => {
                let mut raw: Map<String, Value> = raw.clone();
                migrate_pages_config(&mut raw);
                self.pages_config = PagesConfig::from_object(&raw);
            }
            SnapshotUpdate::CardSettings(settings) => self.card_settings = settings.clone(),
            SnapshotUpdate::PageSettings(settings) => {
                let mut raw = Map::new();
                for (page, bag) in settings {
                    raw.insert(page.clone(), Value::Object(bag.clone()));
                }
                migrate_page_settings(&mut raw);
                self.page_settings = settings_from_value(Value::Object(raw));
            }
            SnapshotUpdate::HiddenCards(hidden) => {
                self.hidden_cards = filter_hidden_cards(hidden.clone())
            }
            SnapshotUpdate::CustomNames(names) => self.custom_names = names.clone(),
            SnapshotUpdate::CustomIcons(icons) => self.custom_icons = icons.clone(),
            SnapshotUpdate::GridColumns(columns) => self.grid_columns = column_count(*columns),
            SnapshotUpdate::GridGap(gap) => match usable_grid_gap(*gap) {
                Some(gap) => self.grid_gap = gap,
                None => warn!("Ignoring invalid grid gap {}", gap),
            },
            SnapshotUpdate::HeaderScale(scale) => match usable_header_scale(*scale) {
                Some(scale) => self.header_scale = scale,
                None => warn!("Ignoring invalid header scale {}", scale),
            },
            SnapshotUpdate::HeaderTitle(title) => self.header_title = title.clone(),
            SnapshotUpdate::HeaderSettings(settings) => self.header_settings = settings.clone(),
            SnapshotUpdate::StatusPillsConfig(pills) => self.status_pills_config = pills.clone(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::snapshot::{apply_snapshot, collect_snapshot, SnapshotDocument};
    use serde_json::json;
    use tunet_core::MemoryBackend;
    use tunet_types::HeaderFont;

    fn bag(value: Value) -> SettingsBag {
        value.as_object().cloned().unwrap()
    }

    fn store_with(key: &str, value: &str) -> ConfigStore {
        ConfigStore::new(MemoryBackend::new().with_entry(key, value))
    }

    #[test]
    fn test_defaults_without_stored_data() {
        let manager = PageManager::load(ConfigStore::in_memory());
        assert_eq!(manager.pages_config(), &PagesConfig::default());
        assert_eq!(manager.grid_columns(), 3);
        assert_eq!(manager.grid_gap(), 32.0);
        assert_eq!(manager.header_scale(), 1.0);
        assert_eq!(manager.header_title(), "");
        assert!(manager.header_settings().show_clock);
        // Defaults are not written back
        assert!(manager.store().get_raw(KEY_PAGES_CONFIG).is_none());
    }

    #[test]
    fn test_load_strips_deprecated_cards() {
        let store = store_with(KEY_PAGES_CONFIG, r#"{"home":["power","lamp_1"]}"#);
        let manager = PageManager::load(store.clone());
        assert_eq!(manager.pages_config().cards("home"), ["lamp_1"]);
        assert_eq!(manager.pages_config().pages, vec!["home"]);

        // Migrated structure was written back
        let saved = store.read_json_value(KEY_PAGES_CONFIG).unwrap();
        assert_eq!(saved["home"], json!(["lamp_1"]));
        assert_eq!(saved["header"], json!([]));
    }

    #[test]
    fn test_load_is_idempotent() {
        let store = store_with(
            KEY_PAGES_CONFIG,
            r#"{"lights":[],"home":["sonos","lamp_1"],"settings":[],"header":["sensor.x"]}"#,
        );
        let first = PageManager::load(store.clone());
        let saved = store.get_raw(KEY_PAGES_CONFIG);
        let second = PageManager::load(store.clone());

        assert_eq!(first.pages_config(), second.pages_config());
        assert_eq!(store.get_raw(KEY_PAGES_CONFIG), saved);
    }

    #[test]
    fn test_invalid_card_settings_fall_back() {
        let manager = PageManager::load(store_with(KEY_CARD_SETTINGS, "not json"));
        assert!(manager.card_settings().is_empty());
    }

    #[test]
    fn test_sonos_page_type_migrated() {
        let store = store_with(KEY_PAGE_SETTINGS, r#"{"music":{"type":"sonos"}}"#);
        let manager = PageManager::load(store.clone());
        assert!(manager.is_media_page("music"));
        assert_eq!(
            store.read_json_value(KEY_PAGE_SETTINGS).unwrap(),
            json!({"music": {"type": "media"}})
        );
    }

    #[test]
    fn test_hidden_cards_filtered_on_load() {
        let manager = PageManager::load(store_with(KEY_HIDDEN_CARDS, r#"["car","lamp_1"]"#));
        assert_eq!(manager.hidden_cards(), ["lamp_1"]);
    }

    #[test]
    fn test_save_card_setting_merges() {
        let store = store_with(KEY_CARD_SETTINGS, r#"{"lamp_1":{"a":1}}"#);
        let mut manager = PageManager::load(store.clone());
        manager.save_card_setting("lamp_1", "b", json!(2));
        manager.save_card_setting("lamp_1", "c", json!("x"));

        assert_eq!(manager.card_settings()["lamp_1"], bag(json!({"a": 1, "b": 2, "c": "x"})));
        assert_eq!(
            store.read_json_value(KEY_CARD_SETTINGS).unwrap(),
            json!({"lamp_1": {"a": 1, "b": 2, "c": "x"}})
        );
    }

    #[test]
    fn test_save_page_setting_merges() {
        let mut manager = PageManager::load(ConfigStore::in_memory());
        manager.save_page_setting("home", "label", json!("Hjem"));
        manager.save_page_setting("home", "hidden", json!(true));
        let options = manager.page_options("home");
        assert_eq!(options.label.as_deref(), Some("Hjem"));
        assert!(options.hidden);
        assert!(manager.visible_pages(false).is_empty());
        assert_eq!(manager.visible_pages(true), vec!["home"]);
    }

    #[test]
    fn test_add_card_merges_payload() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        manager.save_card_setting("todo_card_1", "size", json!("small"));
        manager.add_card_to_page("home", "todo_card_1", bag(json!({"heading": "Chores"})));

        assert_eq!(manager.pages_config().cards("home"), ["todo_card_1"]);
        assert_eq!(
            manager.card_settings()["todo_card_1"],
            bag(json!({"size": "small", "heading": "Chores"}))
        );
        let saved = store.read_json_value(KEY_PAGES_CONFIG).unwrap();
        assert_eq!(saved["home"], json!(["todo_card_1"]));
    }

    #[test]
    fn test_add_to_header_skips_settings() {
        let mut manager = PageManager::load(ConfigStore::in_memory());
        manager.add_card_to_page(HEADER_KEY, "sensor.outdoor", bag(json!({"size": "large"})));
        assert_eq!(manager.pages_config().header, vec!["sensor.outdoor"]);
        assert!(manager.card_settings().is_empty());
    }

    #[test]
    fn test_add_cards_uses_scoped_keys() {
        let mut manager = PageManager::load(ConfigStore::in_memory());
        let ids = vec!["spacer_card_1".to_string(), "lamp_1".to_string()];
        manager.add_cards_to_page("home", &ids, |id| {
            Some(bag(json!({ "origin": id })))
        });

        assert!(manager.card_settings().contains_key("home::spacer_card_1"));
        assert!(manager.card_settings().contains_key("lamp_1"));
        assert!(manager.card_settings_for("spacer_card_1", "home").is_some());
        assert_eq!(manager.pages_config().cards("home"), ids.as_slice());
    }

    #[test]
    fn test_remove_card_keeps_settings() {
        let mut manager = PageManager::load(ConfigStore::in_memory());
        manager.add_card_to_page("home", "cover_card_1", bag(json!({"coverId": "cover.garage"})));
        assert!(manager.remove_card_from_page("home", "cover_card_1"));
        assert!(!manager.remove_card_from_page("home", "cover_card_1"));

        assert!(manager.pages_config().cards("home").is_empty());
        assert!(manager.card_settings().contains_key("cover_card_1"));
    }

    #[test]
    fn test_toggle_card_visibility() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        assert!(manager.toggle_card_visibility("lamp_1"));
        assert!(manager.is_card_hidden("lamp_1"));
        assert_eq!(store.read_json_value(KEY_HIDDEN_CARDS).unwrap(), json!(["lamp_1"]));
        assert!(!manager.toggle_card_visibility("lamp_1"));
        assert_eq!(store.read_json_value(KEY_HIDDEN_CARDS).unwrap(), json!([]));
    }

    #[test]
    fn test_header_scalars_persist_as_strings() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        manager.update_header_scale(1.5);
        manager.update_header_title("Hytta");
        manager.update_header_scale(-1.0);

        assert_eq!(manager.header_scale(), 1.5);
        assert_eq!(store.get_raw(KEY_HEADER_SCALE).as_deref(), Some("1.5"));
        assert_eq!(store.get_raw(KEY_HEADER_TITLE).as_deref(), Some("Hytta"));
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let store = ConfigStore::new(MemoryBackend::with_quota(16));
        let mut manager = PageManager::load(store.clone());
        manager.add_card_to_page("home", "light.kitchen", SettingsBag::new());

        assert_eq!(manager.pages_config().cards("home"), ["light.kitchen"]);
        assert_eq!(manager.failed_writes(), 1);
        assert!(store.get_raw(KEY_PAGES_CONFIG).is_none());
    }

    #[test]
    fn test_move_card() {
        let mut manager = PageManager::load(ConfigStore::in_memory());
        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        manager.add_cards_to_page("home", &ids, |_| None);
        assert!(manager.move_card("home", 0, 2));
        assert_eq!(manager.pages_config().cards("home"), ["b", "c", "a"]);
        assert!(!manager.move_card("home", 3, 0));
    }

    #[test]
    fn test_add_and_remove_page() {
        let mut manager = PageManager::load(ConfigStore::in_memory());
        let page = manager.add_page("Kitchen");
        assert!(manager.pages_config().has_page(&page));
        assert_eq!(manager.page_options(&page).label.as_deref(), Some("Kitchen"));

        assert!(manager.remove_page(&page));
        assert!(!manager.pages_config().page_cards.contains_key(&page));
        assert!(!manager.page_settings().contains_key(&page));
        // The last page stays
        assert!(!manager.remove_page("home"));
    }

    #[test]
    fn test_snapshot_import_updates_memory() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        let doc = SnapshotDocument::from_json(
            r#"{"version":1,"layout":{
                "pagesConfig":{"pages":["home","media"],"home":["power","lamp_1"],"media":[]},
                "gridColumns":4,
                "hiddenCards":["lamp_1"]
            },"appearance":{}}"#,
        )
        .unwrap();
        apply_snapshot(&store, &doc, &mut manager);

        assert_eq!(manager.pages_config().pages, vec!["home", "media"]);
        assert_eq!(manager.pages_config().cards("home"), ["lamp_1"]);
        assert_eq!(manager.grid_columns(), 4);
        assert!(manager.is_card_hidden("lamp_1"));

        // A reload from the store agrees with the in-memory state
        let reloaded = PageManager::load(store.clone());
        assert_eq!(reloaded.pages_config(), manager.pages_config());
    }

    #[test]
    fn test_custom_names_and_icons_persist() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        manager.save_custom_name("lamp_1", "Desk lamp");
        manager.save_custom_icon("lamp_1", "mdi:lamp");
        manager.save_custom_name("lamp_1", "Reading lamp");

        assert_eq!(manager.custom_names()["lamp_1"], "Reading lamp");
        assert_eq!(manager.custom_icons()["lamp_1"], "mdi:lamp");
        assert_eq!(
            store.get_raw(KEY_CUSTOM_NAMES).as_deref(),
            Some(r#"{"lamp_1":"Reading lamp"}"#)
        );
        assert_eq!(
            store.get_raw(KEY_CUSTOM_ICONS).as_deref(),
            Some(r#"{"lamp_1":"mdi:lamp"}"#)
        );
    }

    #[test]
    fn test_header_settings_and_status_pills_persist() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        let settings = HeaderSettings {
            show_clock: false,
            header_font: HeaderFont::Georgia,
            ..HeaderSettings::default()
        };
        manager.update_header_settings(settings.clone());
        manager.save_status_pills_config(vec![json!({"id": "pill_1", "entityId": "sensor.power"})]);

        assert_eq!(manager.header_settings(), &settings);
        assert_eq!(
            store.read_json_value(KEY_HEADER_SETTINGS).unwrap(),
            json!({"showTitle": true, "showClock": false, "showDate": true, "headerFont": "georgia"})
        );
        assert_eq!(manager.status_pills_config().len(), 1);
        assert_eq!(
            store.read_json_value(KEY_STATUS_PILLS_CONFIG).unwrap(),
            json!([{"id": "pill_1", "entityId": "sensor.power"}])
        );
    }

    #[test]
    fn test_grid_columns_clamped_to_one() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        manager.set_grid_columns(4);
        assert_eq!(store.get_raw(KEY_GRID_COLUMNS).as_deref(), Some("4"));
        manager.set_grid_columns(0);
        assert_eq!(manager.grid_columns(), 1);
        assert_eq!(store.get_raw(KEY_GRID_COLUMNS).as_deref(), Some("1"));
    }

    #[test]
    fn test_grid_gap_rejects_negative() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        manager.set_grid_gap(12.5);
        manager.set_grid_gap(-4.0);
        manager.set_grid_gap(f64::NAN);

        assert_eq!(manager.grid_gap(), 12.5);
        assert_eq!(store.get_raw(KEY_GRID_GAP).as_deref(), Some("12.5"));

        manager.set_grid_gap(0.0);
        assert_eq!(store.get_raw(KEY_GRID_GAP).as_deref(), Some("0"));
    }

    #[test]
    fn test_whole_structure_replacement_persists() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());

        let mut config = PagesConfig::default();
        config.pages.push("garden".to_string());
        config.page_cards.insert("garden".to_string(), vec!["light.shed".to_string()]);
        manager.persist_pages_config(config.clone());

        let mut cards = CardSettings::new();
        cards.insert("light.shed".to_string(), bag(json!({"size": "small"})));
        manager.persist_card_settings(cards);

        let mut pages = PageSettings::new();
        pages.insert("garden".to_string(), bag(json!({"label": "Hage"})));
        manager.persist_page_settings(pages);

        assert_eq!(manager.pages_config(), &config);
        assert_eq!(
            store.read_json_value(KEY_PAGES_CONFIG).unwrap(),
            json!({"header": [], "pages": ["home", "garden"], "garden": ["light.shed"], "home": []})
        );
        assert_eq!(
            store.read_json_value(KEY_CARD_SETTINGS).unwrap(),
            json!({"light.shed": {"size": "small"}})
        );
        assert_eq!(manager.page_options("garden").label.as_deref(), Some("Hage"));
        assert_eq!(
            store.read_json_value(KEY_PAGE_SETTINGS).unwrap(),
            json!({"garden": {"label": "Hage"}})
        );
    }

    #[test]
    fn test_unknown_page_is_not_created() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        assert!(!manager.remove_card_from_page("typo", "lamp_1"));
        assert!(!manager.move_card("typo", 0, 0));
        manager.add_card_to_page("home", "lamp_1", SettingsBag::new());

        assert!(!manager.pages_config().page_cards.contains_key("typo"));
        let saved = store.read_json_value(KEY_PAGES_CONFIG).unwrap();
        assert!(saved.get("typo").is_none());
        assert_eq!(saved["home"], json!(["lamp_1"]));
    }

    #[test]
    fn test_invalid_stored_scale_and_gap_use_defaults() {
        let store = ConfigStore::new(
            MemoryBackend::new()
                .with_entry(KEY_HEADER_SCALE, "-1")
                .with_entry(KEY_GRID_GAP, "-8"),
        );
        let manager = PageManager::load(store);
        assert_eq!(manager.header_scale(), DEFAULT_HEADER_SCALE);
        assert_eq!(manager.grid_gap(), DEFAULT_GRID_GAP);
    }

    #[test]
    fn test_sink_ignores_invalid_scale_and_gap() {
        let mut manager = PageManager::load(ConfigStore::in_memory());
        manager.apply_update(&SnapshotUpdate::HeaderScale(-1.0));
        manager.apply_update(&SnapshotUpdate::GridGap(-2.0));
        assert_eq!(manager.header_scale(), DEFAULT_HEADER_SCALE);
        assert_eq!(manager.grid_gap(), DEFAULT_GRID_GAP);

        manager.apply_update(&SnapshotUpdate::HeaderScale(1.25));
        assert_eq!(manager.header_scale(), 1.25);
    }

    #[test]
    fn test_card_config_reads_typed_settings() {
        let mut manager = PageManager::load(ConfigStore::in_memory());
        manager.add_card_to_page("home", "cover_card_1", bag(json!({"coverId": "cover.garage"})));

        let Some(CardConfig::Cover(cover)) = manager.card_config("cover_card_1", "home") else {
            panic!("expected a cover config");
        };
        assert_eq!(cover.cover_id, "cover.garage");
        assert!(manager.card_config("cover_card_2", "home").is_none());
    }

    #[test]
    fn test_snapshot_reflects_mutations() {
        let store = ConfigStore::in_memory();
        let mut manager = PageManager::load(store.clone());
        manager.save_card_setting("lamp_1", "size", json!("small"));
        let snapshot = collect_snapshot(&store);
        assert_eq!(snapshot.layout["cardSettings"], json!({"lamp_1": {"size": "small"}}));
    }
}
