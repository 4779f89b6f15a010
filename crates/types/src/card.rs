//! Card settings: the per-card attribute bags and typed views over them.
//!
//! Settings are stored untyped (`{"<settings key>": {...}}`) so that user
//! edits to fields this crate does not know about survive. Typed
//! [`CardConfig`] values are used to build the payloads merged into a bag
//! when a card is created, and to read a bag back for a known card type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Open attribute bag for one card or page
pub type SettingsBag = Map<String, Value>;

/// Card settings keyed by settings key
pub type CardSettings = BTreeMap<String, SettingsBag>;

/// Separator between page id and card id in page-scoped settings keys
pub const SCOPED_KEY_SEPARATOR: &str = "::";

/// Known card types, recognized by card id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    WeatherTemp,
    Calendar,
    Todo,
    MediaGroup,
    Climate,
    Cover,
    AndroidTv,
    Cost,
    Nordpool,
    Car,
    Spacer,
    /// A plain entity id used directly as a card id
    Entity,
}

impl CardKind {
    const PREFIXED: [CardKind; 11] = [
        CardKind::WeatherTemp,
        CardKind::Calendar,
        CardKind::Todo,
        CardKind::MediaGroup,
        CardKind::Climate,
        CardKind::Cover,
        CardKind::AndroidTv,
        CardKind::Cost,
        CardKind::Nordpool,
        CardKind::Car,
        CardKind::Spacer,
    ];

    /// Id prefix used when minting ids for this kind
    pub fn id_prefix(&self) -> Option<&'static str> {
        match self {
            CardKind::WeatherTemp => Some("weather_temp"),
            CardKind::Calendar => Some("calendar_card"),
            CardKind::Todo => Some("todo_card"),
            CardKind::MediaGroup => Some("media_group"),
            CardKind::Climate => Some("climate_card"),
            CardKind::Cover => Some("cover_card"),
            CardKind::AndroidTv => Some("androidtv_card"),
            CardKind::Cost => Some("cost_card"),
            CardKind::Nordpool => Some("nordpool_card"),
            CardKind::Car => Some("car_card"),
            CardKind::Spacer => Some("spacer_card"),
            CardKind::Entity => None,
        }
    }

    /// Classify a card id
    pub fn from_card_id(card_id: &str) -> Self {
        Self::PREFIXED
            .iter()
            .copied()
            .find(|kind| {
                kind.id_prefix()
                    .and_then(|prefix| card_id.strip_prefix(prefix))
                    .is_some_and(|rest| rest.starts_with('_'))
            })
            .unwrap_or(CardKind::Entity)
    }

    /// Page-scoped kinds keep one settings entry per page they appear on
    pub fn is_page_scoped(&self) -> bool {
        matches!(self, CardKind::Spacer)
    }
}

/// Derive the settings key for a card placed on a page.
///
/// Page-scoped cards are keyed `"<page>::<card>"`; everything else uses
/// the card id.
pub fn settings_key(card_id: &str, page_id: &str) -> String {
    if CardKind::from_card_id(card_id).is_page_scoped() {
        format!("{}{}{}", page_id, SCOPED_KEY_SEPARATOR, card_id)
    } else {
        card_id.to_string()
    }
}

/// Card size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    Small,
    Medium,
    #[default]
    Large,
}

/// Spacer card variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpacerVariant {
    /// Transparent gap
    #[default]
    Spacer,
    /// Horizontal rule
    Divider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherCardConfig {
    pub weather_id: String,
    pub temp_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaGroupConfig {
    pub media_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateCardConfig {
    pub climate_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverCardConfig {
    pub cover_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidTvCardConfig {
    pub media_player_id: String,
    pub remote_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCardConfig {
    pub today_id: String,
    pub month_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NordpoolCardConfig {
    pub nordpool_id: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    2
}

/// Settings shared by cards that only carry a display type and a size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedCardConfig {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(default)]
    pub size: CardSize,
}

/// Spacer and divider layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpacerCardConfig {
    #[serde(default)]
    pub variant: SpacerVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_px: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_align: Option<String>,
}

/// Typed card configuration, one variant per card kind that carries settings
#[derive(Debug, Clone, PartialEq)]
pub enum CardConfig {
    Weather(WeatherCardConfig),
    Media(MediaGroupConfig),
    Climate(ClimateCardConfig),
    Cover(CoverCardConfig),
    AndroidTv(AndroidTvCardConfig),
    Cost(CostCardConfig),
    Nordpool(NordpoolCardConfig),
    Todo(SizedCardConfig),
    Car(SizedCardConfig),
    Spacer(SpacerCardConfig),
    Entity(SizedCardConfig),
}

impl CardConfig {
    /// Card kind this configuration belongs to
    pub fn kind(&self) -> CardKind {
        match self {
            CardConfig::Weather(_) => CardKind::WeatherTemp,
            CardConfig::Media(_) => CardKind::MediaGroup,
            CardConfig::Climate(_) => CardKind::Climate,
            CardConfig::Cover(_) => CardKind::Cover,
            CardConfig::AndroidTv(_) => CardKind::AndroidTv,
            CardConfig::Cost(_) => CardKind::Cost,
            CardConfig::Nordpool(_) => CardKind::Nordpool,
            CardConfig::Todo(_) => CardKind::Todo,
            CardConfig::Car(_) => CardKind::Car,
            CardConfig::Spacer(_) => CardKind::Spacer,
            CardConfig::Entity(_) => CardKind::Entity,
        }
    }

    /// Read a typed view of a settings bag.
    ///
    /// Returns `None` for kinds without settings or when the bag lacks
    /// required fields.
    pub fn from_bag(kind: CardKind, bag: &SettingsBag) -> Option<Self> {
        let value = Value::Object(bag.clone());
        let parsed = match kind {
            CardKind::WeatherTemp => serde_json::from_value(value).map(CardConfig::Weather),
            CardKind::MediaGroup => serde_json::from_value(value).map(CardConfig::Media),
            CardKind::Climate => serde_json::from_value(value).map(CardConfig::Climate),
            CardKind::Cover => serde_json::from_value(value).map(CardConfig::Cover),
            CardKind::AndroidTv => serde_json::from_value(value).map(CardConfig::AndroidTv),
            CardKind::Cost => serde_json::from_value(value).map(CardConfig::Cost),
            CardKind::Nordpool => serde_json::from_value(value).map(CardConfig::Nordpool),
            CardKind::Todo => serde_json::from_value(value).map(CardConfig::Todo),
            CardKind::Car => serde_json::from_value(value).map(CardConfig::Car),
            CardKind::Spacer => serde_json::from_value(value).map(CardConfig::Spacer),
            CardKind::Entity => serde_json::from_value(value).map(CardConfig::Entity),
            CardKind::Calendar => return None,
        };
        parsed.ok()
    }

    /// Encode as the untyped bag stored on disk
    pub fn to_bag(&self) -> SettingsBag {
        let value = match self {
            CardConfig::Weather(c) => serde_json::to_value(c),
            CardConfig::Media(c) => serde_json::to_value(c),
            CardConfig::Climate(c) => serde_json::to_value(c),
            CardConfig::Cover(c) => serde_json::to_value(c),
            CardConfig::AndroidTv(c) => serde_json::to_value(c),
            CardConfig::Cost(c) => serde_json::to_value(c),
            CardConfig::Nordpool(c) => serde_json::to_value(c),
            CardConfig::Todo(c) | CardConfig::Car(c) | CardConfig::Entity(c) => {
                serde_json::to_value(c)
            }
            CardConfig::Spacer(c) => serde_json::to_value(c),
        };
        match value {
            Ok(Value::Object(map)) => map,
            Ok(_) => SettingsBag::new(),
            Err(e) => {
                log::warn!("Failed to encode {:?} card settings: {}", self.kind(), e);
                SettingsBag::new()
            }
        }
    }
}

/// Shallow-merge `payload` into `bag`; payload fields win.
pub fn merge_bag(bag: &mut SettingsBag, payload: &SettingsBag) {
    for (name, value) in payload {
        bag.insert(name.clone(), value.clone());
    }
}

/// Decode a card/page settings map leniently: entries whose value is not
/// an object are dropped instead of failing the whole map.
pub fn settings_from_value(value: Value) -> BTreeMap<String, SettingsBag> {
    let Value::Object(entries) = value else {
        return BTreeMap::new();
    };
    entries
        .into_iter()
        .filter_map(|(key, bag)| match bag {
            Value::Object(map) => Some((key, map)),
            other => {
                log::debug!("Skipping non-object settings entry {}: {}", key, other);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_card_id() {
        assert_eq!(CardKind::from_card_id("weather_temp_1700"), CardKind::WeatherTemp);
        assert_eq!(CardKind::from_card_id("climate_card_1700_abc123xyz"), CardKind::Climate);
        assert_eq!(CardKind::from_card_id("spacer_card_123"), CardKind::Spacer);
        assert_eq!(CardKind::from_card_id("light.kitchen"), CardKind::Entity);
        // The bare prefix is not a minted id
        assert_eq!(CardKind::from_card_id("todo_cardx"), CardKind::Entity);
    }

    #[test]
    fn test_settings_key_scopes_spacers() {
        assert_eq!(settings_key("spacer_card_123", "home"), "home::spacer_card_123");
        assert_eq!(settings_key("media_group_5", "home"), "media_group_5");
        assert_eq!(settings_key("light.kitchen", "media"), "light.kitchen");
    }

    #[test]
    fn test_weather_bag_keeps_null_temp() {
        let config = CardConfig::Weather(WeatherCardConfig {
            weather_id: "weather.home".to_string(),
            temp_id: None,
        });
        let bag = config.to_bag();
        assert_eq!(Value::Object(bag), json!({"weatherId": "weather.home", "tempId": null}));
    }

    #[test]
    fn test_from_bag_reads_spacer() {
        let bag = json!({
            "variant": "divider",
            "colSpan": "full",
            "heightPx": 40,
            "headingAlign": "right",
            "heading": "Section"
        });
        let config = CardConfig::from_bag(CardKind::Spacer, bag.as_object().unwrap());
        match config {
            Some(CardConfig::Spacer(spacer)) => {
                assert_eq!(spacer.variant, SpacerVariant::Divider);
                assert_eq!(spacer.height_px, Some(40));
                assert_eq!(spacer.heading.as_deref(), Some("Section"));
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_from_bag_missing_required_field() {
        let bag = json!({"size": "large"});
        assert!(CardConfig::from_bag(CardKind::Climate, bag.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_merge_bag_keeps_existing_fields() {
        let mut bag = json!({"a": 1, "b": 1}).as_object().unwrap().clone();
        let payload = json!({"b": 2, "c": 3}).as_object().unwrap().clone();
        merge_bag(&mut bag, &payload);
        assert_eq!(Value::Object(bag), json!({"a": 1, "b": 2, "c": 3}));
    }

    #[test]
    fn test_settings_from_value_skips_non_objects() {
        let settings = settings_from_value(json!({"ok": {"size": "small"}, "bad": 3}));
        assert_eq!(settings.len(), 1);
        assert!(settings.contains_key("ok"));
    }
}
