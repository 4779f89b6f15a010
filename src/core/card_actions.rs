//! Card creation from the add-card dialog.
//!
//! Each request kind mints its card id(s), builds the settings payload and
//! commits through [`PageManager`]. Requests missing a required selection
//! add nothing.

use log::debug;
use serde_json::Value;
use std::fmt;
use tunet_types::card::{
    AndroidTvCardConfig, ClimateCardConfig, CostCardConfig, CoverCardConfig, MediaGroupConfig,
    NordpoolCardConfig, SizedCardConfig, WeatherCardConfig,
};
use tunet_types::pages::HEADER_KEY;
use tunet_types::{
    settings_key, CardConfig, CardKind, CardSize, SettingsBag, SpacerCardConfig, SpacerVariant,
};

use super::card_id;
use super::page_manager::PageManager;

/// Card type for cards that use an entity id directly as their card id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCardType {
    Entity,
    Toggle,
    Sensor,
}

impl EntityCardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCardType::Entity => "entity",
            EntityCardType::Toggle => "toggle",
            EntityCardType::Sensor => "sensor",
        }
    }
}

impl fmt::Display for EntityCardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user selected in the add-card dialog
#[derive(Debug, Clone, PartialEq)]
pub enum AddCardRequest {
    Weather {
        weather_id: String,
        temp_id: Option<String>,
    },
    /// Reuses the selection when it is a single existing calendar card id
    Calendar { selected: Vec<String> },
    Todo,
    MediaGroup { media_ids: Vec<String> },
    /// One card per selected climate entity
    Climate { entity_ids: Vec<String> },
    /// One card per selected cover entity
    Cover { entity_ids: Vec<String> },
    AndroidTv {
        media_player_id: String,
        remote_id: Option<String>,
    },
    Cost { today_id: String, month_id: String },
    Nordpool { nordpool_id: String, decimals: u8 },
    Car,
    Spacer { variant: SpacerVariant },
    /// Entity cards with a display type
    Entities {
        card_type: EntityCardType,
        entity_ids: Vec<String>,
    },
    /// Entity ids added as-is, without settings
    Plain { entity_ids: Vec<String> },
}

impl AddCardRequest {
    /// Entity ids selected in the dialog; these are what a header target
    /// receives
    pub fn selected_entities(&self) -> &[String] {
        match self {
            AddCardRequest::Calendar { selected } => selected,
            AddCardRequest::MediaGroup { media_ids } => media_ids,
            AddCardRequest::Climate { entity_ids }
            | AddCardRequest::Cover { entity_ids }
            | AddCardRequest::Entities { entity_ids, .. }
            | AddCardRequest::Plain { entity_ids } => entity_ids,
            _ => &[],
        }
    }
}

/// Outcome of [`PageManager::add_selected`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddedCards {
    pub card_ids: Vec<String>,
    /// Settings key to open in the card editor, for card types that start
    /// with an editor
    pub edit_settings_key: Option<String>,
}

impl AddedCards {
    pub fn is_empty(&self) -> bool {
        self.card_ids.is_empty()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn mint(kind: CardKind) -> String {
    card_id::mint_card_id(kind.id_prefix().unwrap_or("card"))
}

impl PageManager {
    /// Add the cards described by `request` to `page_id`
    pub fn add_selected(&mut self, page_id: &str, request: AddCardRequest) -> AddedCards {
        if page_id == HEADER_KEY {
            let ids = request.selected_entities().to_vec();
            if !ids.is_empty() {
                self.add_cards_to_page(HEADER_KEY, &ids, |_| None);
            }
            return AddedCards {
                card_ids: ids,
                edit_settings_key: None,
            };
        }

        match request {
            AddCardRequest::Weather {
                weather_id,
                temp_id,
            } => {
                if weather_id.is_empty() {
                    return AddedCards::default();
                }
                let config = CardConfig::Weather(WeatherCardConfig {
                    weather_id,
                    temp_id: non_empty(&temp_id),
                });
                self.commit_single(page_id, mint(CardKind::WeatherTemp), config.to_bag(), false)
            }
            AddCardRequest::Calendar { selected } => {
                let card_id = match selected.as_slice() {
                    [existing] if CardKind::from_card_id(existing) == CardKind::Calendar => {
                        existing.clone()
                    }
                    _ => mint(CardKind::Calendar),
                };
                self.commit_bare(page_id, vec![card_id])
            }
            AddCardRequest::Todo => {
                let config = CardConfig::Todo(SizedCardConfig {
                    card_type: None,
                    size: CardSize::Large,
                });
                self.commit_single(page_id, mint(CardKind::Todo), config.to_bag(), true)
            }
            AddCardRequest::MediaGroup { media_ids } => {
                if media_ids.is_empty() {
                    return AddedCards::default();
                }
                let config = CardConfig::Media(MediaGroupConfig { media_ids });
                self.commit_single(page_id, mint(CardKind::MediaGroup), config.to_bag(), false)
            }
            AddCardRequest::Climate { entity_ids } => {
                self.commit_batch(page_id, CardKind::Climate, &entity_ids, |entity_id| {
                    CardConfig::Climate(ClimateCardConfig {
                        climate_id: entity_id.to_string(),
                    })
                })
            }
            AddCardRequest::Cover { entity_ids } => {
                self.commit_batch(page_id, CardKind::Cover, &entity_ids, |entity_id| {
                    CardConfig::Cover(CoverCardConfig {
                        cover_id: entity_id.to_string(),
                    })
                })
            }
            AddCardRequest::AndroidTv {
                media_player_id,
                remote_id,
            } => {
                if media_player_id.is_empty() {
                    return AddedCards::default();
                }
                let config = CardConfig::AndroidTv(AndroidTvCardConfig {
                    media_player_id,
                    remote_id: non_empty(&remote_id),
                });
                self.commit_single(page_id, mint(CardKind::AndroidTv), config.to_bag(), false)
            }
            AddCardRequest::Cost { today_id, month_id } => {
                if today_id.is_empty() || month_id.is_empty() {
                    return AddedCards::default();
                }
                let config = CardConfig::Cost(CostCardConfig { today_id, month_id });
                self.commit_single(page_id, mint(CardKind::Cost), config.to_bag(), false)
            }
            AddCardRequest::Nordpool {
                nordpool_id,
                decimals,
            } => {
                if nordpool_id.is_empty() {
                    return AddedCards::default();
                }
                let config = CardConfig::Nordpool(NordpoolCardConfig {
                    nordpool_id,
                    decimals,
                });
                self.commit_single(page_id, mint(CardKind::Nordpool), config.to_bag(), false)
            }
            AddCardRequest::Car => {
                let config = CardConfig::Car(SizedCardConfig {
                    card_type: Some("car".to_string()),
                    size: CardSize::Large,
                });
                self.commit_single(page_id, mint(CardKind::Car), config.to_bag(), true)
            }
            AddCardRequest::Spacer { variant } => {
                let config = CardConfig::Spacer(SpacerCardConfig {
                    variant,
                    ..SpacerCardConfig::default()
                });
                self.commit_single(page_id, mint(CardKind::Spacer), config.to_bag(), true)
            }
            AddCardRequest::Entities {
                card_type,
                entity_ids,
            } => {
                let payloads: Vec<SettingsBag> = entity_ids
                    .iter()
                    .map(|id| self.entity_payload(page_id, id, card_type))
                    .collect();
                let mut payloads = payloads.into_iter();
                self.add_cards_to_page(page_id, &entity_ids, |_| payloads.next());
                AddedCards {
                    card_ids: entity_ids,
                    edit_settings_key: None,
                }
            }
            AddCardRequest::Plain { entity_ids } => self.commit_bare(page_id, entity_ids),
        }
    }

    /// `type` plus the existing size, or `large`
    fn entity_payload(&self, page_id: &str, card_id: &str, card_type: EntityCardType) -> SettingsBag {
        let size = self
            .card_settings()
            .get(&settings_key(card_id, page_id))
            .and_then(|bag| bag.get("size"))
            .filter(|size| size.as_str().is_some_and(|s| !s.is_empty()))
            .cloned()
            .unwrap_or_else(|| Value::String("large".to_string()));
        let mut payload = SettingsBag::new();
        payload.insert("type".to_string(), Value::String(card_type.to_string()));
        payload.insert("size".to_string(), size);
        payload
    }

    fn commit_single(
        &mut self,
        page_id: &str,
        card_id: String,
        payload: SettingsBag,
        open_editor: bool,
    ) -> AddedCards {
        self.add_card_to_page(page_id, &card_id, payload);
        debug!("Created card {} on {}", card_id, page_id);
        AddedCards {
            edit_settings_key: open_editor.then(|| settings_key(&card_id, page_id)),
            card_ids: vec![card_id],
        }
    }

    fn commit_bare(&mut self, page_id: &str, card_ids: Vec<String>) -> AddedCards {
        if card_ids.is_empty() {
            return AddedCards::default();
        }
        self.add_cards_to_page(page_id, &card_ids, |_| None);
        AddedCards {
            card_ids,
            edit_settings_key: None,
        }
    }

    fn commit_batch<F>(
        &mut self,
        page_id: &str,
        kind: CardKind,
        entity_ids: &[String],
        config_for: F,
    ) -> AddedCards
    where
        F: Fn(&str) -> CardConfig,
    {
        if entity_ids.is_empty() {
            return AddedCards::default();
        }
        let card_ids =
            card_id::mint_batch_card_ids(kind.id_prefix().unwrap_or("card"), entity_ids.len());
        let mut payloads = entity_ids.iter().map(|id| config_for(id).to_bag());
        self.add_cards_to_page(page_id, &card_ids, |_| payloads.next());
        AddedCards {
            card_ids,
            edit_settings_key: None,
        }
    }
}
