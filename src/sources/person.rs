//! Locating a person's tracker and phone battery.
//!
//! A person entity often lacks coordinates or battery state itself. These
//! helpers pick the best related entity: an explicit override first, then
//! the person's `source` attribute, then a fuzzy match on the person's
//! name.

use serde_json::Value;
use tunet_types::{EntityMap, EntityState, SettingsBag};

/// Name parts shorter than this are ignored when matching trackers
const MIN_TRACKER_NAME_PART: usize = 3;

/// Manual entity choices from the person card's settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonOverrides {
    pub device_tracker: Option<String>,
    pub battery_entity: Option<String>,
}

impl PersonOverrides {
    /// Read `deviceTracker` and `batteryEntity` from card settings
    pub fn from_bag(bag: &SettingsBag) -> Self {
        let text = |name: &str| {
            bag.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            device_tracker: text("deviceTracker"),
            battery_entity: text("batteryEntity"),
        }
    }
}

/// Where a person is, and which entity the position came from
#[derive(Debug, Clone, PartialEq)]
pub struct PersonLocation {
    /// Entity whose history tracks this person
    pub tracked_entity_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PersonLocation {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonBattery {
    pub level: Option<f64>,
    pub state: Option<String>,
}

/// Coordinate attribute; zero counts as unset
fn coordinate(entity: &EntityState, name: &str) -> Option<f64> {
    entity.attr_f64(name).filter(|v| *v != 0.0)
}

fn name_parts(person: Option<&EntityState>) -> Vec<String> {
    person
        .and_then(EntityState::friendly_name)
        .unwrap_or("")
        .to_lowercase()
        .split(' ')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Integer prefix of a state string (`"87 %"` is 87)
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

pub fn resolve_person_location(
    person_id: &str,
    entities: &EntityMap,
    overrides: &PersonOverrides,
) -> PersonLocation {
    let person = entities.get(person_id);
    let mut location = PersonLocation {
        tracked_entity_id: person_id.to_string(),
        latitude: person.and_then(|p| coordinate(p, "latitude")),
        longitude: person.and_then(|p| coordinate(p, "longitude")),
    };

    let manual = overrides
        .device_tracker
        .as_deref()
        .and_then(|id| entities.get(id));
    let source = person
        .and_then(|p| p.attr_str("source"))
        .and_then(|id| entities.get(id));

    if let Some(tracker) = manual {
        location.tracked_entity_id = tracker.entity_id.clone();
        if let (Some(lat), Some(lon)) =
            (coordinate(tracker, "latitude"), coordinate(tracker, "longitude"))
        {
            location.latitude = Some(lat);
            location.longitude = Some(lon);
        }
    } else if let Some(source) = source {
        location.tracked_entity_id = source.entity_id.clone();
        if location.latitude.is_none() {
            location.latitude = coordinate(source, "latitude");
            location.longitude = coordinate(source, "longitude");
        }
    }

    if location.coordinates().is_none() && location.tracked_entity_id == person_id {
        let parts = name_parts(person);
        let candidate = entities.values().find(|e| {
            if !e.entity_id.starts_with("device_tracker.") || coordinate(e, "latitude").is_none() {
                return false;
            }
            let tracker_name = e.friendly_name().unwrap_or("").to_lowercase();
            let tracker_id = e.entity_id.to_lowercase();
            parts.iter().any(|part| {
                part.chars().count() >= MIN_TRACKER_NAME_PART
                    && (tracker_name.contains(part.as_str()) || tracker_id.contains(part.as_str()))
            })
        });
        if let Some(tracker) = candidate {
            location.latitude = coordinate(tracker, "latitude");
            location.longitude = coordinate(tracker, "longitude");
            location.tracked_entity_id = tracker.entity_id.clone();
        }
    }

    location
}

pub fn resolve_person_battery(
    person_id: &str,
    entities: &EntityMap,
    overrides: &PersonOverrides,
) -> PersonBattery {
    let person = entities.get(person_id);
    let mut battery = PersonBattery {
        level: person.and_then(|p| p.attr_f64("battery_level")),
        state: person
            .and_then(|p| p.attr_str("battery_state"))
            .map(str::to_string),
    };

    let manual = overrides
        .battery_entity
        .as_deref()
        .and_then(|id| entities.get(id));

    if let Some(entity) = manual {
        if let Some(level) = parse_leading_int(&entity.state) {
            battery.level = Some(level as f64);
            battery.state = entity.attr_str("battery_state").map(str::to_string);
        } else if let Some(level) = entity.attr_f64("battery_level") {
            battery.level = Some(level);
        }
        return battery;
    }
    if battery.level.is_some() {
        return battery;
    }

    let source_level = person
        .and_then(|p| p.attr_str("source"))
        .and_then(|id| entities.get(id))
        .and_then(|source| source.attr_f64("battery_level"));
    if source_level.is_some() {
        battery.level = source_level;
        return battery;
    }

    let parts = name_parts(person);
    let mentions_person = |e: &EntityState| parts.iter().any(|part| e.entity_id.contains(part.as_str()));
    let candidate = entities.values().find(|e| {
        let battery_sensor =
            e.entity_id.starts_with("sensor.") && e.attr_str("device_class") == Some("battery");
        (battery_sensor || e.attributes.contains_key("battery_level")) && mentions_person(e)
    });
    if let Some(entity) = candidate {
        battery.level = if entity.entity_id.starts_with("sensor.") {
            parse_leading_int(&entity.state).map(|n| n as f64)
        } else {
            entity.attr_f64("battery_level")
        };
    }
    battery
}
