//! Entity sources.
//!
//! Cards read Home Assistant entity state through [`EntitySource`]. The
//! live connection is out of scope for this crate; [`StaticEntitySource`]
//! serves a fixed map loaded from JSON, for the CLI and for tests.

pub mod person;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::path::Path;
use tunet_types::{EntityMap, EntityState};

pub use person::{resolve_person_battery, resolve_person_location, PersonBattery, PersonLocation};

/// Read access to entity state
pub trait EntitySource {
    /// All known entities keyed by entity id
    fn entities(&self) -> &EntityMap;

    /// Whether the source currently delivers live state
    fn connected(&self) -> bool;

    fn entity(&self, entity_id: &str) -> Option<&EntityState> {
        self.entities().get(entity_id)
    }
}

/// Fixed set of entities
#[derive(Debug, Clone, Default)]
pub struct StaticEntitySource {
    entities: EntityMap,
}

impl StaticEntitySource {
    pub fn new(entities: EntityMap) -> Self {
        Self { entities }
    }

    /// Parse a JSON object mapping entity id to `{state, attributes}`.
    ///
    /// Entries that do not decode are skipped.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: Map<String, Value> =
            serde_json::from_str(content).context("Entity file is not a JSON object")?;
        let mut entities = EntityMap::new();
        for (id, mut value) in raw {
            if let Value::Object(fields) = &mut value {
                fields
                    .entry("entity_id")
                    .or_insert_with(|| Value::String(id.clone()));
            }
            match serde_json::from_value::<EntityState>(value) {
                Ok(entity) => {
                    entities.insert(id, entity);
                }
                Err(e) => warn!("Skipping entity {}: {}", id, e),
            }
        }
        debug!("Loaded {} static entities", entities.len());
        Ok(Self { entities })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn insert(&mut self, entity: EntityState) {
        self.entities.insert(entity.entity_id.clone(), entity);
    }
}

impl EntitySource for StaticEntitySource {
    fn entities(&self) -> &EntityMap {
        &self.entities
    }

    fn connected(&self) -> bool {
        !self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_entity_id() {
        let source = StaticEntitySource::from_json_str(
            r#"{
                "light.kitchen": {"state": "on", "attributes": {"friendly_name": "Kitchen"}},
                "sensor.broken": {"attributes": {}},
                "sensor.temp": {"state": "21.5"}
            }"#,
        )
        .unwrap();
        assert_eq!(source.entities().len(), 2);
        let kitchen = source.entity("light.kitchen").unwrap();
        assert_eq!(kitchen.entity_id, "light.kitchen");
        assert_eq!(kitchen.friendly_name(), Some("Kitchen"));
        assert!(source.connected());
    }

    #[test]
    fn test_non_object_is_error() {
        assert!(StaticEntitySource::from_json_str("[1, 2]").is_err());
        assert!(!StaticEntitySource::default().connected());
    }
}
