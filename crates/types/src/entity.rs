//! Entity state as delivered by the Home Assistant connection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Entity states keyed by entity id
pub type EntityMap = BTreeMap<String, EntityState>;

/// One entity's state and attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    /// Domain part of the entity id (`light` for `light.kitchen`)
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map(|(domain, _)| domain)
            .unwrap_or("")
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.attributes.get("friendly_name").and_then(|v| v.as_str())
    }

    /// Numeric attribute, accepting numbers and numeric strings
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        match self.attributes.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_domain_and_attributes() {
        let entity = EntityState::new("device_tracker.phone", "home")
            .with_attribute("latitude", json!(59.91))
            .with_attribute("battery_level", json!("87"));
        assert_eq!(entity.domain(), "device_tracker");
        assert_eq!(entity.attr_f64("latitude"), Some(59.91));
        assert_eq!(entity.attr_f64("battery_level"), Some(87.0));
        assert_eq!(entity.attr_f64("missing"), None);
    }

    #[test]
    fn test_deserialize_without_attributes() {
        let entity: EntityState =
            serde_json::from_value(json!({"entity_id": "sun.sun", "state": "above_horizon"}))
                .unwrap();
        assert!(entity.attributes.is_empty());
    }
}
