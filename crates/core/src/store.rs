//! Typed access to the storage backend.
//!
//! Structured values are stored as compact JSON, scalars as plain strings.
//! Reads never fail: absent or undecodable values yield the caller's
//! fallback and the problem is logged. Writes return a `Result` so each
//! call site decides whether a failed write matters.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{MemoryBackend, StorageBackend, StoreError};

/// Shared handle to the process-wide configuration store.
///
/// Cloning the handle shares the backend. Components each own a disjoint
/// set of keys.
#[derive(Clone)]
pub struct ConfigStore {
    backend: Rc<RefCell<Box<dyn StorageBackend>>>,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore").finish_non_exhaustive()
    }
}

impl ConfigStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Rc::new(RefCell::new(Box::new(backend))),
        }
    }

    /// Store backed by a fresh [`MemoryBackend`]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn open(&self) -> Result<(), StoreError> {
        self.backend.borrow_mut().open()
    }

    pub fn close(&self) -> Result<(), StoreError> {
        self.backend.borrow_mut().close()
    }

    /// Raw stored string, `None` if absent or unreadable
    pub fn get_raw(&self, key: &str) -> Option<String> {
        match self.backend.borrow().get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    /// Store a raw string
    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.backend.borrow_mut().set(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend.borrow_mut().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }

    /// All stored keys; empty if the backend cannot list them
    pub fn keys(&self) -> Vec<String> {
        match self.backend.borrow().keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list storage keys: {}", e);
                Vec::new()
            }
        }
    }

    /// Decode a key's JSON value.
    ///
    /// Returns `None` for an absent or empty value and for invalid JSON;
    /// decode failures are logged.
    pub fn read_json_value(&self, key: &str) -> Option<Value> {
        let raw = self.get_raw(key)?;
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to parse {}: {}", key, e);
                None
            }
        }
    }

    /// Decode a key into `T`, or return `fallback`
    pub fn read_json<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let Some(value) = self.read_json_value(key) else {
            return fallback;
        };
        match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Stored value for {} has an unexpected shape: {}", key, e);
                fallback
            }
        }
    }

    /// Encode `value` as compact JSON and store it
    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        debug!("Writing {} ({} bytes)", key, encoded.len());
        self.set_raw(key, &encoded)
    }

    /// Parse a numeric string; absent or non-finite values give `None`.
    ///
    /// A stored empty or blank string reads as `0`.
    pub fn read_number_opt(&self, key: &str) -> Option<f64> {
        let raw = self.get_raw(key)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(0.0);
        }
        trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    pub fn read_number(&self, key: &str, fallback: f64) -> f64 {
        self.read_number_opt(key).unwrap_or(fallback)
    }

    /// Store a number in its shortest decimal form (`34`, `1.5`)
    pub fn write_number(&self, key: &str, value: f64) -> Result<(), StoreError> {
        self.set_raw(key, &format_number(value))
    }

    /// Plain string value; `None` if absent
    pub fn read_string(&self, key: &str) -> Option<String> {
        self.get_raw(key)
    }

    pub fn write_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_raw(key, value)
    }
}

/// Format a number the way it is stored: integers without a fraction
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}
