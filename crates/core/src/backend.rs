//! Storage backend trait and the in-memory backend

use std::collections::BTreeMap;

use crate::StoreError;

/// Flat string key/value storage.
///
/// Backends are opened once at application start and stay available for
/// the lifetime of the process. `open`/`close` are no-ops for in-process
/// stores.
pub trait StorageBackend {
    /// Prepare the backend for use
    fn open(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release the backend; later calls may fail with `Unavailable`
    fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Read a raw value
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a raw value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// All keys currently stored
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory backend.
///
/// An optional byte quota (keys plus values) makes writes fail with
/// [`StoreError::QuotaExceeded`] the way a full browser store does.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
    closed: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses writes once `limit` bytes are in use
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::default()
        }
    }

    /// Seed a value without quota checks
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            Err(StoreError::Unavailable("memory backend is closed".to_string()))
        } else {
            Ok(())
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn open(&mut self) -> Result<(), StoreError> {
        self.closed = false;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closed = true;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        if let Some(limit) = self.quota {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut backend = MemoryBackend::new();
        backend.set("a", "1").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));
        backend.remove("a").unwrap();
        assert_eq!(backend.get("a").unwrap(), None);
        // Removing twice is fine
        backend.remove("a").unwrap();
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let mut backend = MemoryBackend::with_quota(10);
        backend.set("k", "12345").unwrap();
        let err = backend.set("other", "123456").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        // Replacing an existing value only counts the new size
        backend.set("k", "123456789").unwrap();
    }

    #[test]
    fn test_closed_backend_is_unavailable() {
        let mut backend = MemoryBackend::new();
        backend.close().unwrap();
        assert!(matches!(backend.get("a"), Err(StoreError::Unavailable(_))));
        backend.open().unwrap();
        assert!(backend.get("a").unwrap().is_none());
    }
}
