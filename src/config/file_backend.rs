//! JSON-file storage backend.
//!
//! All keys live in one JSON object mapping key to string value. The file
//! is read on `open` and rewritten on every change. A file that cannot be
//! parsed is renamed to `storage.json.bak` before the backend starts empty,
//! so the next write never overwrites it.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tunet_core::{StorageBackend, StoreError};

/// File name inside the config directory
pub const STORAGE_FILE: &str = "storage.json";

/// Extension given to a storage file that failed to parse
pub const BACKUP_EXTENSION: &str = "json.bak";

/// Backend persisting to a single JSON file
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    open: bool,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            open: false,
        }
    }

    /// Backend at the platform config location
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(default_storage_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!(
                "{} is not open",
                self.path.display()
            )))
        }
    }

    /// Where an unparseable storage file is moved
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension(BACKUP_EXTENSION)
    }

    /// Move an unparseable file out of the way; fails if it cannot be moved
    fn set_aside(&self, reason: &serde_json::Error) -> Result<(), StoreError> {
        let backup = self.backup_path();
        std::fs::rename(&self.path, &backup).map_err(|e| {
            StoreError::Unavailable(format!(
                "{} is unreadable ({}) and could not be moved to {}: {}",
                self.path.display(),
                reason,
                backup.display(),
                e
            ))
        })?;
        warn!(
            "Unreadable storage file {} moved to {}: {}",
            self.path.display(),
            backup.display(),
            reason
        );
        Ok(())
    }

    fn flush(&self, key: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            serde_json::to_string_pretty(&self.entries).map_err(|source| StoreError::Encode {
                key: key.to_string(),
                source,
            })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// `<config dir>/storage.json`
pub fn default_storage_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("no", "tunet", "tunet")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join(STORAGE_FILE))
}

impl StorageBackend for FileBackend {
    fn open(&mut self) -> Result<(), StoreError> {
        self.entries = match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    self.set_aside(&e)?;
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        self.open = true;
        debug!(
            "Opened {} with {} key(s)",
            self.path.display(),
            self.entries.len()
        );
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.open = false;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(key) {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        if self.entries.remove(key).is_some() {
            self.flush(key)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        Ok(self.entries.keys().cloned().collect())
    }
}
