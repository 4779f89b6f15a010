//! Which component owns each persisted key.

use log::warn;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;

use super::connection::ConnectionConfig;
use super::preferences::Preferences;
use crate::core::PageManager;

/// Component responsible for reading and writing a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOwner {
    Pages,
    Preferences,
    Connection,
}

impl KeyOwner {
    pub const ALL: [KeyOwner; 3] = [KeyOwner::Pages, KeyOwner::Preferences, KeyOwner::Connection];

    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            KeyOwner::Pages => &PageManager::OWNED_KEYS,
            KeyOwner::Preferences => &Preferences::OWNED_KEYS,
            KeyOwner::Connection => &ConnectionConfig::OWNED_KEYS,
        }
    }
}

impl fmt::Display for KeyOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyOwner::Pages => "pages",
            KeyOwner::Preferences => "preferences",
            KeyOwner::Connection => "connection",
        };
        f.write_str(name)
    }
}

static KEY_OWNERS: Lazy<BTreeMap<&'static str, KeyOwner>> = Lazy::new(|| {
    let mut owners = BTreeMap::new();
    for owner in KeyOwner::ALL {
        for key in owner.keys() {
            if let Some(previous) = owners.insert(*key, owner) {
                warn!("Key {} claimed by both {} and {}", key, previous, owner);
            }
        }
    }
    owners
});

/// Owner of a persisted key, `None` for keys this app does not use
pub fn owner_of(key: &str) -> Option<KeyOwner> {
    KEY_OWNERS.get(key).copied()
}

/// All owned keys with their owners
pub fn key_owners() -> &'static BTreeMap<&'static str, KeyOwner> {
    &KEY_OWNERS
}
