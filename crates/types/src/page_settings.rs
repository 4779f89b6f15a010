//! Per-page display options.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::card::SettingsBag;

/// Page settings keyed by page id
pub type PageSettings = BTreeMap<String, SettingsBag>;

/// Page type of media pages
pub const MEDIA_PAGE_TYPE: &str = "media";

/// Retired page type that is rewritten to [`MEDIA_PAGE_TYPE`] on load
pub const LEGACY_SONOS_PAGE_TYPE: &str = "sonos";

/// Typed view of a page settings bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PageOptions {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub page_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl PageOptions {
    /// Read the known fields of a bag; malformed fields fall back to defaults
    pub fn from_bag(bag: &SettingsBag) -> Self {
        Self {
            page_type: bag.get("type").and_then(|v| v.as_str()).map(str::to_string),
            label: bag.get("label").and_then(|v| v.as_str()).map(str::to_string),
            icon: bag.get("icon").and_then(|v| v.as_str()).map(str::to_string),
            hidden: bag.get("hidden").and_then(|v| v.as_bool()).unwrap_or(false),
        }
    }

    pub fn is_media(&self) -> bool {
        self.page_type.as_deref() == Some(MEDIA_PAGE_TYPE)
    }
}
