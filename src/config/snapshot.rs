//! Settings snapshot export and import.
//!
//! A snapshot is a portable JSON document holding the persisted layout and
//! appearance settings:
//!
//! ```json
//! { "version": 1, "layout": { "cardBorderRadius": 24, "cardSettings": {} }, "appearance": { "theme": "dark" } }
//! ```
//!
//! Snapshots are read straight from the store, so they reflect what was
//! last persisted rather than any in-memory state. Importing is a partial
//! update: only fields present and well-formed in the document are written,
//! everything else is left alone. Connection credentials are never part of
//! a snapshot.

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tunet_core::constants::*;
use tunet_core::ConfigStore;
use tunet_types::card::settings_from_value;
use tunet_types::{CardSettings, HeaderSettings, PageSettings};

use crate::core::{usable_grid_gap, usable_header_scale};

/// Version written into new snapshots
pub const SNAPSHOT_VERSION: u64 = 1;

/// Errors for documents that are not snapshots at all
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("snapshot must be a JSON object")]
    NotAnObject,
}

/// Snapshot document.
///
/// `layout` and `appearance` are kept as raw JSON objects; each field is
/// checked on its own when the snapshot is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub version: Value,
    pub layout: Map<String, Value>,
    pub appearance: Map<String, Value>,
}

impl Default for SnapshotDocument {
    fn default() -> Self {
        Self {
            version: Value::from(SNAPSHOT_VERSION),
            layout: Map::new(),
            appearance: Map::new(),
        }
    }
}

impl SnapshotDocument {
    /// Parse a document, tolerating malformed sections.
    ///
    /// Only a non-JSON or non-object document is an error; a `layout` or
    /// `appearance` that is not an object is treated as empty.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut root) = value else {
            return Err(SnapshotError::NotAnObject);
        };
        let section = |value: Option<Value>| match value {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Ok(Self {
            version: root.shift_remove("version").unwrap_or(Value::Null),
            layout: section(root.shift_remove("layout")),
            appearance: section(root.shift_remove("appearance")),
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn section(&self, section: Section) -> &Map<String, Value> {
        match section {
            Section::Layout => &self.layout,
            Section::Appearance => &self.appearance,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut Map<String, Value> {
        match section {
            Section::Layout => &mut self.layout,
            Section::Appearance => &mut self.appearance,
        }
    }
}

/// A decoded snapshot field, handed to [`SnapshotSink`]s after it has been
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotUpdate {
    /// Raw pages config object; receivers run the load-time migrations
    PagesConfig(Map<String, Value>),
    CardSettings(CardSettings),
    PageSettings(PageSettings),
    HiddenCards(Vec<String>),
    CustomNames(BTreeMap<String, String>),
    CustomIcons(BTreeMap<String, String>),
    GridColumns(f64),
    GridGap(f64),
    CardBorderRadius(f64),
    HeaderScale(f64),
    HeaderTitle(String),
    HeaderSettings(HeaderSettings),
    StatusPillsConfig(Vec<Value>),
    Theme(String),
    Language(String),
    InactivityTimeout(f64),
    BackgroundMode(String),
    BackgroundColor(String),
    BackgroundGradient(String),
    BackgroundImage(String),
}

/// Receives fields applied from a snapshot so in-memory state can follow
/// without a reload.
pub trait SnapshotSink {
    fn apply_update(&mut self, update: &SnapshotUpdate);
}

/// No receiver
impl SnapshotSink for () {
    fn apply_update(&mut self, _update: &SnapshotUpdate) {}
}

impl<T: SnapshotSink + ?Sized> SnapshotSink for &mut T {
    fn apply_update(&mut self, update: &SnapshotUpdate) {
        (**self).apply_update(update);
    }
}

impl<A: SnapshotSink, B: SnapshotSink> SnapshotSink for (A, B) {
    fn apply_update(&mut self, update: &SnapshotUpdate) {
        self.0.apply_update(update);
        self.1.apply_update(update);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Layout,
    Appearance,
}

/// How a field is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Json,
    Number,
    Text,
}

struct SnapshotField {
    section: Section,
    name: &'static str,
    key: &'static str,
    encoding: Encoding,
    decode: fn(&Value) -> Option<SnapshotUpdate>,
}

static FIELDS: [SnapshotField; 20] = [
    SnapshotField {
        section: Section::Layout,
        name: "pagesConfig",
        key: KEY_PAGES_CONFIG,
        encoding: Encoding::Json,
        decode: |v| v.as_object().cloned().map(SnapshotUpdate::PagesConfig),
    },
    SnapshotField {
        section: Section::Layout,
        name: "cardSettings",
        key: KEY_CARD_SETTINGS,
        encoding: Encoding::Json,
        decode: |v| {
            v.is_object()
                .then(|| SnapshotUpdate::CardSettings(settings_from_value(v.clone())))
        },
    },
    SnapshotField {
        section: Section::Layout,
        name: "pageSettings",
        key: KEY_PAGE_SETTINGS,
        encoding: Encoding::Json,
        decode: |v| {
            v.is_object()
                .then(|| SnapshotUpdate::PageSettings(settings_from_value(v.clone())))
        },
    },
    SnapshotField {
        section: Section::Layout,
        name: "hiddenCards",
        key: KEY_HIDDEN_CARDS,
        encoding: Encoding::Json,
        decode: |v| serde_json::from_value(v.clone()).ok().map(SnapshotUpdate::HiddenCards),
    },
    SnapshotField {
        section: Section::Layout,
        name: "customNames",
        key: KEY_CUSTOM_NAMES,
        encoding: Encoding::Json,
        decode: |v| serde_json::from_value(v.clone()).ok().map(SnapshotUpdate::CustomNames),
    },
    SnapshotField {
        section: Section::Layout,
        name: "customIcons",
        key: KEY_CUSTOM_ICONS,
        encoding: Encoding::Json,
        decode: |v| serde_json::from_value(v.clone()).ok().map(SnapshotUpdate::CustomIcons),
    },
    SnapshotField {
        section: Section::Layout,
        name: "gridColumns",
        key: KEY_GRID_COLUMNS,
        encoding: Encoding::Number,
        decode: |v| finite(v).map(SnapshotUpdate::GridColumns),
    },
    SnapshotField {
        section: Section::Layout,
        name: "gridGap",
        key: KEY_GRID_GAP,
        encoding: Encoding::Number,
        decode: |v| finite(v).and_then(usable_grid_gap).map(SnapshotUpdate::GridGap),
    },
    SnapshotField {
        section: Section::Layout,
        name: "cardBorderRadius",
        key: KEY_CARD_BORDER_RADIUS,
        encoding: Encoding::Number,
        decode: |v| finite(v).map(SnapshotUpdate::CardBorderRadius),
    },
    SnapshotField {
        section: Section::Layout,
        name: "headerScale",
        key: KEY_HEADER_SCALE,
        encoding: Encoding::Number,
        decode: |v| {
            finite(v)
                .and_then(usable_header_scale)
                .map(SnapshotUpdate::HeaderScale)
        },
    },
    SnapshotField {
        section: Section::Layout,
        name: "headerTitle",
        key: KEY_HEADER_TITLE,
        encoding: Encoding::Text,
        decode: |v| text(v).map(SnapshotUpdate::HeaderTitle),
    },
    SnapshotField {
        section: Section::Layout,
        name: "headerSettings",
        key: KEY_HEADER_SETTINGS,
        encoding: Encoding::Json,
        decode: |v| {
            if !v.is_object() {
                return None;
            }
            serde_json::from_value(v.clone()).ok().map(SnapshotUpdate::HeaderSettings)
        },
    },
    SnapshotField {
        section: Section::Layout,
        name: "statusPillsConfig",
        key: KEY_STATUS_PILLS_CONFIG,
        encoding: Encoding::Json,
        decode: |v| v.as_array().cloned().map(SnapshotUpdate::StatusPillsConfig),
    },
    SnapshotField {
        section: Section::Appearance,
        name: "theme",
        key: KEY_THEME,
        encoding: Encoding::Text,
        decode: |v| text(v).map(SnapshotUpdate::Theme),
    },
    SnapshotField {
        section: Section::Appearance,
        name: "language",
        key: KEY_LANGUAGE,
        encoding: Encoding::Text,
        decode: |v| text(v).map(SnapshotUpdate::Language),
    },
    SnapshotField {
        section: Section::Appearance,
        name: "inactivityTimeout",
        key: KEY_INACTIVITY_TIMEOUT,
        encoding: Encoding::Number,
        decode: |v| finite(v).map(SnapshotUpdate::InactivityTimeout),
    },
    SnapshotField {
        section: Section::Appearance,
        name: "bgMode",
        key: KEY_BG_MODE,
        encoding: Encoding::Text,
        decode: |v| text(v).map(SnapshotUpdate::BackgroundMode),
    },
    SnapshotField {
        section: Section::Appearance,
        name: "bgColor",
        key: KEY_BG_COLOR,
        encoding: Encoding::Text,
        decode: |v| text(v).map(SnapshotUpdate::BackgroundColor),
    },
    SnapshotField {
        section: Section::Appearance,
        name: "bgGradient",
        key: KEY_BG_GRADIENT,
        encoding: Encoding::Text,
        decode: |v| text(v).map(SnapshotUpdate::BackgroundGradient),
    },
    SnapshotField {
        section: Section::Appearance,
        name: "bgImage",
        key: KEY_BG_IMAGE,
        encoding: Encoding::Text,
        decode: |v| text(v).map(SnapshotUpdate::BackgroundImage),
    },
];

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// JSON number for a stored numeric string; integral values stay integers
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Persisted keys that a snapshot carries
pub fn snapshot_keys() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|field| field.key)
}

/// Build a snapshot from the persisted store.
///
/// Keys that are absent or hold undecodable values are left out, so
/// applying the result never overwrites them.
pub fn collect_snapshot(store: &ConfigStore) -> SnapshotDocument {
    let mut doc = SnapshotDocument::default();

    for field in &FIELDS {
        let value = match field.encoding {
            Encoding::Json => store.read_json_value(field.key),
            Encoding::Number => store.read_number_opt(field.key).map(number_value),
            Encoding::Text => store.read_string(field.key).map(Value::String),
        };
        let Some(value) = value else {
            continue;
        };
        if (field.decode)(&value).is_none() {
            warn!("Leaving malformed {} out of snapshot", field.key);
            continue;
        }
        doc.section_mut(field.section)
            .insert(field.name.to_string(), value);
    }

    debug!(
        "Collected snapshot with {} layout and {} appearance fields",
        doc.layout.len(),
        doc.appearance.len()
    );
    doc
}

/// Outcome of applying a snapshot
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ApplyReport {
    /// Fields accepted from the document
    pub applied: Vec<&'static str>,
    /// Fields present in the document but malformed
    pub skipped: Vec<&'static str>,
    /// Accepted fields whose store write failed
    pub failed_writes: Vec<&'static str>,
}

/// Apply a snapshot: persist every recognized, well-formed field and
/// forward it to `sink`.
///
/// Fields missing from the document are untouched. Values equal to what is
/// already stored are not rewritten, which leaves their stored bytes as
/// they were.
pub fn apply_snapshot(
    store: &ConfigStore,
    doc: &SnapshotDocument,
    sink: &mut dyn SnapshotSink,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    if doc.version != Value::from(SNAPSHOT_VERSION) {
        info!(
            "Applying snapshot version {} (current {}); unknown fields are ignored",
            doc.version, SNAPSHOT_VERSION
        );
    }

    for field in &FIELDS {
        let Some(value) = doc.section(field.section).get(field.name) else {
            continue;
        };
        let Some(update) = (field.decode)(value) else {
            warn!("Skipping malformed snapshot field {}", field.name);
            report.skipped.push(field.name);
            continue;
        };

        if let Err(e) = persist_field(store, field, value) {
            error!("Failed to save {} from snapshot: {}", field.key, e);
            report.failed_writes.push(field.name);
        }
        sink.apply_update(&update);
        report.applied.push(field.name);
    }

    info!(
        "Applied snapshot: {} field(s), {} skipped",
        report.applied.len(),
        report.skipped.len()
    );
    report
}

fn persist_field(
    store: &ConfigStore,
    field: &SnapshotField,
    value: &Value,
) -> Result<(), tunet_core::StoreError> {
    match field.encoding {
        Encoding::Json => {
            if store.read_json_value(field.key).as_ref() == Some(value) {
                return Ok(());
            }
            store.write_json(field.key, value)
        }
        Encoding::Number => {
            let Some(n) = finite(value) else {
                return Ok(());
            };
            if store.read_number_opt(field.key) == Some(n) {
                return Ok(());
            }
            store.write_number(field.key, n)
        }
        Encoding::Text => {
            let Some(s) = value.as_str() else {
                return Ok(());
            };
            if store.read_string(field.key).as_deref() == Some(s) {
                return Ok(());
            }
            store.write_string(field.key, s)
        }
    }
}
