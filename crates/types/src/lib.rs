//! tunet-types: Shared data types for the Tunet dashboard.
//!
//! This crate contains pure data types (page layouts, card settings, header
//! and background preferences, entity state) shared by the storage core and
//! the application crate. Nothing here touches storage; the types only
//! describe the shapes that are persisted as JSON.

pub mod background;
pub mod card;
pub mod entity;
pub mod header;
pub mod page_settings;
pub mod pages;

// Re-export commonly used types at the crate root for convenience
pub use background::{BackgroundConfig, BackgroundMode, BackgroundPayload};
pub use card::{
    settings_key, CardConfig, CardKind, CardSettings, CardSize, SettingsBag, SpacerCardConfig,
    SpacerVariant,
};
pub use entity::{EntityMap, EntityState};
pub use header::{HeaderFont, HeaderSettings};
pub use page_settings::{PageOptions, PageSettings};
pub use pages::PagesConfig;
