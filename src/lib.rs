//! Tunet: a wall-mounted Home Assistant dashboard
//!
//! This library provides the dashboard's model layer:
//! - Page and card layout with write-through persistence
//! - Preferences, connection settings and snapshot export/import
//! - Responsive grid resolution
//! - Entity sources and person tracker heuristics

pub mod config;
pub mod core;
pub mod sources;
pub mod ui;

// Re-export commonly used types
pub use config::{Preferences, SnapshotDocument};
pub use core::{AddCardRequest, PageManager};
pub use tunet_core::ConfigStore;
