//! tunet-core: Persisted configuration store for the Tunet dashboard.
//!
//! This crate contains the storage backend trait, the in-memory backend,
//! the typed [`ConfigStore`] façade used by every component that persists
//! settings, and the stable key names shared with existing stored data.

pub mod constants;
mod backend;
mod error;
pub mod store;

pub use backend::{MemoryBackend, StorageBackend};
pub use error::StoreError;
pub use store::ConfigStore;
