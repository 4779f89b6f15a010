//! Persisted settings: storage, migrations, snapshots and preferences

pub mod connection;
pub mod file_backend;
pub mod keys;
pub mod migration;
pub mod preferences;
pub mod snapshot;

pub use connection::{validate_url, ConnectionConfig, ConnectionError};
pub use file_backend::FileBackend;
pub use keys::{owner_of, KeyOwner};
pub use preferences::Preferences;
pub use snapshot::{apply_snapshot, collect_snapshot, SnapshotDocument, SnapshotSink};
