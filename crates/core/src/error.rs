//! Storage error types

use thiserror::Error;

/// Errors raised by storage backends and the config store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is closed or could not be reached
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    /// Writing the value would exceed the backend's capacity
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, limit {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
