//! Error types for the cache store
//!
//! Provides unified error handling using thiserror.
//!
//! Only construction is expected to surface an error to callers; steady-state
//! operations swallow storage failures and report them through their boolean
//! return values instead.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing database could not be opened or created
    #[error("Failed to open cache store at {}: {source}", path.display())]
    Open {
        /// Location of the backing file (`:memory:` for transient stores)
        path: PathBuf,
        /// Underlying SQLite error
        source: rusqlite::Error,
    },

    /// A statement against the backing database failed
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A value could not be serialized for storage
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache store.
pub type Result<T> = std::result::Result<T, CacheError>;
