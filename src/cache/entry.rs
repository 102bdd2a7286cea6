//! Cache Entry Module
//!
//! Defines the row-level representation of a stored entry with TTL support.

use chrono::Utc;

// == Stored Entry ==
/// A single backing-table row: encoded value plus optional absolute expiry.
///
/// `value` mirrors the nullable `value` column: `None` is the stored-null
/// marker, distinct from "row absent". `expires_at` mirrors the nullable `ttl`
/// column in epoch milliseconds; `None` means the entry never expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredEntry {
    /// Encoded value column (NULL = stored null)
    pub value: Option<String>,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<i64>,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates a new entry from an encoded value and an optional TTL.
    ///
    /// # Arguments
    /// * `value` - Encoded value column content
    /// * `ttl_ms` - Optional TTL in milliseconds, converted to an absolute expiry
    pub fn new(value: Option<String>, ttl_ms: Option<u64>) -> Self {
        let expires_at = ttl_ms.map(|ttl| current_timestamp_ms() + ttl as i64);
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired when the current time is greater
    /// than or equal to the expiration time, so a TTL of zero expires immediately.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub(crate) fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}
