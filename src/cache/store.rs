//! Cache Store Module
//!
//! Main cache engine wrapping a SQLite backing table with lazy TTL expiration.
//!
//! Every operation is a single synchronous statement against the connection.
//! Expired rows are removed only when a read touches them (or by an explicit
//! [`Cache::purge_expired`] call); there is no background sweeper.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::codec::{decode_value, encode_value};
use crate::cache::entry::{current_timestamp_ms, StoredEntry};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Backing table schema. Idempotent, safe against a pre-populated file.
///
/// Column names and nullability are the on-disk contract: `value` NULL is the
/// stored-null marker, `ttl` NULL means the entry never expires.
const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache (
    key TEXT PRIMARY KEY,
    value TEXT,
    ttl INTEGER
)";

// == Cache Store ==
/// Key-value cache with optional TTL expiration and optional file persistence.
///
/// Steady-state operations never return an error: storage failures are swallowed
/// and reported through boolean return values, decode problems fall back to raw
/// text. Only construction can fail.
#[derive(Debug)]
pub struct Cache {
    /// Backing store handle (transient or file-backed)
    conn: Connection,
}

impl Cache {
    // == Constructors ==
    /// Creates a new Cache from the given configuration.
    ///
    /// Transient mode (`persistent == false`) never touches the file system.
    /// Persistent mode opens the configured path, creating the file if absent;
    /// two instances opened against the same path observe each other's
    /// committed data across close/reopen.
    ///
    /// # Errors
    /// Returns [`CacheError::Open`] if the backing database cannot be opened or
    /// its schema cannot be created. This is the only operation that surfaces
    /// an error to the caller.
    pub fn new(config: Config) -> Result<Self> {
        let (conn, path) = if config.persistent {
            (Connection::open(&config.path), config.path)
        } else {
            (Connection::open_in_memory(), Path::new(":memory:").to_path_buf())
        };

        let conn = conn.map_err(|source| CacheError::Open {
            path: path.clone(),
            source,
        })?;

        conn.execute(SCHEMA, [])
            .map_err(|source| CacheError::Open { path, source })?;

        Ok(Self { conn })
    }

    /// Creates a transient cache with no file identity.
    pub fn memory() -> Result<Self> {
        Self::new(Config::default())
    }

    /// Creates a file-backed cache at the given path, created if absent.
    pub fn persistent<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(Config {
            persistent: true,
            path: path.as_ref().to_path_buf(),
        })
    }

    // == Put ==
    /// Stores a value under a key with optional TTL, replacing any prior entry.
    ///
    /// Logical `true` and `null` use dedicated storage markers; every other
    /// value is stored as JSON text. With `ttl_ms` absent the entry never
    /// expires.
    ///
    /// # Arguments
    /// * `key` - The key to store under
    /// * `value` - The value to store
    /// * `ttl_ms` - Optional TTL in milliseconds
    ///
    /// # Returns
    /// `true` on commit, `false` if the underlying write failed (the failure is
    /// logged and swallowed, never raised).
    pub fn put(&self, key: &str, value: &Value, ttl_ms: Option<u64>) -> bool {
        match self.try_put(key, value, ttl_ms) {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "put failed");
                false
            }
        }
    }

    fn try_put(&self, key: &str, value: &Value, ttl_ms: Option<u64>) -> Result<()> {
        let entry = StoredEntry::new(encode_value(value)?, ttl_ms);
        self.conn.execute(
            "INSERT OR REPLACE INTO cache (key, value, ttl) VALUES (?1, ?2, ?3)",
            params![key, entry.value, entry.expires_at],
        )?;
        Ok(())
    }

    // == Get ==
    /// Retrieves the value stored under a key.
    ///
    /// Returns `Value::Null` when the key is absent, expired, or was stored as
    /// `null` - the three cases are observably identical here; callers that
    /// need to distinguish absence should use [`Cache::has_key`]. A
    /// found-but-expired row is deleted as a side effect.
    pub fn get(&self, key: &str) -> Value {
        match self.try_get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "get failed");
                Value::Null
            }
        }
    }

    fn try_get(&self, key: &str) -> Result<Value> {
        match self.load_live(key)? {
            Some(entry) => Ok(decode_value(entry.value)),
            None => Ok(Value::Null),
        }
    }

    // == Has Key ==
    /// Returns whether a key exists and is not expired.
    ///
    /// Existence-only check, independent of what was stored: a stored `null`
    /// still reports `true` here. Shares the lazy cleanup side effect with
    /// [`Cache::get`].
    pub fn has_key(&self, key: &str) -> bool {
        match self.load_live(key) {
            Ok(entry) => entry.is_some(),
            Err(err) => {
                warn!(key, error = %err, "has_key failed");
                false
            }
        }
    }

    /// Looks up a row and applies lazy expiration: a found-but-expired row is
    /// deleted and reported as absent.
    fn load_live(&self, key: &str) -> Result<Option<StoredEntry>> {
        let row = self
            .conn
            .query_row("SELECT value, ttl FROM cache WHERE key = ?1", [key], |row| {
                Ok(StoredEntry {
                    value: row.get(0)?,
                    expires_at: row.get(1)?,
                })
            })
            .optional()?;

        match row {
            Some(entry) if entry.is_expired() => {
                debug!(key, "removing expired entry");
                self.conn
                    .execute("DELETE FROM cache WHERE key = ?1", [key])?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    // == Delete ==
    /// Removes the entry under a key, if present.
    ///
    /// Idempotent: deleting an absent key is not an error and still returns
    /// `true`. Returns `false` only when the underlying delete failed (logged
    /// and swallowed).
    pub fn delete(&self, key: &str) -> bool {
        match self
            .conn
            .execute("DELETE FROM cache WHERE key = ?1", [key])
        {
            Ok(_) => true,
            Err(err) => {
                warn!(key, error = %err, "delete failed");
                false
            }
        }
    }

    // == Clear ==
    /// Removes all entries unconditionally.
    ///
    /// Best effort: any underlying failure is logged and swallowed with no
    /// observable error signal.
    pub fn clear(&self) {
        if let Err(err) = self.conn.execute("DELETE FROM cache", []) {
            warn!(error = %err, "clear failed");
        }
    }

    // == Purge Expired ==
    /// Removes all expired entries in one statement.
    ///
    /// Expired rows otherwise accumulate until a read touches them; this is the
    /// explicit, caller-driven sweep. Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        match self.conn.execute(
            "DELETE FROM cache WHERE ttl IS NOT NULL AND ttl <= ?1",
            params![current_timestamp_ms()],
        ) {
            Ok(removed) => removed,
            Err(err) => {
                warn!(error = %err, "purge_expired failed");
                0
            }
        }
    }

    // == Length ==
    /// Returns the current number of rows, including expired rows not yet swept.
    pub fn len(&self) -> usize {
        self.conn
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get::<_, i64>(0))
            .map(|count| count as usize)
            .unwrap_or(0)
    }

    // == Is Empty ==
    /// Returns true if the cache holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Close ==
    /// Releases the backing store handle.
    ///
    /// Consuming `self` makes a second close unrepresentable. Close failures
    /// are logged and swallowed; safe on transient stores with no special
    /// handling.
    pub fn close(self) {
        if let Err((_conn, err)) = self.conn.close() {
            warn!(error = %err, "close failed");
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TRUE_SENTINEL;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_store_new() {
        let cache = Cache::memory().unwrap();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_and_get_string() {
        let cache = Cache::memory().unwrap();

        assert!(cache.put("key1", &json!("value1"), None));
        assert_eq!(cache.get("key1"), json!("value1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_and_get_number() {
        let cache = Cache::memory().unwrap();

        assert!(cache.put("n", &json!(42), None));
        assert_eq!(cache.get("n"), json!(42));
    }

    #[test]
    fn test_put_and_get_object() {
        let cache = Cache::memory().unwrap();
        let value = json!({"nested": {"list": [1, 2, 3]}, "flag": false});

        assert!(cache.put("obj", &value, None));
        assert_eq!(cache.get("obj"), value);
    }

    #[test]
    fn test_put_and_get_array() {
        let cache = Cache::memory().unwrap();

        assert!(cache.put("arr", &json!(["a", "b", 3]), None));
        assert_eq!(cache.get("arr"), json!(["a", "b", 3]));
    }

    #[test]
    fn test_put_and_get_false() {
        let cache = Cache::memory().unwrap();

        assert!(cache.put("f", &json!(false), None));
        assert_eq!(cache.get("f"), json!(false));
    }

    #[test]
    fn test_put_and_get_true() {
        let cache = Cache::memory().unwrap();

        assert!(cache.put("t", &json!(true), None));
        assert_eq!(cache.get("t"), json!(true));
    }

    #[test]
    fn test_put_and_get_null() {
        let cache = Cache::memory().unwrap();

        assert!(cache.put("nothing", &Value::Null, None));
        assert_eq!(cache.get("nothing"), Value::Null);
        // Stored null is indistinguishable from absence through get alone
        assert!(cache.has_key("nothing"));
    }

    #[test]
    fn test_get_nonexistent_is_null() {
        let cache = Cache::memory().unwrap();

        assert_eq!(cache.get("missing"), Value::Null);
        assert!(!cache.has_key("missing"));
    }

    #[test]
    fn test_overwrite_replaces_value_and_ttl() {
        let cache = Cache::memory().unwrap();

        cache.put("key1", &json!("old"), Some(50));
        cache.put("key1", &json!("new"), None);

        sleep(Duration::from_millis(60));

        // Overwrite dropped the TTL, so the entry must still be live
        assert_eq!(cache.get("key1"), json!("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_expiration() {
        let cache = Cache::memory().unwrap();

        cache.put("key1", &json!("value1"), Some(50));
        assert_eq!(cache.get("key1"), json!("value1"));
        assert!(cache.has_key("key1"));

        sleep(Duration::from_millis(60));

        assert_eq!(cache.get("key1"), Value::Null);
        assert!(!cache.has_key("key1"));
    }

    #[test]
    fn test_get_removes_expired_row() {
        let cache = Cache::memory().unwrap();

        cache.put("key1", &json!("value1"), Some(50));
        sleep(Duration::from_millis(60));

        // Expired row persists in storage until touched
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("key1"), Value::Null);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_has_key_removes_expired_row() {
        let cache = Cache::memory().unwrap();

        cache.put("key1", &json!("value1"), Some(50));
        sleep(Duration::from_millis(60));

        assert!(!cache.has_key("key1"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let cache = Cache::memory().unwrap();

        cache.put("key1", &json!("value1"), None);
        sleep(Duration::from_millis(80));

        assert_eq!(cache.get("key1"), json!("value1"));
        assert!(cache.has_key("key1"));
    }

    #[test]
    fn test_delete() {
        let cache = Cache::memory().unwrap();

        cache.put("key1", &json!("value1"), None);
        assert!(cache.delete("key1"));

        assert_eq!(cache.get("key1"), Value::Null);
        assert!(!cache.has_key("key1"));
    }

    #[test]
    fn test_delete_nonexistent_is_idempotent() {
        let cache = Cache::memory().unwrap();

        assert!(cache.delete("missing"));
    }

    #[test]
    fn test_clear() {
        let cache = Cache::memory().unwrap();

        cache.put("key1", &json!("v1"), None);
        cache.put("key2", &json!("v2"), None);
        cache.put("key3", &json!("v3"), Some(60_000));

        cache.clear();

        assert!(cache.is_empty());
        assert!(!cache.has_key("key1"));
        assert!(!cache.has_key("key2"));
        assert!(!cache.has_key("key3"));
    }

    #[test]
    fn test_close_on_transient_store() {
        let cache = Cache::memory().unwrap();
        cache.put("key1", &json!("v1"), None);
        cache.close();
    }

    #[test]
    fn test_purge_expired() {
        let cache = Cache::memory().unwrap();

        cache.put("soon", &json!("v1"), Some(50));
        cache.put("later", &json!("v2"), Some(60_000));
        cache.put("never", &json!("v3"), None);

        sleep(Duration::from_millis(60));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 2);
        assert!(cache.has_key("later"));
        assert!(cache.has_key("never"));
    }

    #[test]
    fn test_malformed_row_decodes_to_raw_text() {
        let cache = Cache::memory().unwrap();

        // Simulate a legacy/hand-edited row that is not valid JSON
        cache
            .conn
            .execute(
                "INSERT INTO cache (key, value, ttl) VALUES (?1, ?2, NULL)",
                params!["legacy", "{broken json"],
            )
            .unwrap();

        assert_eq!(cache.get("legacy"), json!("{broken json"));
    }

    #[test]
    fn test_hand_inserted_sentinel_decodes_as_true() {
        let cache = Cache::memory().unwrap();

        // Cannot happen through put, but direct table edits hit the sentinel
        // branch before the JSON parse; that precedence is the contract.
        cache
            .conn
            .execute(
                "INSERT INTO cache (key, value, ttl) VALUES (?1, ?2, NULL)",
                params!["edited", TRUE_SENTINEL],
            )
            .unwrap();

        assert_eq!(cache.get("edited"), json!(true));
    }

    #[test]
    fn test_sentinel_shaped_string_survives_roundtrip() {
        let cache = Cache::memory().unwrap();

        cache.put("tricky", &json!("__TRUE__"), None);
        assert_eq!(cache.get("tricky"), json!("__TRUE__"));
    }
}
