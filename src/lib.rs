//! kvcache - A lightweight key-value cache with TTL expiration
//!
//! Stores JSON values under string keys in a SQLite backing table, either
//! transient (in-memory) or file-backed, with lazy TTL expiration on read.
//!
//! # Example
//! ```
//! use kvcache::Cache;
//! use serde_json::json;
//!
//! let cache = Cache::memory().unwrap();
//! cache.put("greeting", &json!({"hello": "world"}), Some(60_000));
//! assert_eq!(cache.get("greeting"), json!({"hello": "world"}));
//! cache.close();
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, TRUE_SENTINEL};
pub use config::Config;
pub use error::{CacheError, Result};
