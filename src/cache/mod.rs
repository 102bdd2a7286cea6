//! Cache Module
//!
//! Provides key-value caching with lazy TTL expiration on top of a SQLite
//! backing table (transient or file-backed).

mod codec;
mod entry;
mod store;


// Re-export public types
pub use store::Cache;

// == Public Constants ==
/// Reserved encoded-value marker for logical `true`.
///
/// A JSON-serialized value is never exactly this token (serialized strings carry
/// quotes), so it cannot collide with anything written through `put`. Rows edited
/// by hand to contain this literal will decode as `true`; that precedence is part
/// of the documented on-disk contract.
pub const TRUE_SENTINEL: &str = "__TRUE__";
