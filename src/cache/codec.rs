//! Value Codec Module
//!
//! Maps logical JSON values onto the nullable text column of the backing table.
//!
//! Three logical "no text" states share one nullable column: stored `null` is a
//! SQL NULL, logical `true` is the reserved [`TRUE_SENTINEL`](crate::cache::TRUE_SENTINEL)
//! token, and everything else is JSON text. Decoding applies a fixed precedence
//! (NULL marker, then sentinel, then JSON parse, then raw-text fallback) that
//! must not be reordered: it is part of the on-disk contract.

use serde_json::Value;

use crate::cache::TRUE_SENTINEL;
use crate::error::Result;

// == Encode ==
/// Encodes a logical value into its storage representation.
///
/// # Returns
/// - `None` for logical `null` (stored as SQL NULL)
/// - The sentinel token for logical `true`
/// - JSON text for any other value (including `false`)
pub(crate) fn encode_value(value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(true) => Ok(Some(TRUE_SENTINEL.to_string())),
        other => Ok(Some(serde_json::to_string(other)?)),
    }
}

// == Decode ==
/// Decodes a storage representation back into a logical value.
///
/// Malformed text (rows written by hand, or by older tooling) falls back to the
/// raw text unchanged rather than raising an error.
pub(crate) fn decode_value(encoded: Option<String>) -> Value {
    let Some(text) = encoded else {
        return Value::Null;
    };
    if text == TRUE_SENTINEL {
        return Value::Bool(true);
    }
    match serde_json::from_str(&text) {
        Ok(parsed) => parsed,
        Err(_) => Value::String(text),
    }
}
