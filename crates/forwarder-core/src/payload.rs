//! Raw webhook payload decoding and lenient field extraction.
//!
//! Optional fields never fail a request: a value of the wrong JSON type is
//! treated exactly like a missing one and the caller's default applies.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};

use crate::error::ValidationError;

/// The decoded request body, exactly as the sender shaped it.
pub type RawPayload = Map<String, Value>;

/// Decode a request body into a [`RawPayload`].
///
/// `{}` is accepted; `null` and non-object JSON are rejected.
pub fn decode_payload(bytes: &[u8]) -> Result<RawPayload, ValidationError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ValidationError::InvalidJson(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err(ValidationError::EmptyBody),
        _ => Err(ValidationError::MalformedPayload),
    }
}

/// The string at `key`, or `default` when absent or not a string.
pub fn string_or_default(raw: &RawPayload, key: &str, default: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// The string at `key` when present, a string, and non-empty.
pub fn non_empty_string<'a>(raw: &'a RawPayload, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// The number at `key` truncated toward zero, or `default` when absent, not a
/// number, or outside `range`.
pub fn int_in_range_or_default(
    raw: &RawPayload,
    key: &str,
    range: RangeInclusive<i64>,
    default: i64,
) -> i64 {
    raw.get(key)
        .and_then(truncated_int)
        .filter(|n| range.contains(n))
        .unwrap_or(default)
}

/// The object at `key`, or an empty map when absent or not an object.
pub fn object_or_empty(raw: &RawPayload, key: &str) -> Map<String, Value> {
    raw.get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn truncated_int(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if value.is_u64() {
        // Too large for i64, so certainly out of any priority range.
        return None;
    }
    value
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}
