//! Reply extraction from arbitrary webhook payloads
//!
//! Workflow engines, low-code AI builders and hand-written servers all wrap
//! their answer differently: `{"output": "..."}`, `[{"json": {"text": "..."}}]`,
//! `{"data": {"message": {"content": "..."}}}` and so on. [`extract_reply`]
//! walks the payload depth-first and returns the first string that looks like
//! the reply, falling back to the serialized payload when nothing does.
//!
//! The search order is part of the observable contract with existing
//! backends. Changing [`PRIORITY_KEYS`] or the order of the passes changes
//! which string users see.

use serde_json::Value;

/// Keys conventionally used to carry the reply, in the order they are tried.
pub const PRIORITY_KEYS: &[&str] = &[
    "reply",
    "output",
    "message",
    "text",
    "response",
    "content",
    "answer",
    "result",
    "data",
    "fulfillmentText",
];

/// Deepest nesting level searched. The root value is level 0.
pub const DEFAULT_MAX_DEPTH: usize = 6;

/// Extract the reply string from a parsed payload using [`DEFAULT_MAX_DEPTH`].
pub fn extract_reply(value: &Value) -> String {
    extract_reply_with_depth(value, DEFAULT_MAX_DEPTH)
}

/// Extract the reply string, searching at most `max_depth` levels deep.
///
/// Always returns a non-empty string. When no branch yields one, the whole
/// value is returned as compact JSON, so a blank top-level string comes back
/// quoted.
pub fn extract_reply_with_depth(value: &Value, max_depth: usize) -> String {
    match find_reply(value, 0, max_depth) {
        Some(found) => found.to_string(),
        None => value.to_string(),
    }
}

/// Search one branch of the payload.
///
/// Returns `None` for branches deeper than `max_depth`, for null, booleans,
/// numbers and blank strings, and for containers where no pass finds a string.
pub fn find_reply(value: &Value, depth: usize, max_depth: usize) -> Option<&str> {
    if depth > max_depth {
        return None;
    }

    match value {
        Value::String(s) => non_blank(s),
        Value::Array(items) => items
            .iter()
            .find_map(|item| find_reply(item, depth + 1, max_depth)),
        Value::Object(map) => {
            // Pass 1: well-known reply keys, in priority order
            for key in PRIORITY_KEYS {
                match map.get(*key) {
                    Some(Value::Null) | None => continue,
                    Some(v) => {
                        if let Some(found) = find_reply(v, depth + 1, max_depth) {
                            return Some(found);
                        }
                    }
                }
            }

            // Pass 2: any direct string field, in key order
            if let Some(found) = map.values().find_map(|v| v.as_str().and_then(non_blank)) {
                return Some(found);
            }

            // Pass 3: descend into nested containers, in key order
            map.values()
                .filter(|v| v.is_object() || v.is_array())
                .find_map(|v| find_reply(v, depth + 1, max_depth))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}

fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}
