//! Shared response envelope helpers for API handlers.
//!
//! All success responses use an `{ "ok": true, ... }` envelope matching
//! the storefront and portal clients' expectations. Use [`ok_with`]
//! instead of ad-hoc `serde_json::json!` so the envelope stays consistent.

use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// Build `{ "ok": true, "<key>": <value> }`.
pub fn ok_with<T: Serialize>(key: &str, value: T) -> Json<Value> {
    let mut map = serde_json::Map::with_capacity(2);
    map.insert("ok".to_string(), Value::Bool(true));
    map.insert(
        key.to_string(),
        serde_json::to_value(value).unwrap_or(Value::Null),
    );
    Json(Value::Object(map))
}

/// Build `{ "ok": true }` plus every entry of the given object.
///
/// Panics in debug builds if `value` does not serialize to a JSON object;
/// handlers only pass struct-shaped payloads here.
pub fn ok_merged<T: Serialize>(value: T) -> Json<Value> {
    let mut map = serde_json::Map::new();
    map.insert("ok".to_string(), Value::Bool(true));
    if let Ok(Value::Object(fields)) = serde_json::to_value(value) {
        map.extend(fields);
    } else {
        debug_assert!(false, "ok_merged expects an object-shaped payload");
    }
    Json(Value::Object(map))
}
