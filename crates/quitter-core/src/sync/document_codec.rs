//! Conversion between plain JSON and Firestore typed values.
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type (`{"integerValue": "5"}`, `{"mapValue": {"fields": {...}}}`, ...).

use serde_json::{Map, Value};

use crate::error::StoreError;

/// Encode a JSON value as a Firestore typed value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => serde_json::json!({ "nullValue": null }),
        Value::Bool(b) => serde_json::json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                serde_json::json!({ "integerValue": u.to_string() })
            } else {
                serde_json::json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => serde_json::json!({ "stringValue": s }),
        Value::Array(items) => serde_json::json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => serde_json::json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode every entry of a JSON object.
pub fn encode_fields(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

/// Build a document body (`{"fields": {...}}`) from a JSON object.
pub fn encode_document(value: &Value) -> Result<Value, StoreError> {
    let map = value
        .as_object()
        .ok_or_else(|| StoreError::MalformedDocument("document body must be an object".into()))?;
    Ok(serde_json::json!({ "fields": encode_fields(map) }))
}

/// Decode a Firestore typed value back into plain JSON.
pub fn decode_value(typed: &Value) -> Result<Value, StoreError> {
    let obj = typed
        .as_object()
        .filter(|o| o.len() == 1)
        .ok_or_else(|| StoreError::MalformedDocument(format!("not a typed value: {typed}")))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::MalformedDocument("empty typed value".into()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| malformed(kind, inner)),
        "integerValue" => {
            // Firestore sends int64 as a decimal string; accept bare numbers too.
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed.map(Value::from).ok_or_else(|| malformed(kind, inner))
        }
        "doubleValue" => inner
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| malformed(kind, inner)),
        "stringValue" | "timestampValue" | "referenceValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| malformed(kind, inner)),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
                Some(other) => return Err(malformed(kind, other)),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => decode_fields(inner.get("fields")),
        other => Err(StoreError::MalformedDocument(format!(
            "unsupported value type: {other}"
        ))),
    }
}

/// Decode a document resource (`{"name": ..., "fields": {...}}`) into a JSON object.
pub fn decode_document(doc: &Value) -> Result<Value, StoreError> {
    decode_fields(doc.get("fields"))
}

fn decode_fields(fields: Option<&Value>) -> Result<Value, StoreError> {
    match fields {
        None => Ok(Value::Object(Map::new())),
        Some(Value::Object(map)) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), decode_value(v)?);
            }
            Ok(Value::Object(out))
        }
        Some(other) => Err(StoreError::MalformedDocument(format!(
            "fields must be an object, got {other}"
        ))),
    }
}

fn malformed(kind: &str, inner: &Value) -> StoreError {
    StoreError::MalformedDocument(format!("bad {kind}: {inner}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_streak_document() {
        let doc = encode_document(&json!({
            "userId": "u1",
            "currentStreak": 12,
            "startDate": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(doc["fields"]["userId"], json!({"stringValue": "u1"}));
        assert_eq!(doc["fields"]["currentStreak"], json!({"integerValue": "12"}));
        assert_eq!(
            doc["fields"]["startDate"],
            json!({"stringValue": "2024-01-01T00:00:00Z"})
        );
    }

    #[test]
    fn decodes_timestamps_and_nested_values() {
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/streaks/u1",
            "fields": {
                "lastCheckDate": {"timestampValue": "2024-01-02T03:04:05Z"},
                "relapses": {"integerValue": "3"},
                "ratio": {"doubleValue": 0.5},
                "flags": {"arrayValue": {"values": [{"booleanValue": true}]}},
                "meta": {"mapValue": {"fields": {"note": {"nullValue": null}}}},
                "empty": {"arrayValue": {}}
            }
        });
        let out = decode_document(&doc).unwrap();
        assert_eq!(out["lastCheckDate"], "2024-01-02T03:04:05Z");
        assert_eq!(out["relapses"], 3);
        assert_eq!(out["ratio"], 0.5);
        assert_eq!(out["flags"], json!([true]));
        assert_eq!(out["meta"], json!({"note": null}));
        assert_eq!(out["empty"], json!([]));
    }

    #[test]
    fn rejects_unknown_and_malformed_values() {
        assert!(decode_value(&json!({"geoPointValue": {}})).is_err());
        assert!(decode_value(&json!({"integerValue": "twelve"})).is_err());
        assert!(decode_value(&json!("bare")).is_err());
        assert!(encode_document(&json!([1, 2])).is_err());
    }
}
