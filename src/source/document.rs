//! Firestore REST document codec.
//!
//! Firestore wraps every value in a type tag (`stringValue`,
//! `integerValue`, `mapValue`, ...). Records go through `serde_json::Value`
//! in both directions so the domain structs only need serde derives.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Number, Value};

use crate::error::{FieldOpsError, Result};

/// Encode a plain JSON value as a Firestore typed value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // int64 travels as a decimal string
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or(0.0) })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// Decode a Firestore typed value back to plain JSON.
pub fn decode_value(value: &Value) -> Result<Value> {
    let obj = value
        .as_object()
        .ok_or_else(|| FieldOpsError::Decode(format!("expected typed value, got {value}")))?;
    let (tag, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| FieldOpsError::Decode("empty typed value".to_string()))?;

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or(false))),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|i| Value::Number(i.into()))
                .ok_or_else(|| FieldOpsError::Decode(format!("bad integerValue {inner}")))
        }
        "doubleValue" => {
            let f = match inner {
                Value::Number(n) => n.as_f64(),
                // NaN / Infinity arrive as strings
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            // non-finite values have no JSON form; read them as 0.0
            Ok(f.and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| json!(0.0)))
        }
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Ok(inner.clone()),
        "geoPointValue" => Ok(json!({
            "lat": inner.get("latitude").and_then(Value::as_f64).unwrap_or(0.0),
            "lng": inner.get("longitude").and_then(Value::as_f64).unwrap_or(0.0),
        })),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect::<Result<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = inner.get("fields").and_then(Value::as_object);
            Ok(Value::Object(match fields {
                Some(f) => decode_fields(f)?,
                None => Map::new(),
            }))
        }
        other => Err(FieldOpsError::Decode(format!("unknown value type {other}"))),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

/// Last segment of a document resource name:
/// `projects/p/databases/(default)/documents/sites/abc` → `abc`.
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Decode a REST document into a record, taking `id` from the resource name.
pub fn decode_document<T: DeserializeOwned>(doc: &Value) -> Result<T> {
    let mut fields = match doc.get("fields").and_then(Value::as_object) {
        Some(f) => decode_fields(f)?,
        None => Map::new(),
    };
    if let Some(name) = doc.get("name").and_then(Value::as_str) {
        fields.insert("id".to_string(), Value::String(document_id(name).to_string()));
    }
    serde_json::from_value(Value::Object(fields)).map_err(FieldOpsError::from)
}

/// Encode a record's fields for a write. `id` is never written into the
/// document body; the document name carries it.
///
/// Returns the encoded fields plus the top-level field paths present, for
/// use as an update mask.
pub fn encode_record<T: Serialize>(record: &T) -> Result<(Map<String, Value>, Vec<String>)> {
    let value = serde_json::to_value(record)?;
    let Value::Object(mut map) = value else {
        return Err(FieldOpsError::Decode("record is not an object".to_string()));
    };
    map.remove("id");
    let mask: Vec<String> = map.keys().cloned().collect();
    Ok((encode_fields(&map), mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScheduleEntry, Site, SiteStatus, TaskStatus};

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode_value(&json!("a")), json!({ "stringValue": "a" }));
        assert_eq!(encode_value(&json!(3)), json!({ "integerValue": "3" }));
        assert_eq!(encode_value(&json!(45.5152)), json!({ "doubleValue": 45.5152 }));
        assert_eq!(encode_value(&json!(true)), json!({ "booleanValue": true }));
        assert_eq!(encode_value(&Value::Null), json!({ "nullValue": null }));
    }

    #[test]
    fn test_decode_site_document() {
        let doc = json!({
            "name": "projects/crew/databases/(default)/documents/sites/abc123",
            "fields": {
                "name": { "stringValue": "Lakeside Villas" },
                "status": { "stringValue": "at_risk" },
                "activeTasks": { "integerValue": "4" },
                "serviceFrequency": { "stringValue": "Bi-weekly" },
                "coordinates": { "mapValue": { "fields": {
                    "lat": { "doubleValue": 47.6062 },
                    "lng": { "integerValue": "-122" }
                } } },
                "tags": { "arrayValue": { "values": [ { "stringValue": "hoa" } ] } }
            }
        });
        let site: Site = decode_document(&doc).unwrap();
        assert_eq!(site.id, "abc123");
        assert_eq!(site.name, "Lakeside Villas");
        assert_eq!(site.status, SiteStatus::AtRisk);
        assert_eq!(site.active_tasks, 4);
        assert_eq!(site.coordinates.lat, 47.6062);
        assert_eq!(site.coordinates.lng, -122.0);
        assert_eq!(site.tags, vec!["hoa".to_string()]);
        // absent fields fall back to defaults
        assert_eq!(site.address, "");
    }

    #[test]
    fn test_decode_geo_point_as_coordinates() {
        let value = json!({ "geoPointValue": { "latitude": 45.5, "longitude": -122.6 } });
        assert_eq!(decode_value(&value).unwrap(), json!({ "lat": 45.5, "lng": -122.6 }));
    }

    #[test]
    fn test_non_finite_double_reads_as_zero() {
        assert_eq!(decode_value(&json!({ "doubleValue": "NaN" })).unwrap(), json!(0.0));
        assert_eq!(decode_value(&json!({ "doubleValue": "-Infinity" })).unwrap(), json!(0.0));

        let doc = json!({
            "name": "projects/crew/databases/(default)/documents/sites/s1",
            "fields": { "coordinates": { "mapValue": { "fields": {
                "lat": { "doubleValue": "Infinity" },
                "lng": { "doubleValue": -122.6 }
            } } } }
        });
        let site: Site = decode_document(&doc).unwrap();
        assert_eq!(site.coordinates.lat, 0.0);
        assert_eq!(site.coordinates.lng, -122.6);
    }

    #[test]
    fn test_decode_empty_array_and_map() {
        assert_eq!(decode_value(&json!({ "arrayValue": {} })).unwrap(), json!([]));
        assert_eq!(decode_value(&json!({ "mapValue": {} })).unwrap(), json!({}));
    }

    #[test]
    fn test_decode_unknown_tag_is_error() {
        assert!(decode_value(&json!({ "vectorValue": {} })).is_err());
    }

    #[test]
    fn test_encode_record_drops_id_and_builds_mask() {
        let entry = ScheduleEntry {
            day: "2024-12-31".to_string(),
            site_id: "site-1".to_string(),
            tasks: vec!["task-1".to_string()],
            ..Default::default()
        };
        let (fields, mask) = encode_record(&entry).unwrap();
        assert_eq!(fields["day"], json!({ "stringValue": "2024-12-31" }));
        assert_eq!(
            fields["tasks"],
            json!({ "arrayValue": { "values": [ { "stringValue": "task-1" } ] } })
        );
        // optional fields that are None are not part of the mask
        let mut mask = mask;
        mask.sort();
        assert_eq!(mask, vec!["day", "siteId", "tasks"]);
    }

    #[test]
    fn test_encode_record_enum_as_string() {
        let (fields, _) = encode_record(&json!({ "id": "t1", "status": TaskStatus::Done })).unwrap();
        assert!(!fields.contains_key("id"));
        assert_eq!(fields["status"], json!({ "stringValue": "done" }));
    }
}
