use crate::errors::DbError;
use bson::{Bson, Document as BsonDocument};
use serde_json::{Map, Number, Value};

// Largest integer a double represents exactly; whole doubles below it render as JSON integers.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Convert an arbitrary JSON value into BSON. Integers that fit in 32 bits become `Int32`.
#[must_use]
pub fn json_to_bson(val: &Value) -> Bson {
    match val {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => number_to_bson(n),
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(obj) => Bson::Document(json_map_to_bson_document(obj)),
    }
}

fn number_to_bson(n: &Number) -> Bson {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32);
    }
    Bson::Double(n.as_f64().unwrap_or(f64::NAN))
}

#[must_use]
pub fn json_map_to_bson_document(obj: &Map<String, Value>) -> BsonDocument {
    obj.iter().map(|(k, v)| (k.clone(), json_to_bson(v))).collect()
}

/// Render BSON the way API clients expect to read it: plain numbers, RFC 3339 dates.
#[must_use]
pub fn bson_to_json(val: &Bson) -> Value {
    match val {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::from(*i),
        Bson::Int64(i) => Value::from(*i),
        Bson::Double(d) => double_to_json(*d),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(d) => document_to_json(d),
        Bson::DateTime(dt) => date_to_json(*dt),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        other => other.clone().into_relaxed_extjson(),
    }
}

// Same shape as JavaScript's `Date.prototype.toJSON`.
fn date_to_json(dt: bson::DateTime) -> Value {
    chrono::DateTime::from_timestamp_millis(dt.timestamp_millis()).map_or(Value::Null, |d| {
        Value::String(d.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    })
}

#[allow(clippy::cast_possible_truncation)]
fn double_to_json(d: f64) -> Value {
    if d.is_finite() && d.fract() == 0.0 && d.abs() <= MAX_SAFE_INTEGER {
        return Value::from(d as i64);
    }
    Number::from_f64(d).map_or(Value::Null, Value::Number)
}

#[must_use]
pub fn document_to_json(doc: &BsonDocument) -> Value {
    Value::Object(doc.iter().map(|(k, v)| (k.clone(), bson_to_json(v))).collect())
}

/// Parse a JSON string that must be a top-level object.
///
/// # Errors
/// Returns `DbError::Json` on malformed JSON and `DbError::QueryError` when the value is not an object.
pub fn parse_json_object(json: &str) -> Result<Map<String, Value>, DbError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(obj) => Ok(obj),
        other => Err(DbError::QueryError(format!("expected JSON object, got {other}"))),
    }
}
