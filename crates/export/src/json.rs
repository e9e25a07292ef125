//! JSON encoding and decoding, driven by the schema.

use crate::error::ExportError;
use quill_common::Timestamp;
use quill_history::HistorySeries;
use quill_model::{AttributeKind, Entity, Record, Schema, SchemaError, Value};
use serde_json::{Map, Value as Json};
use std::sync::Arc;

pub const CLASS_KEY: &str = "_class";
pub const HISTORY_KEY: &str = "_history";

/// Pretty JSON object: declared attributes in schema order, then `_class`,
/// then `_history` when a series is given.
///
/// Unset attributes encode as `null`; non-finite numbers fall back to their
/// string form. Nested entities become objects carrying their own `_class`.
pub fn to_json<E: Entity + ?Sized>(entity: &E, history: Option<&HistorySeries>) -> String {
    let mut object = entity_object(entity);
    if let Some(series) = history {
        let entries = series
            .snapshots()
            .iter()
            .map(|snap| {
                let mut entry = Map::new();
                entry.insert("timestamp".into(), Json::String(snap.timestamp().to_iso8601()));
                entry.insert("action".into(), Json::String(snap.action().to_string()));
                Json::Object(entry)
            })
            .collect();
        object.insert(HISTORY_KEY.into(), Json::Array(entries));
    }
    format!("{:#}", Json::Object(object))
}

fn entity_object<E: Entity + ?Sized>(entity: &E) -> Map<String, Json> {
    let mut object = Map::new();
    for name in entity.schema().attribute_names() {
        let encoded = entity.value_of(name).map_or(Json::Null, encode);
        object.insert(name.to_string(), encoded);
    }
    object.insert(CLASS_KEY.into(), Json::String(entity.type_name().to_string()));
    object
}

fn encode(value: &Value) -> Json {
    match value {
        Value::Text(s) => Json::String(s.clone()),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map_or_else(|| Json::String(value.to_string()), Json::Number),
        Value::Integer(i) => Json::from(*i),
        Value::Bool(b) => Json::Bool(*b),
        Value::Timestamp(ts) => Json::String(ts.to_iso8601()),
        Value::List(items) => Json::Array(items.iter().map(encode).collect()),
        Value::Record(record) => Json::Object(entity_object(&**record)),
    }
}

/// Compact JSON text of a single value, as embedded in XML cells.
pub(crate) fn compact(value: &Value) -> String {
    encode(value).to_string()
}

/// Decode a document produced by [`to_json`] into a fresh record of `schema`.
///
/// `_class` must name the schema's type; `_history` is ignored, as are `null`
/// values. The record receives a new key.
///
/// List attributes declare no element kind, so list items decode as text,
/// integer, number or boolean from their JSON shape alone. Timestamps and
/// non-finite numbers inside a list come back as [`Value::Text`].
pub fn from_json(schema: Arc<Schema>, text: &str) -> Result<Record, ExportError> {
    let doc: Json =
        serde_json::from_str(text).map_err(|e| ExportError::Decode(e.to_string()))?;
    decode_object(schema, &doc)
}

fn decode_object(schema: Arc<Schema>, doc: &Json) -> Result<Record, ExportError> {
    let object = doc.as_object().ok_or_else(|| {
        ExportError::Decode(format!("expected an object for `{}`", schema.type_name()))
    })?;
    match object.get(CLASS_KEY).and_then(Json::as_str) {
        Some(class) if class == schema.type_name() => {}
        Some(class) => {
            return Err(ExportError::Decode(format!(
                "`{CLASS_KEY}` is `{class}`, expected `{}`",
                schema.type_name()
            )));
        }
        None => return Err(ExportError::Decode(format!("missing `{CLASS_KEY}`"))),
    }

    let mut record = Record::new(schema.clone());
    for (name, raw) in object {
        if name == CLASS_KEY || name == HISTORY_KEY || raw.is_null() {
            continue;
        }
        let attribute = schema
            .attribute(name)
            .ok_or_else(|| SchemaError::UndeclaredAttribute {
                type_name: schema.type_name().to_string(),
                attribute: name.clone(),
            })?;
        let value = decode(&attribute.kind, raw).ok_or_else(|| {
            ExportError::Decode(format!(
                "`{name}` is not a valid {} value",
                attribute.kind.label()
            ))
        })??;
        record.set(name, value)?;
    }
    Ok(record)
}

// Outer `None` means the JSON shape does not fit the kind; the inner result
// carries failures from nested records.
fn decode(kind: &AttributeKind, raw: &Json) -> Option<Result<Value, ExportError>> {
    let value = match kind {
        AttributeKind::Text => Value::Text(raw.as_str()?.to_string()),
        AttributeKind::Number => match raw {
            Json::Number(n) => Value::Number(n.as_f64()?),
            Json::String(s) => Value::Number(s.parse().ok()?),
            _ => return None,
        },
        AttributeKind::Integer => Value::Integer(raw.as_i64()?),
        AttributeKind::Bool => Value::Bool(raw.as_bool()?),
        AttributeKind::Timestamp => Value::Timestamp(Timestamp::parse_iso8601(raw.as_str()?)?),
        AttributeKind::List => Value::List(
            raw.as_array()?
                .iter()
                .map(decode_primitive)
                .collect::<Option<Vec<_>>>()?,
        ),
        AttributeKind::Entity(nested) => {
            return Some(decode_object(nested.clone(), raw).map(Value::from));
        }
    };
    Some(Ok(value))
}

fn decode_primitive(raw: &Json) -> Option<Value> {
    match raw {
        Json::String(s) => Some(Value::Text(s.clone())),
        Json::Bool(b) => Some(Value::Bool(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Number)),
        _ => None,
    }
}
