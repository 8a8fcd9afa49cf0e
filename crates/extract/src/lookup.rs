use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::quantity::parse_quantity;
use crate::types::FieldValue;

/// A semantic field and the key names it may appear under, primary first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldKey {
    pub primary: String,
    #[serde(default)]
    pub alternates: Vec<String>,
}

impl FieldKey {
    pub fn new(primary: &str, alternates: &[&str]) -> Self {
        Self {
            primary: primary.to_string(),
            alternates: alternates.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.alternates.iter().map(String::as_str))
    }

    /// First non-null value stored under any of this field's names.
    pub fn find<'a>(&self, map: &'a Map<String, Value>) -> Option<&'a Value> {
        self.names().find_map(|name| map.get(name).filter(|v| !v.is_null()))
    }

    /// Read each name in order and keep the first usable value. A name that is
    /// present but carries no value does not stop the search.
    pub fn resolve(&self, map: &Map<String, Value>, reader: fn(&Value) -> FieldValue) -> FieldValue {
        self.names()
            .filter_map(|name| map.get(name).filter(|v| !v.is_null()))
            .map(reader)
            .find(FieldValue::is_found)
            .unwrap_or(FieldValue::NotFound)
    }
}

/// Read a tagged field object as text, preferring `valueString` over `valueNumber`.
pub fn text_of(field: &Value) -> FieldValue {
    if let Some(s) = field.get("valueString").and_then(Value::as_str) {
        return FieldValue::Text(s.to_string());
    }
    match field.get("valueNumber").and_then(Value::as_f64) {
        Some(n) => FieldValue::Number(n),
        None => FieldValue::NotFound,
    }
}

/// Read a tagged field object as a quantity, preferring `valueNumber` over `valueString`.
pub fn quantity_of(field: &Value) -> FieldValue {
    let present = |key: &str| field.get(key).filter(|v| !v.is_null());
    match present("valueNumber").or_else(|| present("valueString")) {
        Some(v) => FieldValue::Number(parse_quantity(v)),
        None => FieldValue::NotFound,
    }
}

/// Like [`text_of`] but also accepts a bare scalar, as found in embedded JSON.
pub fn loose_text_of(value: &Value) -> FieldValue {
    match value {
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Number(n) => n.as_f64().map_or(FieldValue::NotFound, FieldValue::Number),
        Value::Object(_) => text_of(value),
        _ => FieldValue::NotFound,
    }
}

/// Like [`quantity_of`] but also accepts a bare scalar.
pub fn loose_quantity_of(value: &Value) -> FieldValue {
    match value {
        Value::Object(_) => quantity_of(value),
        Value::Null => FieldValue::NotFound,
        other => FieldValue::Number(parse_quantity(other)),
    }
}
