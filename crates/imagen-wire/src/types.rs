//! Generic structured value types used on the prediction wire.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tagged structured value. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BoolValue(bool),
    NumberValue(f64),
    StringValue(String),
    ListValue(ListValue),
    StructValue(Struct),
}

/// Ordered list of wire values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

/// Key-ordered mapping of field names to wire values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Struct {
    #[serde(default)]
    pub fields: IndexMap<String, Value>,
}

impl Value {
    pub fn null() -> Self {
        Value::NullValue(())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::NullValue(()))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::BoolValue(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::NumberValue(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::StringValue(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::ListValue(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::StructValue(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the active tag, as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::NullValue(()) => "nullValue",
            Value::BoolValue(_) => "boolValue",
            Value::NumberValue(_) => "numberValue",
            Value::StringValue(_) => "stringValue",
            Value::ListValue(_) => "listValue",
            Value::StructValue(_) => "structValue",
        }
    }
}

impl ListValue {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }
}

impl Struct {
    pub fn new(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Insert a field, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }
}

impl From<ListValue> for Value {
    fn from(list: ListValue) -> Self {
        Value::ListValue(list)
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Value::StructValue(s)
    }
}

impl FromIterator<Value> for ListValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, Value)> for Struct {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
