//! Schema type coercion and wire field renaming.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use crate::error::{WireError, WireResult};

/// JSON-schema-like node describing a parameter.
pub type SchemaNode = serde_json::Map<String, Json>;

/// Schema type as understood by the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum CanonicalType {
    #[default]
    #[serde(rename = "TYPE_UNSPECIFIED")]
    Unspecified = 0,
    #[serde(rename = "STRING")]
    String = 1,
    #[serde(rename = "NUMBER")]
    Number = 2,
    #[serde(rename = "INTEGER")]
    Integer = 3,
    #[serde(rename = "BOOLEAN")]
    Boolean = 4,
    #[serde(rename = "ARRAY")]
    Array = 5,
    #[serde(rename = "OBJECT")]
    Object = 6,
}

impl CanonicalType {
    pub const ALL: [CanonicalType; 7] = [
        CanonicalType::Unspecified,
        CanonicalType::String,
        CanonicalType::Number,
        CanonicalType::Integer,
        CanonicalType::Boolean,
        CanonicalType::Array,
        CanonicalType::Object,
    ];

    /// Wire name, e.g. `STRING`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::Unspecified => "TYPE_UNSPECIFIED",
            CanonicalType::String => "STRING",
            CanonicalType::Number => "NUMBER",
            CanonicalType::Integer => "INTEGER",
            CanonicalType::Boolean => "BOOLEAN",
            CanonicalType::Array => "ARRAY",
            CanonicalType::Object => "OBJECT",
        }
    }

    /// Lower-case name without the `type_` prefix.
    fn bare_name(&self) -> &'static str {
        match self {
            CanonicalType::Unspecified => "unspecified",
            CanonicalType::String => "string",
            CanonicalType::Number => "number",
            CanonicalType::Integer => "integer",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Array => "array",
            CanonicalType::Object => "object",
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CanonicalType {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve_type(s)
    }
}

impl TryFrom<i64> for CanonicalType {
    type Error = WireError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        resolve_type(code)
    }
}

impl<'de> Deserialize<'de> for CanonicalType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Json::deserialize(deserializer)?;
        resolve_json_type(&raw).map_err(serde::de::Error::custom)
    }
}

/// Any accepted spelling of a schema type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeAlias<'a> {
    Canonical(CanonicalType),
    Code(i64),
    Name(&'a str),
}

impl From<CanonicalType> for TypeAlias<'_> {
    fn from(ty: CanonicalType) -> Self {
        TypeAlias::Canonical(ty)
    }
}

impl From<i64> for TypeAlias<'_> {
    fn from(code: i64) -> Self {
        TypeAlias::Code(code)
    }
}

impl From<i32> for TypeAlias<'_> {
    fn from(code: i32) -> Self {
        TypeAlias::Code(i64::from(code))
    }
}

impl<'a> From<&'a str> for TypeAlias<'a> {
    fn from(name: &'a str) -> Self {
        TypeAlias::Name(name)
    }
}

impl<'a> From<&'a String> for TypeAlias<'a> {
    fn from(name: &'a String) -> Self {
        TypeAlias::Name(name.as_str())
    }
}

impl fmt::Display for TypeAlias<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAlias::Canonical(ty) => write!(f, "{}", ty),
            TypeAlias::Code(code) => write!(f, "{}", code),
            TypeAlias::Name(name) => write!(f, "{:?}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum AliasKey {
    Canonical(CanonicalType),
    Code(i64),
    Name(String),
}

static TYPE_ALIASES: LazyLock<HashMap<AliasKey, CanonicalType>> = LazyLock::new(|| {
    let mut table = HashMap::new();

    for ty in CanonicalType::ALL {
        table.insert(AliasKey::Canonical(ty), ty);
        table.insert(AliasKey::Name(format!("type_{}", ty.bare_name())), ty);
        table.insert(AliasKey::Name(ty.bare_name().to_string()), ty);
    }

    // Code 4 resolves to INTEGER and BOOLEAN has no integer alias. Deployed
    // callers depend on this table as-is.
    let codes = [
        (0, CanonicalType::Unspecified),
        (1, CanonicalType::String),
        (2, CanonicalType::Number),
        (3, CanonicalType::Integer),
        (4, CanonicalType::Integer),
        (5, CanonicalType::Array),
        (6, CanonicalType::Object),
    ];
    for (code, ty) in codes {
        table.insert(AliasKey::Code(code), ty);
    }

    table
});

/// Resolve a type alias to its canonical type. Names are case-insensitive.
pub fn resolve_type<'a>(alias: impl Into<TypeAlias<'a>>) -> WireResult<CanonicalType> {
    let alias = alias.into();
    let key = match alias {
        TypeAlias::Canonical(ty) => AliasKey::Canonical(ty),
        TypeAlias::Code(code) => AliasKey::Code(code),
        TypeAlias::Name(name) => AliasKey::Name(name.to_lowercase()),
    };

    let resolved = TYPE_ALIASES
        .get(&key)
        .copied()
        .ok_or_else(|| WireError::unknown_type(alias.to_string()))?;

    if key == AliasKey::Code(4) {
        debug!("Type code 4 resolved to {}", resolved);
    }

    Ok(resolved)
}

/// Resolve a type alias held in a JSON value (string name or integer code).
pub fn resolve_json_type(value: &Json) -> WireResult<CanonicalType> {
    match value {
        Json::String(name) => resolve_type(name),
        Json::Number(n) => match n.as_i64() {
            Some(code) => resolve_type(code),
            None => Err(WireError::unknown_type(n.to_string())),
        },
        other => Err(WireError::unknown_type(other.to_string())),
    }
}

/// Rewrite a schema node into wire field names.
///
/// `type` becomes `type_` holding the canonical type, `format` becomes
/// `format_`, and `items` / `properties` are renamed recursively. Other keys
/// keep their relative order. The input is never modified and applying the
/// rename twice gives the same result as applying it once.
pub fn rename_schema_fields(schema: Option<&SchemaNode>) -> WireResult<Option<SchemaNode>> {
    match schema {
        Some(node) => rename_node(node).map(Some),
        None => Ok(None),
    }
}

fn rename_node(schema: &SchemaNode) -> WireResult<SchemaNode> {
    let mut node = schema.clone();

    if let Some(ty) = take_field(&mut node, "type") {
        node.insert("type_".to_string(), ty);
    }
    let resolved = match node.get("type_") {
        Some(ty) if !ty.is_null() => Some(resolve_json_type(ty)?),
        _ => None,
    };
    if let Some(ty) = resolved {
        node.insert("type_".to_string(), Json::String(ty.as_str().to_string()));
    }

    if let Some(format) = take_field(&mut node, "format") {
        node.insert("format_".to_string(), format);
    }

    if let Some(items) = take_field(&mut node, "items") {
        let items = items
            .as_object()
            .ok_or_else(|| WireError::invalid_schema(format!("items must be an object, got {}", items)))?;
        node.insert("items".to_string(), Json::Object(rename_node(items)?));
    }

    if let Some(properties) = take_field(&mut node, "properties") {
        let properties = properties.as_object().ok_or_else(|| {
            WireError::invalid_schema(format!("properties must be an object, got {}", properties))
        })?;

        let mut renamed = SchemaNode::new();
        for (name, property) in properties {
            if property.is_null() {
                renamed.insert(name.clone(), Json::Null);
                continue;
            }
            let property = property.as_object().ok_or_else(|| {
                WireError::invalid_schema(format!("property {:?} must be an object", name))
            })?;
            renamed.insert(name.clone(), Json::Object(rename_node(property)?));
        }
        node.insert("properties".to_string(), Json::Object(renamed));
    }

    Ok(node)
}

/// Remove a key, treating an explicit null like a missing key.
fn take_field(node: &mut SchemaNode, key: &str) -> Option<Json> {
    node.shift_remove(key).filter(|v| !v.is_null())
}

/// Typed view of a renamed schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub type_: CanonicalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    /// Rename a user-supplied node and read it as a typed schema.
    pub fn from_node(node: &SchemaNode) -> WireResult<Self> {
        let renamed = rename_node(node)?;
        Ok(serde_json::from_value(Json::Object(renamed))?)
    }
}
