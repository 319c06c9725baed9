//! Wire-level building blocks for the prediction API.
//!
//! This crate provides:
//! - Schema type coercion (`resolve_type`) and wire field renaming
//! - The generic tagged `Value` / `ListValue` / `Struct` union
//! - Marshalling between native values and wire values
//!
//! Everything here is pure and synchronous.

pub mod error;
pub mod marshal;
pub mod schema;
pub mod types;

pub use error::{WireError, WireResult};
pub use marshal::{
    from_wire, from_wire_value, marshal, to_list_value, to_struct_value, to_wire_value,
    ToListValue, ToStructValue, ToWireValue,
};
pub use schema::{
    rename_schema_fields, resolve_json_type, resolve_type, CanonicalType, Schema, SchemaNode,
    TypeAlias,
};
pub use types::{ListValue, Struct, Value};
