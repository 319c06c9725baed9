//! Conversion between native values and wire [`Value`]s.
//!
//! Native values enter through [`ToWireValue`]. Typed Rust values map onto a
//! single tag each; dynamic values (`serde_json::Value`) are dispatched in a
//! fixed order so that booleans are never mistaken for numbers and strings
//! are never mistaken for sequences. Values that are already in wire form
//! pass through unchanged.
//!
//! Conversion recurses once per nesting level with no depth limit, so
//! pathologically deep input will exhaust the stack.

use std::collections::BTreeMap;
use std::fmt::Debug;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;

use crate::error::{WireError, WireResult};
use crate::types::{ListValue, Struct, Value};

/// Largest magnitude at which every integer has an exact f64 representation.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Convert a native value to a wire [`Value`].
pub trait ToWireValue {
    fn to_wire_value(&self) -> WireResult<Value>;
}

/// Convert an ordered sequence to a wire [`ListValue`].
pub trait ToListValue {
    fn to_list_value(&self) -> WireResult<ListValue>;
}

/// Convert a key-ordered mapping to a wire [`Struct`].
pub trait ToStructValue {
    fn to_struct_value(&self) -> WireResult<Struct>;
}

/// Convert any supported native value to a wire [`Value`].
pub fn to_wire_value<T: ToWireValue + ?Sized>(value: &T) -> WireResult<Value> {
    value.to_wire_value()
}

/// Convert an ordered sequence to a [`ListValue`]. An existing `ListValue` is
/// returned as is.
pub fn to_list_value<T: ToListValue + ?Sized>(seq: &T) -> WireResult<ListValue> {
    seq.to_list_value()
}

/// Convert a key-ordered mapping to a [`Struct`]. An existing `Struct` is
/// returned as is.
pub fn to_struct_value<T: ToStructValue + ?Sized>(mapping: &T) -> WireResult<Struct> {
    mapping.to_struct_value()
}

/// Marshal any serializable value through its serde representation.
///
/// Meant for typed request bodies. Values already in wire form should go
/// through [`to_wire_value`] instead, which passes them through untouched.
/// serde_json encodes non-finite floats as null, so callers validate those
/// before marshalling.
pub fn marshal<T: Serialize + Debug + ?Sized>(value: &T) -> WireResult<Value> {
    let native = serde_json::to_value(value).map_err(|e| {
        WireError::unsupported_type(
            std::any::type_name::<T>(),
            format!("{:?} ({})", value, e),
        )
    })?;
    native.to_wire_value()
}

/// Reconstruct a native value from its wire form.
///
/// Numbers are one type on the wire, so every number comes back as a float.
/// A non-finite number fails with [`WireError::NonFiniteNumber`].
pub fn from_wire_value(value: &Value) -> WireResult<Json> {
    native_from_wire(value, NumberForm::Float)
}

/// Deserialize a typed value from its wire form.
///
/// Integral numbers within ±[`MAX_SAFE_INTEGER`] are offered to the target
/// type as integers, so integer fields read back exactly.
pub fn from_wire<T: DeserializeOwned>(value: &Value) -> WireResult<T> {
    let native = native_from_wire(value, NumberForm::Integral)?;
    Ok(serde_json::from_value(native)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberForm {
    Float,
    Integral,
}

fn native_from_wire(value: &Value, form: NumberForm) -> WireResult<Json> {
    match value {
        Value::NullValue(()) => Ok(Json::Null),
        Value::BoolValue(b) => Ok(Json::Bool(*b)),
        Value::NumberValue(n) => number_from_wire(*n, form),
        Value::StringValue(s) => Ok(Json::String(s.clone())),
        Value::ListValue(list) => list
            .values
            .iter()
            .map(|v| native_from_wire(v, form))
            .collect::<WireResult<Vec<_>>>()
            .map(Json::Array),
        Value::StructValue(s) => s
            .fields
            .iter()
            .map(|(k, v)| native_from_wire(v, form).map(|n| (k.clone(), n)))
            .collect::<WireResult<serde_json::Map<_, _>>>()
            .map(Json::Object),
    }
}

fn number_from_wire(n: f64, form: NumberForm) -> WireResult<Json> {
    if form == NumberForm::Integral && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(Json::from(n as i64));
    }
    serde_json::Number::from_f64(n)
        .map(Json::Number)
        .ok_or(WireError::NonFiniteNumber(n))
}

fn number_to_wire(n: f64) -> WireResult<Value> {
    if n.is_finite() {
        Ok(Value::NumberValue(n))
    } else {
        Err(WireError::NonFiniteNumber(n))
    }
}

// ============================================================================
// Wire-native pass-through
// ============================================================================

impl ToWireValue for Value {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(self.clone())
    }
}

impl ToWireValue for ListValue {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::ListValue(self.clone()))
    }
}

impl ToWireValue for Struct {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::StructValue(self.clone()))
    }
}

impl ToListValue for ListValue {
    fn to_list_value(&self) -> WireResult<ListValue> {
        Ok(self.clone())
    }
}

impl ToStructValue for Struct {
    fn to_struct_value(&self) -> WireResult<Struct> {
        Ok(self.clone())
    }
}

// ============================================================================
// Dynamic native values
// ============================================================================

impl ToWireValue for Json {
    fn to_wire_value(&self) -> WireResult<Value> {
        // Order matters: bool before number, string before sequence.
        match self {
            Json::Null => Ok(Value::null()),
            Json::Bool(b) => Ok(Value::BoolValue(*b)),
            Json::Number(n) => match n.as_f64() {
                Some(f) => number_to_wire(f),
                None => Err(WireError::unsupported_type(
                    "serde_json::Number",
                    n.to_string(),
                )),
            },
            Json::String(s) => Ok(Value::StringValue(s.clone())),
            Json::Array(items) => Ok(Value::ListValue(items.to_list_value()?)),
            Json::Object(map) => Ok(Value::StructValue(map.to_struct_value()?)),
        }
    }
}

impl ToStructValue for serde_json::Map<String, Json> {
    fn to_struct_value(&self) -> WireResult<Struct> {
        self.iter()
            .map(|(k, v)| v.to_wire_value().map(|w| (k.clone(), w)))
            .collect()
    }
}

// ============================================================================
// Typed native values
// ============================================================================

impl<T: ToWireValue + ?Sized> ToWireValue for &T {
    fn to_wire_value(&self) -> WireResult<Value> {
        (**self).to_wire_value()
    }
}

impl ToWireValue for () {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::null())
    }
}

impl<T: ToWireValue> ToWireValue for Option<T> {
    fn to_wire_value(&self) -> WireResult<Value> {
        match self {
            Some(v) => v.to_wire_value(),
            None => Ok(Value::null()),
        }
    }
}

impl ToWireValue for bool {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::BoolValue(*self))
    }
}

macro_rules! impl_integer_to_wire {
    ($($ty:ty),*) => {
        $(
            impl ToWireValue for $ty {
                fn to_wire_value(&self) -> WireResult<Value> {
                    Ok(Value::NumberValue(*self as f64))
                }
            }
        )*
    };
}

impl_integer_to_wire!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ToWireValue for f32 {
    fn to_wire_value(&self) -> WireResult<Value> {
        number_to_wire(f64::from(*self))
    }
}

impl ToWireValue for f64 {
    fn to_wire_value(&self) -> WireResult<Value> {
        number_to_wire(*self)
    }
}

impl ToWireValue for str {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::StringValue(self.to_string()))
    }
}

impl ToWireValue for String {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::StringValue(self.clone()))
    }
}

impl<T: ToWireValue> ToListValue for [T] {
    fn to_list_value(&self) -> WireResult<ListValue> {
        self.iter().map(|v| v.to_wire_value()).collect()
    }
}

impl<T: ToWireValue> ToListValue for Vec<T> {
    fn to_list_value(&self) -> WireResult<ListValue> {
        self.as_slice().to_list_value()
    }
}

impl<T: ToWireValue, const N: usize> ToListValue for [T; N] {
    fn to_list_value(&self) -> WireResult<ListValue> {
        self.as_slice().to_list_value()
    }
}

impl<T: ToWireValue> ToWireValue for [T] {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::ListValue(self.to_list_value()?))
    }
}

impl<T: ToWireValue> ToWireValue for Vec<T> {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::ListValue(self.to_list_value()?))
    }
}

impl<T: ToWireValue, const N: usize> ToWireValue for [T; N] {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::ListValue(self.to_list_value()?))
    }
}

impl<T: ToWireValue> ToStructValue for IndexMap<String, T> {
    fn to_struct_value(&self) -> WireResult<Struct> {
        self.iter()
            .map(|(k, v)| v.to_wire_value().map(|w| (k.clone(), w)))
            .collect()
    }
}

impl<T: ToWireValue> ToStructValue for BTreeMap<String, T> {
    fn to_struct_value(&self) -> WireResult<Struct> {
        self.iter()
            .map(|(k, v)| v.to_wire_value().map(|w| (k.clone(), w)))
            .collect()
    }
}

impl<T: ToWireValue> ToWireValue for IndexMap<String, T> {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::StructValue(self.to_struct_value()?))
    }
}

impl<T: ToWireValue> ToWireValue for BTreeMap<String, T> {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::StructValue(self.to_struct_value()?))
    }
}

impl ToWireValue for serde_json::Map<String, Json> {
    fn to_wire_value(&self) -> WireResult<Value> {
        Ok(Value::StructValue(self.to_struct_value()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_bool_is_never_a_number() {
        assert_eq!(to_wire_value(&true).unwrap(), Value::BoolValue(true));
        assert_eq!(to_wire_value(&json!(false)).unwrap(), Value::BoolValue(false));
    }

    #[test]
    fn test_integers_and_floats_become_numbers() {
        assert_eq!(to_wire_value(&42).unwrap(), Value::NumberValue(42.0));
        assert_eq!(to_wire_value(&42.0).unwrap(), Value::NumberValue(42.0));
        assert_eq!(to_wire_value(&json!(42)).unwrap(), Value::NumberValue(42.0));
        assert_eq!(to_wire_value(&json!(42.0)).unwrap(), Value::NumberValue(42.0));
    }

    #[test]
    fn test_mixed_list() {
        let value = to_wire_value(&json!([1, "a", null])).unwrap();
        assert_eq!(
            value,
            Value::ListValue(ListValue::new(vec![
                Value::NumberValue(1.0),
                Value::StringValue("a".into()),
                Value::null(),
            ]))
        );
    }

    #[test]
    fn test_single_key_struct() {
        let value = to_wire_value(&json!({"k": 1})).unwrap();
        let s = value.as_struct().unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.get("k"), Some(&Value::NumberValue(1.0)));
    }

    #[test]
    fn test_string_is_not_a_sequence() {
        assert_eq!(
            to_wire_value("abc").unwrap(),
            Value::StringValue("abc".into())
        );
    }

    #[test]
    fn test_empty_collections() {
        let empty: Vec<i32> = vec![];
        assert!(to_list_value(&empty).unwrap().is_empty());
        assert!(to_struct_value(&serde_json::Map::new()).unwrap().is_empty());
        assert_eq!(
            to_wire_value(&json!({})).unwrap(),
            Value::StructValue(Struct::default())
        );
    }

    #[test]
    fn test_struct_keeps_key_order() {
        let value = to_wire_value(&json!({"zeta": 1, "alpha": 2, "mid": 3})).unwrap();
        let keys: Vec<&str> = value
            .as_struct()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_wire_values_pass_through() {
        let already = Value::StructValue(Struct::from_iter([(
            "x".to_string(),
            Value::StringValue("y".into()),
        )]));
        assert_eq!(to_wire_value(&already).unwrap(), already);

        let list = ListValue::new(vec![Value::BoolValue(true)]);
        assert_eq!(to_list_value(&list).unwrap(), list);

        let s = Struct::from_iter([("n".to_string(), Value::NumberValue(1.0))]);
        assert_eq!(to_struct_value(&s).unwrap(), s);
    }

    #[test]
    fn test_mixed_raw_and_wire_elements() {
        let items = vec![Value::StringValue("pre".into()), Value::NumberValue(2.0)];
        let mut params: IndexMap<String, Value> = IndexMap::new();
        params.insert("converted".into(), Value::ListValue(items.to_list_value().unwrap()));
        let value = to_wire_value(&params).unwrap();

        let inner = value.as_struct().unwrap().get("converted").unwrap();
        assert_eq!(inner.as_list().unwrap().values, items);
    }

    #[test]
    fn test_option_and_unit() {
        let none: Option<i32> = None;
        assert!(to_wire_value(&none).unwrap().is_null());
        assert!(to_wire_value(&()).unwrap().is_null());
        assert_eq!(to_wire_value(&Some("v")).unwrap(), Value::StringValue("v".into()));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        assert!(matches!(
            to_wire_value(&f64::NAN),
            Err(WireError::NonFiniteNumber(_))
        ));
        assert!(matches!(
            to_wire_value(&vec![1.0, f64::INFINITY]),
            Err(WireError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn test_composite_round_trip() {
        let native = json!({
            "prompt": "a cat",
            "count": 3.0,
            "scale": 7.5,
            "tags": ["x", true, null, -12.0],
            "nested": {"deep": {"list": [], "map": {}}}
        });
        let wire = to_wire_value(&native).unwrap();
        assert_eq!(from_wire_value(&wire).unwrap(), native);
    }

    #[test]
    fn test_integral_float_round_trip() {
        let native = json!({"scale": 2.0, "offsets": [0.0, -1.0]});
        let wire = to_wire_value(&native).unwrap();
        assert_eq!(from_wire_value(&wire).unwrap(), native);
    }

    #[test]
    fn test_integers_come_back_as_floats() {
        let wire = to_wire_value(&json!({"count": 3})).unwrap();
        assert_eq!(from_wire_value(&wire).unwrap(), json!({"count": 3.0}));
        assert_eq!(from_wire::<u32>(&Value::NumberValue(3.0)).unwrap(), 3);
    }

    #[test]
    fn test_integer_precision_boundary() {
        let exact = 9_007_199_254_740_992i64; // 2^53
        let wire = to_wire_value(&exact).unwrap();
        assert_eq!(from_wire_value(&wire).unwrap(), json!(exact as f64));
        assert_eq!(from_wire::<i64>(&wire).unwrap(), exact);

        // 2^53 + 1 has no f64 representation and collapses onto 2^53.
        let beyond = exact + 1;
        let wire = to_wire_value(&beyond).unwrap();
        assert_eq!(from_wire_value(&wire).unwrap(), json!(exact as f64));
        assert_ne!(from_wire::<i64>(&wire).unwrap(), beyond);
    }

    #[test]
    fn test_large_integral_number_comes_back_as_float() {
        let back = from_wire_value(&Value::NumberValue(1e20)).unwrap();
        assert_eq!(back, json!(1e20));
    }

    #[test]
    fn test_non_finite_wire_number_fails_reconstruction() {
        let wire = Value::ListValue(ListValue::new(vec![Value::NumberValue(f64::NAN)]));
        assert!(matches!(
            from_wire_value(&wire),
            Err(WireError::NonFiniteNumber(_))
        ));
        assert!(matches!(
            from_wire::<Vec<f64>>(&wire),
            Err(WireError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn test_unsupported_type_reports_type_and_value() {
        let mut odd: BTreeMap<(u8, u8), i32> = BTreeMap::new();
        odd.insert((1, 2), 3);

        let err = marshal(&odd).unwrap_err();
        match err {
            WireError::UnsupportedType { type_name, repr } => {
                assert!(type_name.contains("BTreeMap"));
                assert!(repr.contains("(1, 2)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Options {
        sample_count: u32,
        negative_prompt: Option<String>,
        output_options: BTreeMap<String, String>,
    }

    #[test]
    fn test_marshal_typed_struct() {
        let opts = Options {
            sample_count: 2,
            negative_prompt: None,
            output_options: BTreeMap::from([("mimeType".into(), "image/png".into())]),
        };
        let wire = marshal(&opts).unwrap();
        let s = wire.as_struct().unwrap();
        assert_eq!(s.get("sampleCount"), Some(&Value::NumberValue(2.0)));
        assert!(s.get("negativePrompt").unwrap().is_null());

        let back: Options = from_wire(&wire).unwrap();
        assert_eq!(back, opts);
    }

    #[test]
    fn test_from_wire_type_mismatch() {
        let err = from_wire::<u32>(&Value::StringValue("nope".into())).unwrap_err();
        assert!(matches!(err, WireError::Json(_)));
    }
}
