//! The TOON value model.
//!
//! [`ToonValue`] is the tree both directions of the codec work on. It mirrors
//! JSON but keeps integers and floats apart, and stores objects in an
//! insertion-ordered [`IndexMap`] so that `decode(encode(v)) == v` holds with
//! key order intact.

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

use crate::error::ToonError;

/// Key-value pairs of an object, in insertion order.
pub type ToonMap = IndexMap<String, ToonValue>;

/// Represents a TOON document value.
///
/// Equality is structural with two refinements:
///
/// - numbers compare by value, so `Integer(1) == Float(1.0)` (the encoder
///   writes whole floats in integer form and the decoder reads them back as
///   integers);
/// - objects compare key order as well as contents.
#[derive(Debug, Clone, Default)]
pub enum ToonValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    /// Integer above `i64::MAX`. Smaller values always use `Integer`.
    UInteger(u64),
    /// Always finite. NaN and infinities are outside the value model: the
    /// checked constructors reject them and [`encode`](crate::encode) writes
    /// them as `null`.
    Float(f64),
    String(String),
    Array(Vec<ToonValue>),
    Object(ToonMap),
}

impl ToonValue {
    /// An empty object.
    pub fn object() -> Self {
        ToonValue::Object(ToonMap::new())
    }

    /// Name of the variant, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ToonValue::Null => "null",
            ToonValue::Bool(_) => "boolean",
            ToonValue::Integer(_) | ToonValue::UInteger(_) | ToonValue::Float(_) => "number",
            ToonValue::String(_) => "string",
            ToonValue::Array(_) => "array",
            ToonValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ToonValue::Null)
    }

    /// True for null, booleans, numbers and strings.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, ToonValue::Array(_) | ToonValue::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ToonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ToonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, including whole floats that fit in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ToonValue::Integer(i) => Some(*i),
            ToonValue::Float(f) => whole_float_as_i64(*f),
            _ => None,
        }
    }

    /// Non-negative integer value, including whole floats that fit in a `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ToonValue::Integer(i) => u64::try_from(*i).ok(),
            ToonValue::UInteger(u) => Some(*u),
            ToonValue::Float(f) => whole_float_as_u64(*f),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ToonValue::Integer(i) => Some(*i as f64),
            ToonValue::UInteger(u) => Some(*u as f64),
            ToonValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<ToonValue>> {
        match self {
            ToonValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ToonMap> {
        match self {
            ToonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a field of an object. Returns `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&ToonValue> {
        self.as_object().and_then(|map| map.get(key))
    }
}

/// Convert a float to `i64` only if it is finite, whole and in range.
pub(crate) fn whole_float_as_i64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it overflows.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

fn whole_float_as_u64(f: f64) -> Option<u64> {
    const LIMIT: f64 = 18_446_744_073_709_551_616.0;
    if f.is_finite() && f.fract() == 0.0 && (0.0..LIMIT).contains(&f) {
        Some(f as u64)
    } else {
        None
    }
}

impl PartialEq for ToonValue {
    fn eq(&self, other: &Self) -> bool {
        use ToonValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(i), Float(f)) | (Float(f), Integer(i)) => whole_float_as_i64(*f) == Some(*i),
            (UInteger(a), UInteger(b)) => a == b,
            (Integer(i), UInteger(u)) | (UInteger(u), Integer(i)) => i128::from(*i) == i128::from(*u),
            (UInteger(u), Float(f)) | (Float(f), UInteger(u)) => whole_float_as_u64(*f) == Some(*u),
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ToonValue {
    /// Renders the value as TOON with default options.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::encoder::encode(
            self,
            &crate::options::EncodeOptions::default(),
        ))
    }
}

// ============================================================================
// serde
// ============================================================================

impl Serialize for ToonValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ToonValue::Null => serializer.serialize_unit(),
            ToonValue::Bool(b) => serializer.serialize_bool(*b),
            ToonValue::Integer(i) => serializer.serialize_i64(*i),
            ToonValue::UInteger(u) => serializer.serialize_u64(*u),
            ToonValue::Float(f) => serializer.serialize_f64(*f),
            ToonValue::String(s) => serializer.serialize_str(s),
            ToonValue::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            ToonValue::Object(obj) => {
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ToonValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ToonValueVisitor;

        impl<'de> Visitor<'de> for ToonValueVisitor {
            type Value = ToonValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any JSON-compatible value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<ToonValue, E> {
                Ok(ToonValue::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<ToonValue, E> {
                Ok(ToonValue::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<ToonValue, E> {
                Ok(ToonValue::from(value))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<ToonValue, E> {
                if !value.is_finite() {
                    return Err(E::custom("non-finite number"));
                }
                Ok(ToonValue::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<ToonValue, E> {
                Ok(ToonValue::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<ToonValue, E> {
                Ok(ToonValue::String(value))
            }

            fn visit_unit<E>(self) -> Result<ToonValue, E> {
                Ok(ToonValue::Null)
            }

            fn visit_none<E>(self) -> Result<ToonValue, E> {
                Ok(ToonValue::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<ToonValue, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<ToonValue, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(ToonValue::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<ToonValue, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut values = ToonMap::new();
                while let Some((key, value)) = map.next_entry::<String, ToonValue>()? {
                    if values.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate key `{key}`")));
                    }
                    values.insert(key, value);
                }
                Ok(ToonValue::Object(values))
            }
        }

        deserializer.deserialize_any(ToonValueVisitor)
    }
}

// ============================================================================
// serde_json interop
// ============================================================================

impl From<&serde_json::Value> for ToonValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ToonValue::Null,
            serde_json::Value::Bool(b) => ToonValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ToonValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    ToonValue::from(u)
                } else {
                    // serde_json numbers are always finite
                    ToonValue::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => ToonValue::String(s.clone()),
            serde_json::Value::Array(arr) => {
                ToonValue::Array(arr.iter().map(ToonValue::from).collect())
            }
            serde_json::Value::Object(map) => ToonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), ToonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for ToonValue {
    fn from(value: serde_json::Value) -> Self {
        ToonValue::from(&value)
    }
}

impl From<&ToonValue> for serde_json::Value {
    fn from(value: &ToonValue) -> Self {
        match value {
            ToonValue::Null => serde_json::Value::Null,
            ToonValue::Bool(b) => serde_json::Value::Bool(*b),
            ToonValue::Integer(i) => serde_json::Value::Number((*i).into()),
            ToonValue::UInteger(u) => serde_json::Value::Number((*u).into()),
            ToonValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ToonValue::String(s) => serde_json::Value::String(s.clone()),
            ToonValue::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(serde_json::Value::from).collect())
            }
            ToonValue::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<ToonValue> for serde_json::Value {
    fn from(value: ToonValue) -> Self {
        serde_json::Value::from(&value)
    }
}

// ============================================================================
// From implementations for building values by hand
// ============================================================================

impl From<bool> for ToonValue {
    fn from(value: bool) -> Self {
        ToonValue::Bool(value)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for ToonValue {
            fn from(value: $t) -> Self {
                ToonValue::Integer(value as i64)
            }
        })*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for ToonValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => ToonValue::Integer(i),
            Err(_) => ToonValue::UInteger(value),
        }
    }
}

impl TryFrom<f64> for ToonValue {
    type Error = ToonError;

    /// Fails with [`ToonError::Serialization`] for NaN and infinities.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() {
            Ok(ToonValue::Float(value))
        } else {
            Err(ToonError::Serialization(format!(
                "non-finite number {value} has no JSON representation"
            )))
        }
    }
}

impl TryFrom<f32> for ToonValue {
    type Error = ToonError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        ToonValue::try_from(f64::from(value))
    }
}

impl From<String> for ToonValue {
    fn from(value: String) -> Self {
        ToonValue::String(value)
    }
}

impl From<&str> for ToonValue {
    fn from(value: &str) -> Self {
        ToonValue::String(value.to_string())
    }
}

impl From<Vec<ToonValue>> for ToonValue {
    fn from(value: Vec<ToonValue>) -> Self {
        ToonValue::Array(value)
    }
}

impl From<ToonMap> for ToonValue {
    fn from(value: ToonMap) -> Self {
        ToonValue::Object(value)
    }
}

impl<T: Into<ToonValue>> From<Option<T>> for ToonValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ToonValue::Null)
    }
}

impl FromIterator<(String, ToonValue)> for ToonValue {
    fn from_iter<I: IntoIterator<Item = (String, ToonValue)>>(iter: I) -> Self {
        ToonValue::Object(iter.into_iter().collect())
    }
}
