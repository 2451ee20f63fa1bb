//! Validating conversion from any `Serialize` type into a [`ToonValue`].
//!
//! This is the boundary where host data enters the codec. Anything the value
//! model cannot represent is rejected with [`ToonError::Serialization`]
//! instead of being coerced:
//!
//! - non-finite floats (NaN, ±∞)
//! - byte blobs
//! - map keys that are not strings
//! - duplicate map keys
//! - errors raised by the value's own `Serialize` impl
//!
//! Enum variants carrying data use serde's externally tagged JSON shape
//! (`{"Variant": ...}`).

use serde::ser::{self, Serialize};

use crate::error::{Result, ToonError};
use crate::types::{ToonMap, ToonValue};

/// Convert a `Serialize` value into a [`ToonValue`].
///
/// ```
/// use std::collections::BTreeMap;
/// use toon_codec::{to_value, ToonValue};
///
/// let mut scores = BTreeMap::new();
/// scores.insert("alice", 95);
/// let value = to_value(&scores).unwrap();
/// assert_eq!(value.get("alice"), Some(&ToonValue::Integer(95)));
///
/// assert!(to_value(&f64::NAN).is_err());
/// ```
pub fn to_value<T>(value: &T) -> Result<ToonValue>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Convert a [`ToonValue`] into any `DeserializeOwned` type.
pub fn from_value<T>(value: ToonValue) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(serde_json::Value::from(value)).map_err(ToonError::JsonParse)
}

struct ValueSerializer;

fn finite(v: f64) -> Result<ToonValue> {
    ToonValue::try_from(v)
}

fn tagged(variant: &'static str, value: ToonValue) -> ToonValue {
    let mut map = ToonMap::with_capacity(1);
    map.insert(variant.to_string(), value);
    ToonValue::Object(map)
}

impl ser::Serializer for ValueSerializer {
    type Ok = ToonValue;
    type Error = ToonError;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<ToonValue> {
        Ok(ToonValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<ToonValue> {
        Ok(ToonValue::Integer(v as i64))
    }

    fn serialize_i16(self, v: i16) -> Result<ToonValue> {
        Ok(ToonValue::Integer(v as i64))
    }

    fn serialize_i32(self, v: i32) -> Result<ToonValue> {
        Ok(ToonValue::Integer(v as i64))
    }

    fn serialize_i64(self, v: i64) -> Result<ToonValue> {
        Ok(ToonValue::Integer(v))
    }

    fn serialize_i128(self, v: i128) -> Result<ToonValue> {
        match i64::try_from(v) {
            Ok(i) => Ok(ToonValue::Integer(i)),
            Err(_) => finite(v as f64),
        }
    }

    fn serialize_u8(self, v: u8) -> Result<ToonValue> {
        Ok(ToonValue::Integer(v as i64))
    }

    fn serialize_u16(self, v: u16) -> Result<ToonValue> {
        Ok(ToonValue::Integer(v as i64))
    }

    fn serialize_u32(self, v: u32) -> Result<ToonValue> {
        Ok(ToonValue::Integer(v as i64))
    }

    fn serialize_u64(self, v: u64) -> Result<ToonValue> {
        Ok(ToonValue::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<ToonValue> {
        match u64::try_from(v) {
            Ok(u) => Ok(ToonValue::from(u)),
            Err(_) => finite(v as f64),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<ToonValue> {
        finite(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<ToonValue> {
        finite(v)
    }

    fn serialize_char(self, v: char) -> Result<ToonValue> {
        Ok(ToonValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<ToonValue> {
        Ok(ToonValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<ToonValue> {
        Err(ToonError::Serialization(format!(
            "binary data ({} bytes) has no JSON representation",
            v.len()
        )))
    }

    fn serialize_none(self) -> Result<ToonValue> {
        Ok(ToonValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<ToonValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<ToonValue> {
        Ok(ToonValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<ToonValue> {
        Ok(ToonValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<ToonValue> {
        Ok(ToonValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<ToonValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<ToonValue>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(Some(variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None, len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant), len))
    }
}

struct SerializeVec {
    variant: Option<&'static str>,
    vec: Vec<ToonValue>,
}

impl SerializeVec {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        SerializeVec {
            variant,
            vec: Vec::with_capacity(len),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> ToonValue {
        let array = ToonValue::Array(self.vec);
        match self.variant {
            Some(variant) => tagged(variant, array),
            None => array,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = ToonValue;
    type Error = ToonError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = ToonValue;
    type Error = ToonError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = ToonValue;
    type Error = ToonError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = ToonValue;
    type Error = ToonError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

struct SerializeMap {
    variant: Option<&'static str>,
    map: ToonMap,
    current_key: Option<String>,
}

impl SerializeMap {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        SerializeMap {
            variant,
            map: ToonMap::with_capacity(len),
            current_key: None,
        }
    }

    fn insert<T: ?Sized + Serialize>(&mut self, key: String, value: &T) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(ToonError::Serialization(format!("duplicate map key `{key}`")));
        }
        let value = to_value(value)?;
        self.map.insert(key, value);
        Ok(())
    }

    fn finish(self) -> ToonValue {
        let object = ToonValue::Object(self.map);
        match self.variant {
            Some(variant) => tagged(variant, object),
            None => object,
        }
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = ToonValue;
    type Error = ToonError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)? {
            ToonValue::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            other => Err(ToonError::Serialization(format!(
                "map keys must be strings, got {}",
                other.type_name()
            ))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self.current_key.take().ok_or_else(|| {
            ToonError::Serialization("serialize_value called without serialize_key".to_string())
        })?;
        self.insert(key, value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = ToonValue;
    type Error = ToonError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = ToonValue;
    type Error = ToonError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}
