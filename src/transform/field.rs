//! Per-attribute type packing
//!
//! `FieldTransform` binds one codec per schema attribute at construction time
//! (a closed enum, matched exhaustively) and converts attribute maps between
//! their caller-facing and packed representations:
//!
//! - enum members become ordinal indexes into the schema's value list
//! - UTC dates become i64 epoch seconds
//! - "true"/"false" strings become booleans
//! - integer types are range-checked
//!
//! Keys not governed by the schema pass through unchanged, keeping their
//! original relative position in the map. Nullability is enforced here:
//! an absent or null value on a non-nullable attribute fails the whole pack.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::schema::{Attribute, AttributeType, Schema};

use super::errors::{TransformError, TransformResult};
use super::json_kind;

/// Per-attribute codec, one variant per `AttributeType`.
#[derive(Debug, Clone)]
enum AttributeCodec {
    Any,
    Map,
    Array,
    Boolean,
    CharOne,
    Enum(Vec<String>),
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    UtcDateSecs,
    Utf8SmallString,
    Utf8Text,
}

impl AttributeCodec {
    fn bind(attribute: &Attribute) -> Self {
        match attribute.attr_type {
            AttributeType::Any => Self::Any,
            AttributeType::Map => Self::Map,
            AttributeType::Array => Self::Array,
            AttributeType::Boolean => Self::Boolean,
            AttributeType::CharOne => Self::CharOne,
            AttributeType::Enum => Self::Enum(attribute.values.clone().unwrap_or_default()),
            AttributeType::U8 => Self::U8,
            AttributeType::U16 => Self::U16,
            AttributeType::U32 => Self::U32,
            AttributeType::U64 => Self::U64,
            AttributeType::I8 => Self::I8,
            AttributeType::I16 => Self::I16,
            AttributeType::I32 => Self::I32,
            AttributeType::I64 => Self::I64,
            AttributeType::UtcDateSecs => Self::UtcDateSecs,
            AttributeType::Utf8SmallString => Self::Utf8SmallString,
            AttributeType::Utf8Text => Self::Utf8Text,
        }
    }

    /// What this codec expects, for error messages
    fn expectation(&self) -> &'static str {
        match self {
            Self::Any => "any value",
            Self::Map => "object",
            Self::Array => "array",
            Self::Boolean => "boolean or \"true\"/\"false\"",
            Self::CharOne => "single-character string",
            Self::Enum(_) => "enum member",
            Self::U8 => "integer in u8 range",
            Self::U16 => "integer in u16 range",
            Self::U32 => "integer in u32 range",
            Self::U64 => "integer in u64 range",
            Self::I8 => "integer in i8 range",
            Self::I16 => "integer in i16 range",
            Self::I32 => "integer in i32 range",
            Self::I64 => "integer in i64 range",
            Self::UtcDateSecs => "RFC 3339 date or epoch seconds",
            Self::Utf8SmallString => "string of at most 255 bytes",
            Self::Utf8Text => "string",
        }
    }

    /// Converts a caller-facing value into its packed form.
    /// `None` means type mismatch.
    fn pack(&self, value: &Value) -> Option<Value> {
        match self {
            Self::Any => Some(value.clone()),
            Self::Map => value.is_object().then(|| value.clone()),
            Self::Array => value.is_array().then(|| value.clone()),
            Self::Boolean => match value {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::String(s) if s == "true" => Some(Value::Bool(true)),
                Value::String(s) if s == "false" => Some(Value::Bool(false)),
                _ => None,
            },
            Self::CharOne => {
                let s = value.as_str()?;
                (s.chars().count() == 1).then(|| value.clone())
            }
            Self::Enum(values) => {
                let member = value.as_str()?;
                let ordinal = values.iter().position(|v| v == member)?;
                Some(Value::from(ordinal as u64))
            }
            Self::U8 => pack_unsigned(value, u8::MAX as u64),
            Self::U16 => pack_unsigned(value, u16::MAX as u64),
            Self::U32 => pack_unsigned(value, u32::MAX as u64),
            Self::U64 => pack_unsigned(value, u64::MAX),
            Self::I8 => pack_signed(value, i8::MIN as i64, i8::MAX as i64),
            Self::I16 => pack_signed(value, i16::MIN as i64, i16::MAX as i64),
            Self::I32 => pack_signed(value, i32::MIN as i64, i32::MAX as i64),
            Self::I64 => pack_signed(value, i64::MIN, i64::MAX),
            Self::UtcDateSecs => match value {
                Value::Number(n) => n.as_i64().map(Value::from),
                Value::String(s) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| Value::from(dt.timestamp())),
                _ => None,
            },
            Self::Utf8SmallString => {
                let s = value.as_str()?;
                (s.len() <= 255).then(|| value.clone())
            }
            Self::Utf8Text => value.is_string().then(|| value.clone()),
        }
    }

    /// Inverse of `pack`. `None` means the packed value is not of the
    /// expected shape (corrupt or mis-typed storage).
    fn unpack(&self, value: &Value) -> Option<Value> {
        match self {
            Self::Any => Some(value.clone()),
            Self::Map => value.is_object().then(|| value.clone()),
            Self::Array => value.is_array().then(|| value.clone()),
            Self::Boolean => value.as_bool().map(Value::Bool),
            Self::CharOne => {
                let s = value.as_str()?;
                (s.chars().count() == 1).then(|| value.clone())
            }
            Self::Enum(values) => {
                let ordinal = value.as_u64()?;
                values
                    .get(ordinal as usize)
                    .map(|member| Value::String(member.clone()))
            }
            Self::U8 => pack_unsigned(value, u8::MAX as u64),
            Self::U16 => pack_unsigned(value, u16::MAX as u64),
            Self::U32 => pack_unsigned(value, u32::MAX as u64),
            Self::U64 => pack_unsigned(value, u64::MAX),
            Self::I8 => pack_signed(value, i8::MIN as i64, i8::MAX as i64),
            Self::I16 => pack_signed(value, i16::MIN as i64, i16::MAX as i64),
            Self::I32 => pack_signed(value, i32::MIN as i64, i32::MAX as i64),
            Self::I64 => pack_signed(value, i64::MIN, i64::MAX),
            Self::UtcDateSecs => {
                let secs = value.as_i64()?;
                let dt = Utc.timestamp_opt(secs, 0).single()?;
                Some(Value::String(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()))
            }
            Self::Utf8SmallString => {
                let s = value.as_str()?;
                (s.len() <= 255).then(|| value.clone())
            }
            Self::Utf8Text => value.is_string().then(|| value.clone()),
        }
    }
}

fn pack_unsigned(value: &Value, max: u64) -> Option<Value> {
    let n = value.as_u64()?;
    (n <= max).then(|| Value::from(n))
}

fn pack_signed(value: &Value, min: i64, max: i64) -> Option<Value> {
    let n = value.as_i64()?;
    (min..=max).contains(&n).then(|| Value::from(n))
}

/// Applies per-attribute type packing to entity instances.
///
/// Built once per schema and safe to share across threads.
#[derive(Debug, Clone)]
pub struct FieldTransform {
    schema: Schema,
    codecs: Vec<AttributeCodec>,
}

impl FieldTransform {
    /// Binds a codec for every attribute of the schema.
    pub fn new(schema: &Schema) -> Self {
        let codecs = schema.attributes().iter().map(AttributeCodec::bind).collect();
        Self {
            schema: schema.clone(),
            codecs,
        }
    }

    fn codec_for(&self, key: &str) -> Option<(&Attribute, &AttributeCodec)> {
        let pos = self.schema.attribute_position(key)?;
        Some((&self.schema.attributes()[pos], &self.codecs[pos]))
    }

    /// Packs an instance map.
    ///
    /// Schema-governed keys are converted through their codec in place;
    /// non-schema keys pass through at their original position. Schema
    /// attributes absent from the instance surface as explicit nulls when
    /// nullable, and fail the pack when not.
    pub fn pack(&self, instance: &Map<String, Value>) -> TransformResult<Map<String, Value>> {
        let mut out = Map::new();
        for (key, value) in instance {
            match self.codec_for(key) {
                Some((attr, codec)) => {
                    out.insert(key.clone(), convert(attr, codec, value, Direction::Pack)?);
                }
                None => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }

        for attr in self.schema.attributes() {
            if instance.contains_key(&attr.name) {
                continue;
            }
            if !attr.nullable {
                return Err(TransformError::NullValue {
                    attribute: attr.name.clone(),
                });
            }
            out.insert(attr.name.clone(), Value::Null);
        }

        tracing::trace!(target: "transform", keys = instance.len(), "field pack");
        Ok(out)
    }

    /// Inverse of `pack`, applied only to keys the schema recognizes;
    /// unknown keys pass through verbatim.
    pub fn unpack(&self, packed: &Map<String, Value>) -> TransformResult<Map<String, Value>> {
        let mut out = Map::new();
        for (key, value) in packed {
            match self.codec_for(key) {
                Some((attr, codec)) => {
                    out.insert(key.clone(), convert(attr, codec, value, Direction::Unpack)?);
                }
                None => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }

        tracing::trace!(target: "transform", keys = packed.len(), "field unpack");
        Ok(out)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Pack,
    Unpack,
}

fn convert(
    attr: &Attribute,
    codec: &AttributeCodec,
    value: &Value,
    direction: Direction,
) -> TransformResult<Value> {
    if value.is_null() {
        if !attr.nullable {
            return Err(TransformError::NullValue {
                attribute: attr.name.clone(),
            });
        }
        return Ok(Value::Null);
    }

    let converted = match direction {
        Direction::Pack => codec.pack(value),
        Direction::Unpack => codec.unpack(value),
    };
    converted.ok_or_else(|| {
        TransformError::mismatch(&attr.name, codec.expectation(), json_kind(value))
    })
}
