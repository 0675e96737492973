//! Positional/bitset structure packing
//!
//! `StructureTransform` drops attribute names from an instance map: schema
//! attributes are scanned in declaration order, each present (non-null) value
//! goes into a dense list, and the attribute's position sets a bit in the
//! presence bitset. A present-but-null value and an absent value encode
//! identically as an unset bit — nullability is `FieldTransform`'s concern,
//! not this one's.
//!
//! The packed form is `[bitset, dense_values]`, with a third `extra` element
//! appended only when the instance carried keys outside the schema. An empty
//! instance packs to an empty sequence, not `[0, []]`.

use serde_json::{Map, Value};

use crate::schema::Schema;

use super::bitset;
use super::errors::{TransformError, TransformResult};

/// Packs instance maps into positional form and back.
///
/// Built once per schema and safe to share across threads.
#[derive(Debug, Clone)]
pub struct StructureTransform {
    schema: Schema,
}

impl StructureTransform {
    pub fn new(schema: &Schema) -> Self {
        Self {
            schema: schema.clone(),
        }
    }

    /// Packs an instance map into `[bitset, dense]` or `[bitset, dense, extra]`.
    pub fn pack(&self, instance: &Map<String, Value>) -> TransformResult<Vec<Value>> {
        if instance.is_empty() {
            return Ok(Vec::new());
        }

        let mut positions = Vec::new();
        let mut dense = Vec::new();
        for (pos, attr) in self.schema.attributes().iter().enumerate() {
            if let Some(value) = instance.get(&attr.name) {
                if !value.is_null() {
                    positions.push(pos as u64);
                    dense.push(value.clone());
                }
            }
        }

        let mut extra = Map::new();
        for (key, value) in instance {
            if self.schema.attribute(key).is_none() {
                extra.insert(key.clone(), value.clone());
            }
        }

        let mut packed = vec![bitset::pack(&positions), Value::Array(dense)];
        if !extra.is_empty() {
            packed.push(Value::Object(extra));
        }

        tracing::trace!(
            target: "transform",
            present = positions.len(),
            extras = packed.len() == 3,
            "structure pack"
        );
        Ok(packed)
    }

    /// Reconstructs the instance map from its packed sequence.
    pub fn unpack(&self, packed: &[Value]) -> TransformResult<Map<String, Value>> {
        if packed.is_empty() {
            return Ok(Map::new());
        }
        if packed.len() < 2 || packed.len() > 3 {
            return Err(TransformError::malformed(format!(
                "packed sequence must have 2 or 3 elements, got {}",
                packed.len()
            )));
        }

        let positions = bitset::unpack(&packed[0])?;
        let dense = packed[1]
            .as_array()
            .ok_or_else(|| TransformError::malformed("dense value list must be an array"))?;
        if positions.len() != dense.len() {
            return Err(TransformError::malformed(format!(
                "bitset has {} set bits but dense list has {} values",
                positions.len(),
                dense.len()
            )));
        }

        let mut out = Map::new();
        for (pos, value) in positions.iter().zip(dense) {
            let attr = self
                .schema
                .attributes()
                .get(*pos as usize)
                .ok_or_else(|| {
                    TransformError::malformed(format!(
                        "bit {pos} has no attribute in a {}-attribute schema",
                        self.schema.attributes().len()
                    ))
                })?;
            out.insert(attr.name.clone(), value.clone());
        }

        if let Some(extra) = packed.get(2) {
            let extra = extra
                .as_object()
                .ok_or_else(|| TransformError::malformed("extra element must be an object"))?;
            for (key, value) in extra {
                out.insert(key.clone(), value.clone());
            }
        }

        Ok(out)
    }
}
