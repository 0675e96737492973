//! Compaction subsystem
//!
//! Two-stage packing of entity instances using schema knowledge:
//!
//! 1. `FieldTransform` — per-attribute type packing (enum ordinals, epoch
//!    seconds, normalized booleans, range-checked integers)
//! 2. `StructureTransform` — positional packing (presence bitset plus a dense
//!    value list, with non-schema keys carried in an `extra` map)
//!
//! `pack` chains field-then-structure before handoff to the storage
//! collaborator; retrieval runs the inverse `unpack` chain. Both stages are
//! lossless: `unpack(pack(x)) == x` and `pack(unpack(pack(x))) == pack(x)`.

pub mod bitset;
mod errors;
mod field;
mod structure;

pub use errors::{TransformError, TransformResult};
pub use field::FieldTransform;
pub use structure::StructureTransform;

use serde_json::Value;

/// JSON shape name for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "decimal"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
