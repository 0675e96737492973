//! Schema subsystem
//!
//! Immutable, typed entity descriptions plus the rules that keep them safe
//! over time:
//!
//! - `types`: the schema model (attributes, indexes, builder)
//! - `validator`: definition checks and the upgrade compatibility lattice
//! - `diff`: structured deltas between schema versions
//!
//! # Design Principles
//!
//! - Schemas are value objects: built once, never mutated, freely shared
//! - Attribute order defines the compaction engine's packing order
//! - Upgrades must keep previously packed entities decodable

mod diff;
mod errors;
mod types;
mod validator;

pub use diff::{diff_schemas, SchemaDiff};
pub use errors::{SchemaResult, ValidationError};
pub use types::{
    Attribute, AttributeType, IndexAttribute, IndexDefinition, IndexTransform, Schema,
    SchemaBuilder, SortDirection,
};
pub use validator::{validate, validate_upgrade};
