//! stratadb - schema-driven compaction and query layer for embeddable key-value stores
//!
//! Describes entity types as typed, nullable, index-aware schemas; compacts
//! generic attribute maps into positional/bitset representations for storage;
//! and parses and evaluates a conjunction-only query language against decoded
//! entities for secondary-index matching.
//!
//! The crate performs no I/O. The surrounding key-value store supplies
//! persistence; everything here is a pure function over immutable inputs.

pub mod query;
pub mod schema;
pub mod transform;
