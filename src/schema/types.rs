//! Schema type definitions
//!
//! A `Schema` describes one entity type: an ordered list of named, typed,
//! nullable attributes plus an ordered list of secondary-index definitions.
//! Attribute order is significant — it defines the positional packing order
//! used by the compaction transforms.
//!
//! Schemas are built once through `SchemaBuilder` and never mutated. A schema
//! upgrade replaces the whole instance.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{SchemaResult, ValidationError};

/// Closed set of attribute types.
///
/// Every type has a fixed packed representation; the compaction engine
/// matches on this enum exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Any JSON value, stored as-is
    Any,
    /// Nested object, stored as-is
    Map,
    /// Array, stored as-is
    Array,
    /// Boolean ("true"/"false" strings are normalized on pack)
    Boolean,
    /// Exactly one character
    CharOne,
    /// Closed string set, packed as the ordinal index into `values`
    Enum,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    /// UTC timestamp, packed as i64 seconds since the epoch
    UtcDateSecs,
    /// UTF-8 string of at most 255 bytes
    Utf8SmallString,
    /// UTF-8 string without a length bound
    Utf8Text,
}

impl AttributeType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeType::Any => "any",
            AttributeType::Map => "map",
            AttributeType::Array => "array",
            AttributeType::Boolean => "boolean",
            AttributeType::CharOne => "char_one",
            AttributeType::Enum => "enum",
            AttributeType::U8 => "u8",
            AttributeType::U16 => "u16",
            AttributeType::U32 => "u32",
            AttributeType::U64 => "u64",
            AttributeType::I8 => "i8",
            AttributeType::I16 => "i16",
            AttributeType::I32 => "i32",
            AttributeType::I64 => "i64",
            AttributeType::UtcDateSecs => "utc_date_secs",
            AttributeType::Utf8SmallString => "utf8_smallstring",
            AttributeType::Utf8Text => "utf8_text",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// One named, typed, nullable attribute of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, restricted to `[A-Za-z0-9_]+`
    pub name: String,
    /// Attribute type
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Whether the attribute may be absent or null (default true)
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Ordered enum members; required and non-empty when `attr_type` is Enum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    /// Name this attribute had in the previous schema version, for rename diffing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_of: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl Attribute {
    /// Create a nullable attribute
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            nullable: true,
            values: None,
            rename_of: None,
        }
    }

    /// Create an enum attribute with the given ordered member list
    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            attr_type: AttributeType::Enum,
            nullable: true,
            values: Some(values),
            rename_of: None,
        }
    }

    /// Mark the attribute as non-nullable
    pub fn non_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Record the attribute's previous name for rename diffing
    pub fn renamed_from(mut self, previous: impl Into<String>) -> Self {
        self.rename_of = Some(previous.into());
        self
    }
}

/// Sort direction of one index column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Per-column value transform applied before indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexTransform {
    None,
    Lowercase,
}

/// One column of a secondary index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexAttribute {
    /// Name of the schema attribute being indexed
    pub name: String,
    pub direction: SortDirection,
    pub transform: IndexTransform,
}

impl IndexAttribute {
    /// Ascending column with no transform
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Asc,
            transform: IndexTransform::None,
        }
    }

    /// Descending column with no transform
    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Desc,
            transform: IndexTransform::None,
        }
    }

    /// Set the column transform
    pub fn with_transform(mut self, transform: IndexTransform) -> Self {
        self.transform = transform;
        self
    }
}

/// A secondary-index definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    /// Ordered index columns
    pub attributes: Vec<IndexAttribute>,
    /// At most one index per schema may be unique, and it must be first
    #[serde(default)]
    pub unique: bool,
    /// Name this index had in the previous schema version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_of: Option<String>,
}

impl IndexDefinition {
    /// Create a non-unique index over the given columns
    pub fn new(name: impl Into<String>, attributes: Vec<IndexAttribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
            unique: false,
            rename_of: None,
        }
    }

    /// Mark the index as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Record the index's previous name for rename diffing
    pub fn renamed_from(mut self, previous: impl Into<String>) -> Self {
        self.rename_of = Some(previous.into());
        self
    }
}

/// Complete schema for one entity type.
///
/// Immutable after construction; any number of pack/unpack/evaluate calls may
/// share a schema without synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    indexes: Vec<IndexDefinition>,
}

impl Schema {
    /// Start building a schema
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Attributes in declaration (packing) order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Index definitions in declaration order
    pub fn indexes(&self) -> &[IndexDefinition] {
        &self.indexes
    }

    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Position of an attribute in packing order
    pub fn attribute_position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Look up an index by name
    pub fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

/// Builder enforcing schema construction invariants.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    attributes: Vec<Attribute>,
    indexes: Vec<IndexDefinition>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute (order defines packing position)
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append an index definition
    pub fn index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// Build the schema, checking structural invariants:
    /// attribute names unique, at most one unique index and it must be first,
    /// every index column must name a schema attribute.
    pub fn build(self) -> SchemaResult<Schema> {
        for (i, attr) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|a| a.name == attr.name) {
                return Err(ValidationError::DuplicateAttribute {
                    name: attr.name.clone(),
                });
            }
        }

        let mut unique_seen = false;
        for (i, index) in self.indexes.iter().enumerate() {
            if index.unique {
                if unique_seen {
                    return Err(ValidationError::MultipleUniqueIndexes {
                        name: index.name.clone(),
                    });
                }
                if i != 0 {
                    return Err(ValidationError::UniqueIndexNotFirst {
                        name: index.name.clone(),
                    });
                }
                unique_seen = true;
            }
            for column in &index.attributes {
                if !self.attributes.iter().any(|a| a.name == column.name) {
                    return Err(ValidationError::UnknownIndexAttribute {
                        index: index.name.clone(),
                        attribute: column.name.clone(),
                    });
                }
            }
        }

        Ok(Schema {
            attributes: self.attributes,
            indexes: self.indexes,
        })
    }
}
