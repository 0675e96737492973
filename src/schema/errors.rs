//! Schema validation errors
//!
//! Every error names the attribute or index at fault. Validation errors are
//! surfaced synchronously to the caller attempting the schema change and are
//! never retried.

use thiserror::Error;

use super::types::AttributeType;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, ValidationError>;

/// Schema definition and upgrade validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Attribute name contains characters outside `[A-Za-z0-9_]`
    #[error("attribute name '{name}' is malformed (allowed: [A-Za-z0-9_]+)")]
    MalformedAttributeName { name: String },

    /// Enum attribute declared without members
    #[error("enum attribute '{name}' must declare at least one value")]
    EmptyEnumValues { name: String },

    /// Non-enum attribute declared a value list
    #[error("attribute '{name}' is not an enum and must not declare values")]
    UnexpectedValues { name: String },

    /// Two attributes share a name
    #[error("duplicate attribute name '{name}'")]
    DuplicateAttribute { name: String },

    /// A second unique index was declared
    #[error("schema declares more than one unique index ('{name}')")]
    MultipleUniqueIndexes { name: String },

    /// The unique index is not first in index order
    #[error("unique index '{name}' must be first in index order")]
    UniqueIndexNotFirst { name: String },

    /// An index column names an attribute absent from the schema
    #[error("index '{index}' references unknown attribute '{attribute}'")]
    UnknownIndexAttribute { index: String, attribute: String },

    /// Type change not allowed by the upgrade lattice
    #[error("attribute '{name}' cannot change type from {from} to {to}")]
    IncompatibleUpgrade {
        name: String,
        from: AttributeType,
        to: AttributeType,
    },

    /// Enum value list changed other than by appending
    #[error("enum attribute '{name}' values may only be appended, never reordered or removed")]
    EnumValuesNotPrefix { name: String },

    /// Enum attribute dropped from the schema; stored entities may still
    /// reference its integer encoding
    #[error("enum attribute '{name}' cannot be removed")]
    EnumAttributeRemoved { name: String },

    /// `rename_of` points at an attribute that does not exist in the old schema
    #[error("attribute '{name}' declares rename_of '{target}' which does not exist")]
    UnknownRenameTarget { name: String, target: String },

    /// `rename_of` points at an index that does not exist in the old schema
    #[error("index '{name}' declares rename_of '{target}' which does not exist")]
    UnknownIndexRenameTarget { name: String, target: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_attribute() {
        let err = ValidationError::IncompatibleUpgrade {
            name: "age".into(),
            from: AttributeType::I32,
            to: AttributeType::I8,
        };
        let text = err.to_string();
        assert!(text.contains("age"));
        assert!(text.contains("i32"));
        assert!(text.contains("i8"));
    }

    #[test]
    fn test_index_error_names_both_sides() {
        let err = ValidationError::UnknownIndexAttribute {
            index: "idx_email".into(),
            attribute: "email".into(),
        };
        assert!(err.to_string().contains("idx_email"));
        assert!(err.to_string().contains("email"));
    }
}
