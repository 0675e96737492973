//! Schema definition and upgrade validation
//!
//! `validate` checks a single schema: well-formed attribute names and
//! non-empty enum member lists. `validate_upgrade` walks every attribute of
//! the previous schema version and checks the replacement against the
//! type-compatibility lattice, so that entities packed under the old schema
//! remain decodable under the new one:
//!
//! - any/map/array/boolean/char_one: may only be dropped or kept as-is
//! - enum: may never be dropped; member list may only grow by appending
//! - integers: widening only (i8 -> i16/i32/i64, never back)
//! - utc_date_secs: may degrade to i64 (raw epoch seconds)
//! - utf8_smallstring: may widen to utf8_text, never the reverse
//!
//! New attributes absent from the old schema are always accepted; existing
//! stored entities simply lack the value and resolve through nullability at
//! decode time.

use regex::Regex;
use std::sync::LazyLock;

use super::errors::{SchemaResult, ValidationError};
use super::types::{Attribute, AttributeType, Schema};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z0-9_]+$").expect("attribute name pattern is valid"));

/// Validates a schema definition.
///
/// Fails on a malformed attribute name, an enum attribute without values, or
/// a value list on a non-enum attribute.
pub fn validate(schema: &Schema) -> SchemaResult<()> {
    for attr in schema.attributes() {
        if !NAME_PATTERN.is_match(&attr.name) {
            return Err(ValidationError::MalformedAttributeName {
                name: attr.name.clone(),
            });
        }
        match attr.attr_type {
            AttributeType::Enum => {
                if attr.values.as_ref().is_none_or(|v| v.is_empty()) {
                    return Err(ValidationError::EmptyEnumValues {
                        name: attr.name.clone(),
                    });
                }
            }
            _ => {
                if attr.values.is_some() {
                    return Err(ValidationError::UnexpectedValues {
                        name: attr.name.clone(),
                    });
                }
            }
        }
    }

    tracing::debug!(
        target: "schema",
        attributes = schema.attributes().len(),
        indexes = schema.indexes().len(),
        "schema validated"
    );
    Ok(())
}

/// Validates a schema upgrade against the type-compatibility lattice.
///
/// Every attribute of `old` must map to a compatible attribute (or a
/// permitted absence) in `new`. Attributes only present in `new` are
/// accepted without restriction.
pub fn validate_upgrade(old: &Schema, new: &Schema) -> SchemaResult<()> {
    for old_attr in old.attributes() {
        check_attribute_upgrade(old_attr, new.attribute(&old_attr.name))?;
    }

    tracing::debug!(
        target: "schema",
        old_attributes = old.attributes().len(),
        new_attributes = new.attributes().len(),
        "schema upgrade validated"
    );
    Ok(())
}

fn check_attribute_upgrade(old: &Attribute, new: Option<&Attribute>) -> SchemaResult<()> {
    use AttributeType as T;

    let Some(new) = new else {
        // Dropping is allowed for every type except enum: stored entities may
        // still carry the enum's ordinal encoding.
        return match old.attr_type {
            T::Enum => Err(ValidationError::EnumAttributeRemoved {
                name: old.name.clone(),
            }),
            _ => Ok(()),
        };
    };

    let from = old.attr_type;
    let to = new.attr_type;

    let allowed = match from {
        T::Any | T::Map | T::Array | T::Boolean | T::CharOne => to == from,
        T::Enum => {
            if to != T::Enum {
                false
            } else {
                check_enum_values(old, new)?;
                true
            }
        }
        T::U8 => matches!(to, T::U8 | T::U16 | T::U32 | T::U64),
        T::U16 => matches!(to, T::U16 | T::U32 | T::U64),
        T::U32 => matches!(to, T::U32 | T::U64),
        T::U64 => to == T::U64,
        T::I8 => matches!(to, T::I8 | T::I16 | T::I32 | T::I64),
        T::I16 => matches!(to, T::I16 | T::I32 | T::I64),
        T::I32 => matches!(to, T::I32 | T::I64),
        T::I64 => to == T::I64,
        T::UtcDateSecs => matches!(to, T::UtcDateSecs | T::I64),
        T::Utf8SmallString => matches!(to, T::Utf8SmallString | T::Utf8Text),
        T::Utf8Text => to == T::Utf8Text,
    };

    if !allowed {
        return Err(ValidationError::IncompatibleUpgrade {
            name: old.name.clone(),
            from,
            to,
        });
    }
    Ok(())
}

/// The new enum member list must start with the old list, unchanged in order;
/// new members may only be appended. Anything else would shift the ordinal
/// encoding of already-stored values.
fn check_enum_values(old: &Attribute, new: &Attribute) -> SchemaResult<()> {
    let old_values = old.values.as_deref().unwrap_or_default();
    let new_values = new.values.as_deref().unwrap_or_default();

    if new_values.len() < old_values.len() || new_values[..old_values.len()] != *old_values {
        return Err(ValidationError::EnumValuesNotPrefix {
            name: old.name.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::Attribute;

    fn schema_of(attrs: Vec<Attribute>) -> Schema {
        let mut builder = Schema::builder();
        for attr in attrs {
            builder = builder.attribute(attr);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_malformed_attribute_name_rejected() {
        let schema = schema_of(vec![Attribute::new("bad name!", AttributeType::Any)]);
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::MalformedAttributeName { name }) if name == "bad name!"
        ));
    }

    #[test]
    fn test_empty_enum_values_rejected() {
        let schema = schema_of(vec![Attribute::enumeration("color", vec![])]);
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::EmptyEnumValues { name }) if name == "color"
        ));
    }

    #[test]
    fn test_values_on_non_enum_rejected() {
        let mut attr = Attribute::new("n", AttributeType::U32);
        attr.values = Some(vec!["x".into()]);
        let schema = schema_of(vec![attr]);
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::UnexpectedValues { name }) if name == "n"
        ));
    }

    #[test]
    fn test_valid_schema_passes() {
        let schema = schema_of(vec![
            Attribute::new("name_1", AttributeType::Utf8Text),
            Attribute::enumeration("color", vec!["red".into()]),
        ]);
        assert!(validate(&schema).is_ok());
    }

    #[test]
    fn test_integer_widening_allowed() {
        let old = schema_of(vec![Attribute::new("n", AttributeType::I8)]);
        for to in [AttributeType::I8, AttributeType::I16, AttributeType::I32, AttributeType::I64] {
            let new = schema_of(vec![Attribute::new("n", to)]);
            assert!(validate_upgrade(&old, &new).is_ok(), "i8 -> {to} should pass");
        }
    }

    #[test]
    fn test_integer_narrowing_rejected() {
        let old = schema_of(vec![Attribute::new("n", AttributeType::I32)]);
        let new = schema_of(vec![Attribute::new("n", AttributeType::I8)]);
        assert!(matches!(
            validate_upgrade(&old, &new),
            Err(ValidationError::IncompatibleUpgrade { .. })
        ));
    }

    #[test]
    fn test_unsigned_widening_mirrors_signed() {
        let old = schema_of(vec![Attribute::new("n", AttributeType::U16)]);
        let ok = schema_of(vec![Attribute::new("n", AttributeType::U64)]);
        let bad = schema_of(vec![Attribute::new("n", AttributeType::U8)]);
        assert!(validate_upgrade(&old, &ok).is_ok());
        assert!(validate_upgrade(&old, &bad).is_err());
    }

    #[test]
    fn test_signed_unsigned_cross_rejected() {
        let old = schema_of(vec![Attribute::new("n", AttributeType::I8)]);
        let new = schema_of(vec![Attribute::new("n", AttributeType::U16)]);
        assert!(validate_upgrade(&old, &new).is_err());
    }

    #[test]
    fn test_date_degrades_to_i64_only() {
        let old = schema_of(vec![Attribute::new("ts", AttributeType::UtcDateSecs)]);
        let ok = schema_of(vec![Attribute::new("ts", AttributeType::I64)]);
        assert!(validate_upgrade(&old, &ok).is_ok());

        let old = schema_of(vec![Attribute::new("ts", AttributeType::I64)]);
        let bad = schema_of(vec![Attribute::new("ts", AttributeType::UtcDateSecs)]);
        assert!(validate_upgrade(&old, &bad).is_err());
    }

    #[test]
    fn test_smallstring_widens_to_text_only() {
        let old = schema_of(vec![Attribute::new("s", AttributeType::Utf8SmallString)]);
        let ok = schema_of(vec![Attribute::new("s", AttributeType::Utf8Text)]);
        assert!(validate_upgrade(&old, &ok).is_ok());

        let old = schema_of(vec![Attribute::new("s", AttributeType::Utf8Text)]);
        let bad = schema_of(vec![Attribute::new("s", AttributeType::Utf8SmallString)]);
        assert!(validate_upgrade(&old, &bad).is_err());
    }

    #[test]
    fn test_enum_append_allowed() {
        let old = schema_of(vec![Attribute::enumeration("e", vec!["dude".into()])]);
        let new = schema_of(vec![Attribute::enumeration(
            "e",
            vec!["dude".into(), "dude2".into()],
        )]);
        assert!(validate_upgrade(&old, &new).is_ok());
    }

    #[test]
    fn test_enum_reorder_rejected() {
        let old = schema_of(vec![Attribute::enumeration(
            "e",
            vec!["dude".into(), "dude2".into()],
        )]);
        let new = schema_of(vec![Attribute::enumeration(
            "e",
            vec!["dude2".into(), "dude".into()],
        )]);
        assert!(matches!(
            validate_upgrade(&old, &new),
            Err(ValidationError::EnumValuesNotPrefix { .. })
        ));
    }

    #[test]
    fn test_enum_shrink_rejected() {
        let old = schema_of(vec![Attribute::enumeration("e", vec!["dude".into()])]);
        let new = schema_of(vec![Attribute::enumeration("e", vec![])]);
        assert!(validate_upgrade(&old, &new).is_err());
    }

    #[test]
    fn test_enum_removal_rejected() {
        let old = schema_of(vec![Attribute::enumeration("e", vec!["dude".into()])]);
        let new = schema_of(vec![Attribute::new("other", AttributeType::Any)]);
        assert!(matches!(
            validate_upgrade(&old, &new),
            Err(ValidationError::EnumAttributeRemoved { name }) if name == "e"
        ));
    }

    #[test]
    fn test_non_enum_removal_allowed() {
        let old = schema_of(vec![Attribute::new("gone", AttributeType::Boolean)]);
        let new = schema_of(vec![Attribute::new("kept", AttributeType::Any)]);
        assert!(validate_upgrade(&old, &new).is_ok());
    }

    #[test]
    fn test_new_attributes_always_accepted() {
        let old = schema_of(vec![Attribute::new("a", AttributeType::U8)]);
        let new = schema_of(vec![
            Attribute::new("a", AttributeType::U64),
            Attribute::new("b", AttributeType::Utf8Text).non_nullable(),
        ]);
        assert!(validate_upgrade(&old, &new).is_ok());
    }

    #[test]
    fn test_exact_type_only_for_structural_types() {
        for t in [
            AttributeType::Any,
            AttributeType::Map,
            AttributeType::Array,
            AttributeType::Boolean,
            AttributeType::CharOne,
        ] {
            let old = schema_of(vec![Attribute::new("x", t)]);
            let same = schema_of(vec![Attribute::new("x", t)]);
            let changed = schema_of(vec![Attribute::new("x", AttributeType::I64)]);
            assert!(validate_upgrade(&old, &same).is_ok(), "{t} -> {t} should pass");
            assert!(validate_upgrade(&old, &changed).is_err(), "{t} -> i64 should fail");
        }
    }
}
