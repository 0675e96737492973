//! Structured schema deltas
//!
//! `diff_schemas` computes the ordered list of changes between two schema
//! versions: all attribute-level changes first, then all index-level changes.
//! The diff is informational — it drives conservative, staged migrations in
//! the surrounding store and performs no mutation itself.
//!
//! Renames are matched through `rename_of` on the new side; an attribute or
//! index whose `rename_of` points at nothing in the old schema is an error.

use std::collections::HashSet;

use super::errors::{SchemaResult, ValidationError};
use super::types::{Attribute, IndexDefinition, Schema};

/// One change between two schema versions.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDiff {
    AttributeAdded { new: Attribute },
    AttributeModified { old: Attribute, new: Attribute },
    AttributeRenamed { old: Attribute, new: Attribute },
    AttributeRemoved { old: Attribute },
    IndexAdded { new: IndexDefinition },
    IndexModified { old: IndexDefinition, new: IndexDefinition },
    IndexRenamed { old: IndexDefinition, new: IndexDefinition },
    IndexRemoved { old: IndexDefinition },
}

/// Computes the ordered delta between two schema versions.
///
/// Attribute diffs come first, then index diffs. Within each group the order
/// follows the new schema's declaration order, with removals appended in the
/// old schema's order.
pub fn diff_schemas(old: &Schema, new: &Schema) -> SchemaResult<Vec<SchemaDiff>> {
    let mut diffs = Vec::new();

    // Old attribute names accounted for, either by rename or by name match.
    let mut matched: HashSet<&str> = HashSet::new();

    for new_attr in new.attributes() {
        if let Some(target) = &new_attr.rename_of {
            let old_attr = old.attribute(target).ok_or_else(|| {
                ValidationError::UnknownRenameTarget {
                    name: new_attr.name.clone(),
                    target: target.clone(),
                }
            })?;
            matched.insert(target.as_str());
            diffs.push(SchemaDiff::AttributeRenamed {
                old: old_attr.clone(),
                new: new_attr.clone(),
            });
        } else if let Some(old_attr) = old.attribute(&new_attr.name) {
            matched.insert(old_attr.name.as_str());
            if old_attr.attr_type != new_attr.attr_type
                || old_attr.nullable != new_attr.nullable
                || old_attr.values != new_attr.values
            {
                diffs.push(SchemaDiff::AttributeModified {
                    old: old_attr.clone(),
                    new: new_attr.clone(),
                });
            }
        } else {
            diffs.push(SchemaDiff::AttributeAdded {
                new: new_attr.clone(),
            });
        }
    }

    for old_attr in old.attributes() {
        if !matched.contains(old_attr.name.as_str()) {
            diffs.push(SchemaDiff::AttributeRemoved {
                old: old_attr.clone(),
            });
        }
    }

    let mut matched_indexes: HashSet<&str> = HashSet::new();

    for new_index in new.indexes() {
        if let Some(target) = &new_index.rename_of {
            let old_index = old.index(target).ok_or_else(|| {
                ValidationError::UnknownIndexRenameTarget {
                    name: new_index.name.clone(),
                    target: target.clone(),
                }
            })?;
            matched_indexes.insert(target.as_str());
            diffs.push(SchemaDiff::IndexRenamed {
                old: old_index.clone(),
                new: new_index.clone(),
            });
        } else if let Some(old_index) = old.index(&new_index.name) {
            matched_indexes.insert(old_index.name.as_str());
            // Any column difference (name, direction, transform) or a
            // uniqueness change counts as a modification.
            if old_index.unique != new_index.unique || old_index.attributes != new_index.attributes
            {
                diffs.push(SchemaDiff::IndexModified {
                    old: old_index.clone(),
                    new: new_index.clone(),
                });
            }
        } else {
            diffs.push(SchemaDiff::IndexAdded {
                new: new_index.clone(),
            });
        }
    }

    for old_index in old.indexes() {
        if !matched_indexes.contains(old_index.name.as_str()) {
            diffs.push(SchemaDiff::IndexRemoved {
                old: old_index.clone(),
            });
        }
    }

    Ok(diffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{AttributeType, IndexAttribute, IndexTransform};

    fn empty_schema() -> Schema {
        Schema::builder().build().unwrap()
    }

    #[test]
    fn test_attribute_add() {
        let old = empty_schema();
        let new = Schema::builder()
            .attribute(Attribute::new("foo", AttributeType::Any))
            .build()
            .unwrap();

        let diffs = diff_schemas(&old, &new).unwrap();
        assert_eq!(
            diffs,
            vec![SchemaDiff::AttributeAdded {
                new: Attribute::new("foo", AttributeType::Any)
            }]
        );
    }

    #[test]
    fn test_identical_schemas_produce_no_diffs() {
        let schema = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::U32))
            .index(IndexDefinition::new("idx", vec![IndexAttribute::asc("a")]))
            .build()
            .unwrap();

        assert!(diff_schemas(&schema, &schema).unwrap().is_empty());
    }

    #[test]
    fn test_attribute_modify_on_type_change() {
        let old = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::I8))
            .build()
            .unwrap();
        let new = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::I32))
            .build()
            .unwrap();

        let diffs = diff_schemas(&old, &new).unwrap();
        assert!(matches!(&diffs[..], [SchemaDiff::AttributeModified { .. }]));
    }

    #[test]
    fn test_attribute_modify_on_nullability_change() {
        let old = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::I8))
            .build()
            .unwrap();
        let new = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::I8).non_nullable())
            .build()
            .unwrap();

        let diffs = diff_schemas(&old, &new).unwrap();
        assert!(matches!(&diffs[..], [SchemaDiff::AttributeModified { .. }]));
    }

    #[test]
    fn test_attribute_rename() {
        let old = Schema::builder()
            .attribute(Attribute::new("old_name", AttributeType::Utf8Text))
            .build()
            .unwrap();
        let new = Schema::builder()
            .attribute(Attribute::new("new_name", AttributeType::Utf8Text).renamed_from("old_name"))
            .build()
            .unwrap();

        let diffs = diff_schemas(&old, &new).unwrap();
        assert!(matches!(
            &diffs[..],
            [SchemaDiff::AttributeRenamed { old, new }]
                if old.name == "old_name" && new.name == "new_name"
        ));
    }

    #[test]
    fn test_rename_target_must_exist() {
        let old = empty_schema();
        let new = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::Any).renamed_from("ghost"))
            .build()
            .unwrap();

        assert!(matches!(
            diff_schemas(&old, &new),
            Err(ValidationError::UnknownRenameTarget { target, .. }) if target == "ghost"
        ));
    }

    #[test]
    fn test_attribute_remove() {
        let old = Schema::builder()
            .attribute(Attribute::new("gone", AttributeType::Boolean))
            .build()
            .unwrap();
        let new = empty_schema();

        let diffs = diff_schemas(&old, &new).unwrap();
        assert!(matches!(
            &diffs[..],
            [SchemaDiff::AttributeRemoved { old }] if old.name == "gone"
        ));
    }

    #[test]
    fn test_renamed_attribute_not_reported_removed() {
        let old = Schema::builder()
            .attribute(Attribute::new("before", AttributeType::U8))
            .build()
            .unwrap();
        let new = Schema::builder()
            .attribute(Attribute::new("after", AttributeType::U8).renamed_from("before"))
            .build()
            .unwrap();

        let diffs = diff_schemas(&old, &new).unwrap();
        assert_eq!(diffs.len(), 1);
        assert!(matches!(diffs[0], SchemaDiff::AttributeRenamed { .. }));
    }

    #[test]
    fn test_attribute_diffs_precede_index_diffs() {
        let old = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::U32))
            .build()
            .unwrap();
        let new = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::U32))
            .attribute(Attribute::new("b", AttributeType::U32))
            .index(IndexDefinition::new("idx_b", vec![IndexAttribute::asc("b")]))
            .build()
            .unwrap();

        let diffs = diff_schemas(&old, &new).unwrap();
        assert!(matches!(
            &diffs[..],
            [SchemaDiff::AttributeAdded { .. }, SchemaDiff::IndexAdded { .. }]
        ));
    }

    #[test]
    fn test_index_modify_on_column_transform_change() {
        let old = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::Utf8Text))
            .index(IndexDefinition::new("idx", vec![IndexAttribute::asc("a")]))
            .build()
            .unwrap();
        let new = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::Utf8Text))
            .index(IndexDefinition::new(
                "idx",
                vec![IndexAttribute::asc("a").with_transform(IndexTransform::Lowercase)],
            ))
            .build()
            .unwrap();

        let diffs = diff_schemas(&old, &new).unwrap();
        assert!(matches!(&diffs[..], [SchemaDiff::IndexModified { .. }]));
    }

    #[test]
    fn test_index_rename_and_remove() {
        let old = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::U32))
            .attribute(Attribute::new("b", AttributeType::U32))
            .index(IndexDefinition::new("idx_a", vec![IndexAttribute::asc("a")]))
            .index(IndexDefinition::new("idx_b", vec![IndexAttribute::asc("b")]))
            .build()
            .unwrap();
        let new = Schema::builder()
            .attribute(Attribute::new("a", AttributeType::U32))
            .attribute(Attribute::new("b", AttributeType::U32))
            .index(
                IndexDefinition::new("idx_a2", vec![IndexAttribute::asc("a")])
                    .renamed_from("idx_a"),
            )
            .build()
            .unwrap();

        let diffs = diff_schemas(&old, &new).unwrap();
        assert!(matches!(
            &diffs[..],
            [
                SchemaDiff::IndexRenamed { .. },
                SchemaDiff::IndexRemoved { old }
            ] if old.name == "idx_b"
        ));
    }
}
