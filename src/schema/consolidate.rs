//! Schema consolidation
//!
//! Converts raw field tuples into canonical `Field` records, recursing into
//! element and field types. The input is never mutated and consolidating a
//! consolidated tree yields an identical tree.

use super::errors::SchemaResult;
use super::types::{ArrayType, FieldDecl, Schema, StructureType};
use super::validator::parse_field_tuple;

/// Returns the canonical form of a schema tree.
///
/// # Errors
///
/// Fails on malformed field tuples. Run [`validate`](super::validate) first
/// for complete checking.
pub fn consolidate(schema: &Schema) -> SchemaResult<Schema> {
    consolidate_node(schema, "")
}

fn consolidate_node(node: &Schema, parent_path: &str) -> SchemaResult<Schema> {
    let path = if parent_path.is_empty() {
        node.display_name().to_string()
    } else {
        format!("{}.{}", parent_path, node.display_name())
    };

    match node {
        Schema::Array(array) => Ok(Schema::Array(ArrayType {
            element_type: Box::new(consolidate_node(&array.element_type, &path)?),
            ..array.clone()
        })),
        Schema::Structure(structure) => {
            let mut fields = Vec::with_capacity(structure.fields.len());
            for decl in &structure.fields {
                let mut field = match decl {
                    FieldDecl::Field(field) => field.clone(),
                    FieldDecl::Tuple(slots) => parse_field_tuple(&path, slots)?,
                };
                field.schema = consolidate_node(&field.schema, &format!("{}.{}", path, field.name))?;
                fields.push(FieldDecl::Field(field));
            }
            Ok(Schema::Structure(StructureType {
                fields,
                name: structure.name.clone(),
                accessor: structure.accessor.clone(),
            }))
        }
        atomic => Ok(atomic.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{ElementKind, Field, Slot, READ_ONLY};

    #[test]
    fn test_atomic_unchanged() {
        let node = Schema::number(ElementKind::Int16);
        assert_eq!(consolidate(&node).unwrap(), node);
    }

    #[test]
    fn test_tuples_become_fields() {
        let node = Schema::structure(vec![
            FieldDecl::from(("a", Schema::bool())),
            FieldDecl::from(("b", Schema::bool(), READ_ONLY)),
        ]);

        let consolidated = consolidate(&node).unwrap();
        let expected = Schema::structure(vec![
            Field::new("a", Schema::bool()),
            Field::new("b", Schema::bool()).with_read_only(true),
        ]);
        assert_eq!(consolidated, expected);
    }

    #[test]
    fn test_recurses_through_arrays() {
        let inner = Schema::structure(vec![FieldDecl::from(("x", Schema::bool()))]);
        let node = Schema::array(Schema::array(inner, 2), 3);

        let consolidated = consolidate(&node).unwrap();
        let Schema::Array(outer) = &consolidated else {
            panic!("expected an array");
        };
        let Schema::Array(middle) = outer.element_type.as_ref() else {
            panic!("expected an array");
        };
        let Schema::Structure(structure) = middle.element_type.as_ref() else {
            panic!("expected a structure");
        };
        assert!(structure.fields.iter().all(|decl| decl.as_field().is_some()));
    }

    #[test]
    fn test_idempotent() {
        let node = Schema::structure(vec![
            FieldDecl::from(("a", Schema::array(Schema::bool(), 2))),
            FieldDecl::from(Field::new("b", Schema::object())),
        ]);
        let once = consolidate(&node).unwrap();
        let twice = consolidate(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_malformed_tuple_fails() {
        let node = Schema::structure(vec![FieldDecl::Tuple(vec![Slot::from("a")])]);
        assert!(consolidate(&node).is_err());
    }
}
