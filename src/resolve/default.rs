//! Default value resolution
//!
//! Atomic defaults are coerced into their element kind. Array defaults are
//! built by repeating the element default through every dimension, deep
//! copying at each level, so that no two elements share a mutable object.

use crate::schema::{consolidate, Schema, SchemaError, SchemaResult};
use crate::value::{Record, Scalar, Value};

/// Type name of a structure default record.
fn record_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => format!("StructureDefault_{}", name),
        _ => "StructureDefault".to_string(),
    }
}

/// Resolves the default value of a schema.
///
/// With `listify`, every repetition level and every structure becomes a
/// `Value::List`, which allows assigning into elements afterwards. Otherwise
/// arrays are tuples and structures are named records.
pub fn resolve_default(schema: &Schema, listify: bool) -> SchemaResult<Value> {
    default_of(&consolidate(schema)?, listify, "")
}

/// Default of a consolidated node.
pub(crate) fn default_of(node: &Schema, listify: bool, parent_path: &str) -> SchemaResult<Value> {
    let path = if parent_path.is_empty() {
        node.display_name().to_string()
    } else {
        format!("{}.{}", parent_path, node.display_name())
    };

    match node {
        Schema::Bool(bool_type) => Ok(Value::Bool(bool_type.default.truthy())),
        Schema::Object(object) => Ok(object.default.deep_copy()),
        Schema::Number(number) => Scalar::coerce(number.kind, &number.default)
            .map(Value::Number)
            .ok_or_else(|| {
                SchemaError::uncoercible_default(&path, number.kind.name(), number.default.type_name())
            }),
        Schema::Bytes(bytes) => match &bytes.default {
            Value::Bytes(b) => Ok(Value::Bytes(b.clone())),
            Value::Text(s) => Ok(Value::Bytes(s.clone().into_bytes())),
            other => Err(SchemaError::uncoercible_default(&path, "bytes", other.type_name())),
        },
        Schema::Text(text) => match &text.default {
            Value::Text(s) => Ok(Value::Text(s.clone())),
            Value::Bytes(b) => Ok(Value::Text(String::from_utf8_lossy(b).into_owned())),
            other => Err(SchemaError::uncoercible_default(&path, "text", other.type_name())),
        },
        Schema::Array(array) => {
            let mut current = default_of(&array.element_type, listify, &path)?;
            for &dim in array.shape.dims().iter().rev() {
                let count = usize::try_from(dim).unwrap_or(0);
                let items: Vec<Value> = (0..count).map(|_| current.deep_copy()).collect();
                current = if listify {
                    Value::List(items)
                } else {
                    Value::Tuple(items)
                };
            }
            Ok(current)
        }
        Schema::Structure(structure) => {
            let mut entries = Vec::new();
            for field in structure.canonical_fields() {
                let value = default_of(&field.schema, listify, &format!("{}.{}", path, field.name))?;
                entries.push((field.name.clone(), value));
            }
            if listify {
                Ok(Value::List(entries.into_iter().map(|(_, value)| value).collect()))
            } else {
                Ok(Value::Record(Record::new(
                    record_name(structure.name.as_deref()),
                    entries,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArrayType, ElementKind, FieldDecl, NumberType, ObjectType, Shape, StructureType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_number_default_coerced() {
        let node = Schema::from(NumberType::new(ElementKind::UInt32).with_default(-1));
        assert_eq!(
            resolve_default(&node, false).unwrap(),
            Value::Number(Scalar::UInt32(u32::MAX))
        );

        let node = Schema::from(NumberType::new(ElementKind::Float32).with_default(1));
        assert_eq!(
            resolve_default(&node, false).unwrap(),
            Value::Number(Scalar::Float32(1.0))
        );
    }

    #[test]
    fn test_uncoercible_default() {
        let node = Schema::from(NumberType::new(ElementKind::Int8).with_default("x"));
        let err = resolve_default(&node, false).unwrap_err();
        assert_eq!(
            err.message(),
            "The attribute 'Number.default' cannot be converted into 'int8', got 'str'."
        );
    }

    #[test]
    fn test_array_repeats_innermost_first() {
        let node = Schema::array(
            NumberType::new(ElementKind::Int32).with_default(7),
            Shape::Dims(vec![2, 3]),
        );
        let seven = Value::Number(Scalar::Int32(7));
        let row = Value::Tuple(vec![seven.clone(), seven.clone(), seven]);
        assert_eq!(
            resolve_default(&node, false).unwrap(),
            Value::Tuple(vec![row.clone(), row])
        );
    }

    #[test]
    fn test_listify() {
        let node = Schema::array(Schema::bool(), 2);
        assert_eq!(
            resolve_default(&node, true).unwrap(),
            Value::List(vec![Value::Bool(false), Value::Bool(false)])
        );
    }

    #[test]
    fn test_object_defaults_never_alias() {
        let node = Schema::array(
            ObjectType::default().with_default(Value::shared(Value::List(vec![]))),
            2,
        );
        let default = resolve_default(&node, false).unwrap();
        let items = default.items().unwrap();
        let (Some(a), Some(b)) = (items[0].as_object(), items[1].as_object()) else {
            panic!("expected objects");
        };
        assert!(!a.ptr_eq(b));
    }

    #[test]
    fn test_structure_record_name() {
        let fields = vec![FieldDecl::from(("a", Schema::bool()))];
        let named = Schema::from(StructureType::new(fields.clone()).with_name("Point"));
        let Value::Record(record) = resolve_default(&named, false).unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(record.name(), "StructureDefault_Point");

        let anonymous = Schema::structure(fields);
        assert_eq!(
            resolve_default(&anonymous, false).unwrap().to_string(),
            "StructureDefault(a=False)"
        );
        assert_eq!(
            resolve_default(&anonymous, true).unwrap(),
            Value::List(vec![Value::Bool(false)])
        );
    }

    #[test]
    fn test_string_defaults() {
        let node = Schema::from(crate::schema::BytesType::new(4).with_default("ab"));
        assert_eq!(resolve_default(&node, false).unwrap(), Value::Bytes(b"ab".to_vec()));

        let node = Schema::from(ArrayType::new(Schema::text(3), 0));
        assert_eq!(resolve_default(&node, false).unwrap(), Value::Tuple(vec![]));
    }
}
