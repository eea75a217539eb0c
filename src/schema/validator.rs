//! Schema validator
//!
//! Walks a schema tree and checks every node against the attribute contract
//! of its variant, accumulating a dotted path for error messages.
//!
//! Failure conditions:
//! - A variant kind given where a node instance was expected
//! - A value that is not a schema node given as a data type
//! - A required attribute set to `None`
//! - An attribute of the wrong instance type or class family
//! - A malformed field tuple, or field elements of the wrong type
//! - Duplicate field names in a structure (integrity violation)
//!
//! Validation short-circuits on the first error. There is no lenient mode.

use tracing::trace;

use super::errors::{SchemaError, SchemaResult};
use super::types::{Attr, Field, FieldDecl, Schema, SchemaKind, Shape, Slot};
use crate::value::Value;
use crate::view::Arity;

/// Type families an attribute can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeTag {
    Bool,
    Int,
    /// Any host or fixed-width number
    Number,
    Bytes,
    Str,
    Tuple,
    List,
    /// Anything at all
    Any,
    /// Any schema node
    Node,
    /// Numeric element kinds
    NumericKind,
    /// Views constructed from `(data, index)`
    CellView,
    /// Views constructed from `(data)`
    SegmentView,
}

impl TypeTag {
    fn names(&self) -> &'static [&'static str] {
        match self {
            TypeTag::Bool => &["bool"],
            TypeTag::Int => &["int"],
            TypeTag::Number => &["Number", "number"],
            TypeTag::Bytes => &["bytes"],
            TypeTag::Str => &["str"],
            TypeTag::Tuple => &["tuple"],
            TypeTag::List => &["list"],
            TypeTag::Any => &["object"],
            TypeTag::Node => &["Bool", "Object", "Number", "Bytes", "Text", "Array", "Structure"],
            TypeTag::NumericKind => &["integer", "floating", "complexfloating"],
            TypeTag::CellView => &["CellView"],
            TypeTag::SegmentView => &["SegmentView"],
        }
    }

    fn is_instance(&self, attribute: &Attr) -> bool {
        match (self, attribute) {
            (TypeTag::Any, _) => !attribute.is_none(),
            (TypeTag::Bool, Attr::Value(Value::Bool(_))) => true,
            (TypeTag::Int, Attr::Int(_) | Attr::Shape(Shape::Dim(_)) | Attr::Value(Value::Int(_))) => true,
            (TypeTag::Number, Attr::Value(value)) => value.is_number(),
            (TypeTag::Bytes, Attr::Value(Value::Bytes(_))) => true,
            (TypeTag::Str, Attr::Name(_) | Attr::Value(Value::Text(_))) => true,
            (TypeTag::Tuple, Attr::Shape(Shape::Dims(_)) | Attr::Fields(_) | Attr::Value(Value::Tuple(_))) => true,
            (TypeTag::List, Attr::Value(Value::List(_))) => true,
            (TypeTag::Node, Attr::Node(_)) => true,
            _ => false,
        }
    }

    fn is_subclass(&self, attribute: &Attr) -> bool {
        match (self, attribute) {
            (TypeTag::NumericKind, Attr::Kind(kind)) => kind.is_numeric(),
            (TypeTag::CellView, Attr::Accessor(view)) => view.accepts(Arity::Cell),
            (TypeTag::SegmentView, Attr::Accessor(view)) => view.accepts(Arity::Segment),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Expect {
    Instance(&'static [TypeTag]),
    Subclass(&'static [TypeTag]),
}

/// Contract of a single attribute.
#[derive(Debug, Clone, Copy)]
struct AttributeCheck {
    name: &'static str,
    expect: Expect,
    allow_none: bool,
}

const fn instance(name: &'static str, types: &'static [TypeTag], allow_none: bool) -> AttributeCheck {
    AttributeCheck {
        name,
        expect: Expect::Instance(types),
        allow_none,
    }
}

const fn subclass(name: &'static str, types: &'static [TypeTag], allow_none: bool) -> AttributeCheck {
    AttributeCheck {
        name,
        expect: Expect::Subclass(types),
        allow_none,
    }
}

const CELL_ACCESSOR: AttributeCheck = subclass("accessor", &[TypeTag::CellView], true);
const SEGMENT_ACCESSOR: AttributeCheck = subclass("accessor", &[TypeTag::SegmentView], true);

const BOOL_CHECKS: &[AttributeCheck] = &[instance("default", &[TypeTag::Bool], false), CELL_ACCESSOR];

const OBJECT_CHECKS: &[AttributeCheck] = &[instance("default", &[TypeTag::Any], true), CELL_ACCESSOR];

const NUMBER_CHECKS: &[AttributeCheck] = &[
    subclass("kind", &[TypeTag::NumericKind], false),
    instance("default", &[TypeTag::Number], false),
    CELL_ACCESSOR,
];

const BYTES_CHECKS: &[AttributeCheck] = &[
    instance("length", &[TypeTag::Int], false),
    instance("default", &[TypeTag::Bytes], false),
    CELL_ACCESSOR,
];

const TEXT_CHECKS: &[AttributeCheck] = &[
    instance("length", &[TypeTag::Int], false),
    instance("default", &[TypeTag::Str], false),
    CELL_ACCESSOR,
];

const ARRAY_CHECKS: &[AttributeCheck] = &[
    instance("element_type", &[TypeTag::Node], false),
    instance("shape", &[TypeTag::Int, TypeTag::Tuple], false),
    instance("name", &[TypeTag::Str], true),
    SEGMENT_ACCESSOR,
];

const STRUCTURE_CHECKS: &[AttributeCheck] = &[
    instance("fields", &[TypeTag::List, TypeTag::Tuple], false),
    instance("name", &[TypeTag::Str], true),
    SEGMENT_ACCESSOR,
];

fn checks_for(kind: SchemaKind) -> &'static [AttributeCheck] {
    match kind {
        SchemaKind::Bool => BOOL_CHECKS,
        SchemaKind::Object => OBJECT_CHECKS,
        SchemaKind::Number => NUMBER_CHECKS,
        SchemaKind::Bytes => BYTES_CHECKS,
        SchemaKind::Text => TEXT_CHECKS,
        SchemaKind::Array => ARRAY_CHECKS,
        SchemaKind::Structure => STRUCTURE_CHECKS,
    }
}

fn type_names(types: &[TypeTag]) -> Vec<&'static str> {
    types.iter().flat_map(|tag| tag.names().iter().copied()).collect()
}

impl AttributeCheck {
    fn apply(&self, path: &str, attribute: &Attr) -> SchemaResult<()> {
        if attribute.is_none() {
            if self.allow_none {
                return Ok(());
            }
            return Err(SchemaError::missing_attribute(path, self.name));
        }

        match self.expect {
            Expect::Instance(types) => {
                if !types.iter().any(|tag| tag.is_instance(attribute)) {
                    return Err(SchemaError::wrong_instance(
                        path,
                        self.name,
                        &type_names(types),
                        &attribute.type_name(),
                    ));
                }
            }
            Expect::Subclass(types) => {
                if !attribute.is_class() {
                    return Err(SchemaError::not_a_class(path, self.name, self.allow_none));
                }
                if !types.iter().any(|tag| tag.is_subclass(attribute)) {
                    return Err(SchemaError::not_a_subclass(
                        path,
                        self.name,
                        &type_names(types),
                        &attribute.type_name(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Validates a schema tree.
///
/// # Errors
///
/// Returns `SchemaError` with code `STRATA_SCHEMA_CONTRACT` for contract
/// violations and `STRATA_SCHEMA_DUPLICATE_FIELD` for duplicate field names.
pub fn validate(schema: &Schema) -> SchemaResult<()> {
    check_node(schema, "")
}

/// Validates a loosely-typed declaration at the root.
///
/// Rejects bare variant kinds and plain values with the root-level messages.
pub fn validate_slot(slot: &Slot) -> SchemaResult<()> {
    match slot {
        Slot::Node(node) => validate(node),
        Slot::Kind(kind) => Err(SchemaError::type_not_instance("", *kind)),
        Slot::Value(value) => Err(SchemaError::unsupported_type("", value.type_name())),
    }
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

fn check_node(node: &Schema, parent_path: &str) -> SchemaResult<()> {
    let path = join_path(parent_path, node.display_name());
    trace!(path = %path, kind = %node.kind(), "validating schema node");

    for check in checks_for(node.kind()) {
        let attribute = node.attribute(check.name)?;
        check.apply(&path, &attribute)?;
    }

    match node {
        Schema::Bytes(bytes) => check_length(&path, bytes.length),
        Schema::Text(text) => check_length(&path, text.length),
        Schema::Array(array) => {
            if array.shape.dims().iter().any(|&dim| dim < 0) {
                return Err(SchemaError::negative_dimension(
                    &path,
                    "shape",
                    &array.shape.to_string(),
                ));
            }
            check_node(&array.element_type, &path)
        }
        Schema::Structure(structure) => check_fields(&path, &structure.fields),
        Schema::Bool(_) | Schema::Object(_) | Schema::Number(_) => Ok(()),
    }
}

fn check_length(path: &str, length: i64) -> SchemaResult<()> {
    if length < 0 {
        return Err(SchemaError::negative_dimension(path, "length", &length.to_string()));
    }
    Ok(())
}

fn check_fields(path: &str, fields: &[FieldDecl]) -> SchemaResult<()> {
    for decl in fields {
        let parsed;
        let field = match decl {
            FieldDecl::Field(field) => field,
            FieldDecl::Tuple(slots) => {
                parsed = parse_field_tuple(path, slots)?;
                &parsed
            }
        };
        check_node(&field.schema, &join_path(path, &field.name))?;
    }

    let duplicates = find_duplicate_fields(fields);
    if !duplicates.is_empty() {
        return Err(SchemaError::duplicate_fields(path, &duplicates));
    }
    Ok(())
}

/// Field names that occur more than once, in first-occurrence order.
fn find_duplicate_fields(fields: &[FieldDecl]) -> Vec<&str> {
    let names: Vec<&str> = fields.iter().filter_map(FieldDecl::name).collect();
    let mut duplicates: Vec<&str> = Vec::new();
    for (i, name) in names.iter().enumerate() {
        if names[i + 1..].contains(name) && !duplicates.contains(name) {
            duplicates.push(name);
        }
    }
    duplicates
}

fn tuple_repr(slots: &[Slot]) -> String {
    let items: Vec<String> = slots.iter().map(|slot| slot.to_string()).collect();
    if items.len() == 1 {
        format!("({},)", items[0])
    } else {
        format!("({})", items.join(", "))
    }
}

/// Turns a raw `(name, type[, read_only])` tuple into a canonical field.
///
/// `path` is the path of the structure holding the field.
pub(crate) fn parse_field_tuple(path: &str, slots: &[Slot]) -> SchemaResult<Field> {
    if !(2..=Field::ATTRIBUTES.len()).contains(&slots.len()) {
        return Err(SchemaError::malformed_field(path, &tuple_repr(slots)));
    }

    let name = match &slots[0] {
        Slot::Value(Value::Text(name)) => name.clone(),
        other => return Err(SchemaError::field_name_type(path, &other.type_name())),
    };

    let schema = match &slots[1] {
        Slot::Node(node) => node.clone(),
        Slot::Kind(kind) => {
            return Err(SchemaError::type_not_instance(&join_path(path, &name), *kind))
        }
        Slot::Value(value) => return Err(SchemaError::field_type_type(path, value.type_name())),
    };

    let read_only = match slots.get(2) {
        None => false,
        Some(Slot::Value(Value::Bool(read_only))) => *read_only,
        Some(other) => return Err(SchemaError::field_read_only_type(path, &other.type_name())),
    };

    Ok(Field {
        name,
        schema,
        read_only,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::SchemaErrorCode;
    use crate::schema::types::{ArrayType, ElementKind, NumberType, StructureType, READ_ONLY};

    fn particle_fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::from(("id", Schema::number(ElementKind::UInt32), READ_ONLY)),
            FieldDecl::from(("mass", Schema::number(ElementKind::Float32))),
        ]
    }

    #[test]
    fn test_valid_schema_passes() {
        let particle = StructureType::new(particle_fields()).with_name("Particle");
        assert!(validate(&particle.into()).is_ok());
    }

    #[test]
    fn test_root_kind_rejected() {
        let err = validate_slot(&Slot::Kind(SchemaKind::Number)).unwrap_err();
        assert_eq!(
            err.message(),
            "The data type is expected to be an instance object but got the type 'Number' instead."
        );
    }

    #[test]
    fn test_plain_value_rejected() {
        let err = validate_slot(&Slot::Value(Value::Int(123))).unwrap_err();
        assert_eq!(
            err.message(),
            "Objects of type 'int' aren't supported as data types. Use any type from 'Bool', 'Object', 'Number', 'Bytes', 'Text', 'Array', or 'Structure' instead."
        );
    }

    #[test]
    fn test_missing_default() {
        let node = Schema::from(NumberType::new(ElementKind::Int32).with_default(Value::None));
        let err = validate(&node).unwrap_err();
        assert_eq!(err.message(), "The attribute 'Number.default' cannot be 'None'.");
        assert_eq!(err.code(), SchemaErrorCode::StrataSchemaContract);
    }

    #[test]
    fn test_non_numeric_kind() {
        let err = validate(&Schema::number(ElementKind::Text)).unwrap_err();
        assert_eq!(
            err.message(),
            "The attribute 'Number.kind' is expected to be a subclass of 'integer', 'floating', or 'complexfloating', not 'text'."
        );
    }

    #[test]
    fn test_wrong_default_instance() {
        let node = Schema::from(NumberType::new(ElementKind::Int32).with_default("abc"));
        let err = validate(&node).unwrap_err();
        assert_eq!(
            err.message(),
            "The attribute 'Number.default' is expected to be an instance object of type 'Number', or 'number', not 'str'."
        );
    }

    #[test]
    fn test_nested_path_uses_names() {
        let fields = vec![FieldDecl::from((
            "mass",
            NumberType::new(ElementKind::Float32).with_default(Value::None),
        ))];
        let node = Schema::from(StructureType::new(fields).with_name("Particle"));
        let err = validate(&node).unwrap_err();
        assert_eq!(
            err.message(),
            "The attribute 'Particle.mass.Number.default' cannot be 'None'."
        );
    }

    #[test]
    fn test_array_element_checked() {
        let node = Schema::from(
            ArrayType::new(Schema::text(-2), 3).with_name("Labels"),
        );
        let err = validate(&node).unwrap_err();
        assert_eq!(err.path(), Some("Labels.Text.length"));
    }

    #[test]
    fn test_negative_shape_rejected() {
        let err = validate(&Schema::array(Schema::bool(), Shape::Dims(vec![2, -1]))).unwrap_err();
        assert_eq!(
            err.message(),
            "The attribute 'Array.shape' is expected to hold non-negative integers, not (2, -1)."
        );
    }

    #[test]
    fn test_field_kind_instead_of_instance() {
        let fields = vec![FieldDecl::Tuple(vec![Slot::from("x"), Slot::Kind(SchemaKind::Number)])];
        let node = Schema::from(StructureType::new(fields).with_name("Star"));
        let err = validate(&node).unwrap_err();
        assert_eq!(
            err.message(),
            "The data type for 'Star.x' is expected to be an instance object but got the type 'Number' instead."
        );
    }

    #[test]
    fn test_malformed_field_tuple() {
        let fields = vec![FieldDecl::Tuple(vec![Slot::from("abc")])];
        let err = validate(&Schema::structure(fields)).unwrap_err();
        assert_eq!(
            err.message(),
            "Each field from the attribute 'Structure.fields' is expected to be a tuple compatible with 'Field' but got '('abc',)' instead."
        );
    }

    #[test]
    fn test_field_element_types() {
        let bad_name = vec![FieldDecl::Tuple(vec![Slot::from(123i64), Slot::from(Schema::bool())])];
        let err = validate(&Schema::structure(bad_name)).unwrap_err();
        assert!(err.message().contains("that is the field name"));
        assert!(err.message().ends_with("not 'int'."));

        let bad_type = vec![FieldDecl::Tuple(vec![Slot::from("a"), Slot::from(1.5)])];
        let err = validate(&Schema::structure(bad_type)).unwrap_err();
        assert!(err.message().contains("that is the field type"));
        assert!(err.message().ends_with("not 'float'."));

        let bad_flag = vec![FieldDecl::Tuple(vec![
            Slot::from("a"),
            Slot::from(Schema::bool()),
            Slot::from(1i64),
        ])];
        let err = validate(&Schema::structure(bad_flag)).unwrap_err();
        assert_eq!(
            err.message(),
            "The third element of each field from the attribute 'Structure.fields', that is the 'read_only' attribute, is expected to be an instance object of type 'bool', not 'int'."
        );
    }

    #[test]
    fn test_duplicate_fields() {
        let fields = vec![
            FieldDecl::from(("id", Schema::bool())),
            FieldDecl::from(("mass", Schema::bool())),
            FieldDecl::from(("id", Schema::bool())),
            FieldDecl::from(("mass", Schema::bool())),
            FieldDecl::from(("id", Schema::bool())),
        ];
        let err = validate(&StructureType::new(fields).with_name("Particle").into()).unwrap_err();
        assert!(err.is_integrity());
        assert_eq!(
            err.message(),
            "The structure fields 'id', and 'mass', were provided multiple times in 'Particle.fields'."
        );
    }

    #[test]
    fn test_parse_field_tuple_fills_read_only() {
        let field = parse_field_tuple("S", &[Slot::from("a"), Slot::from(Schema::bool())]).unwrap();
        assert_eq!(field, Field::new("a", Schema::bool()));
    }
}
