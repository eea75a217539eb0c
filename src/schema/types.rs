//! Schema type definitions
//!
//! Supported variants:
//! - Bool: single boolean element
//! - Object: single reference to an arbitrary object
//! - Number: single fixed-width numeric element
//! - Bytes: fixed-length byte string
//! - Text: fixed-length text string
//! - Array: homogeneous fixed-shape repetition of an element type
//! - Structure: heterogeneous named aggregate
//!
//! Nodes are immutable values. "Updating" one goes through
//! [`Schema::replace`], which returns a new node.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use crate::value::Value;
use crate::view::ViewType;

/// Readability constant for the `read_only` element of a field.
pub const READ_ONLY: bool = true;

/// Primitive element kinds a layout is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Bool,
    Object,
    Bytes,
    Text,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl ElementKind {
    pub const ALL: [ElementKind; 16] = [
        ElementKind::Bool,
        ElementKind::Object,
        ElementKind::Bytes,
        ElementKind::Text,
        ElementKind::Int8,
        ElementKind::Int16,
        ElementKind::Int32,
        ElementKind::Int64,
        ElementKind::UInt8,
        ElementKind::UInt16,
        ElementKind::UInt32,
        ElementKind::UInt64,
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::Complex64,
        ElementKind::Complex128,
    ];

    /// Returns the kind name
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Bool => "bool",
            ElementKind::Object => "object",
            ElementKind::Bytes => "bytes",
            ElementKind::Text => "text",
            ElementKind::Int8 => "int8",
            ElementKind::Int16 => "int16",
            ElementKind::Int32 => "int32",
            ElementKind::Int64 => "int64",
            ElementKind::UInt8 => "uint8",
            ElementKind::UInt16 => "uint16",
            ElementKind::UInt32 => "uint32",
            ElementKind::UInt64 => "uint64",
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
            ElementKind::Complex64 => "complex64",
            ElementKind::Complex128 => "complex128",
        }
    }

    /// Looks a kind up by name.
    ///
    /// The host number names `int`, `float` and `complex` map onto their
    /// 64-bit (128-bit for complex) counterparts.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ElementKind::Int64),
            "float" => Some(ElementKind::Float64),
            "complex" => Some(ElementKind::Complex128),
            _ => Self::ALL.iter().copied().find(|kind| kind.name() == name),
        }
    }

    /// Short descriptor code, in array-library notation
    pub fn code(&self) -> &'static str {
        match self {
            ElementKind::Bool => "?",
            ElementKind::Object => "O",
            ElementKind::Bytes => "S",
            ElementKind::Text => "U",
            ElementKind::Int8 => "i1",
            ElementKind::Int16 => "i2",
            ElementKind::Int32 => "i4",
            ElementKind::Int64 => "i8",
            ElementKind::UInt8 => "u1",
            ElementKind::UInt16 => "u2",
            ElementKind::UInt32 => "u4",
            ElementKind::UInt64 => "u8",
            ElementKind::Float32 => "f4",
            ElementKind::Float64 => "f8",
            ElementKind::Complex64 => "c8",
            ElementKind::Complex128 => "c16",
        }
    }

    /// Size in bytes of one cell. For `Bytes` and `Text` this is the size of
    /// one character.
    pub fn size(&self) -> usize {
        match self {
            ElementKind::Bool | ElementKind::Bytes | ElementKind::Int8 | ElementKind::UInt8 => 1,
            ElementKind::Int16 | ElementKind::UInt16 => 2,
            ElementKind::Text | ElementKind::Int32 | ElementKind::UInt32 | ElementKind::Float32 => 4,
            ElementKind::Int64
            | ElementKind::UInt64
            | ElementKind::Float64
            | ElementKind::Complex64 => 8,
            ElementKind::Complex128 => 16,
            ElementKind::Object => std::mem::size_of::<usize>(),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ElementKind::Int8
                | ElementKind::Int16
                | ElementKind::Int32
                | ElementKind::Int64
                | ElementKind::UInt8
                | ElementKind::UInt16
                | ElementKind::UInt32
                | ElementKind::UInt64
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, ElementKind::Float32 | ElementKind::Float64)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, ElementKind::Complex64 | ElementKind::Complex128)
    }

    /// Integer, floating or complex. Booleans, objects and strings are not
    /// numeric kinds.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating() || self.is_complex()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The closed set of schema variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Bool,
    Object,
    Number,
    Bytes,
    Text,
    Array,
    Structure,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 7] = [
        SchemaKind::Bool,
        SchemaKind::Object,
        SchemaKind::Number,
        SchemaKind::Bytes,
        SchemaKind::Text,
        SchemaKind::Array,
        SchemaKind::Structure,
    ];

    /// Returns the variant name for error messages and paths
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Bool => "Bool",
            SchemaKind::Object => "Object",
            SchemaKind::Number => "Number",
            SchemaKind::Bytes => "Bytes",
            SchemaKind::Text => "Text",
            SchemaKind::Array => "Array",
            SchemaKind::Structure => "Structure",
        }
    }

    /// Case-insensitive lookup by variant name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Atomic variants have no nested element or field types.
    pub fn is_atomic(&self) -> bool {
        !matches!(self, SchemaKind::Array | SchemaKind::Structure)
    }

    /// Attribute names of the variant, in contract order.
    pub fn attributes(&self) -> &'static [&'static str] {
        match self {
            SchemaKind::Bool | SchemaKind::Object => &["default", "accessor"],
            SchemaKind::Number => &["kind", "default", "accessor"],
            SchemaKind::Bytes | SchemaKind::Text => &["length", "default", "accessor"],
            SchemaKind::Array => &["element_type", "shape", "name", "accessor"],
            SchemaKind::Structure => &["fields", "name", "accessor"],
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Array shape: a bare dimension or a tuple of dimensions.
///
/// A bare dimension is shorthand for a one-element tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shape {
    Dim(i64),
    Dims(Vec<i64>),
}

impl Shape {
    /// Dimensions, outermost first.
    pub fn dims(&self) -> Vec<i64> {
        match self {
            Shape::Dim(n) => vec![*n],
            Shape::Dims(dims) => dims.clone(),
        }
    }

    /// Collapses a one-element tuple into a bare dimension.
    pub fn collapsed(&self) -> Shape {
        match self {
            Shape::Dims(dims) if dims.len() == 1 => Shape::Dim(dims[0]),
            other => other.clone(),
        }
    }

    /// Number of elements, counting negative dimensions as empty.
    ///
    /// Returns `None` when the count does not fit in `usize`.
    pub fn element_count(&self) -> Option<usize> {
        let dims = self.dims();
        if dims.iter().any(|&dim| dim <= 0) {
            return Some(0);
        }
        dims.iter().try_fold(1usize, |count, &dim| {
            count.checked_mul(usize::try_from(dim).ok()?)
        })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Dim(n) => write!(f, "{}", n),
            Shape::Dims(dims) if dims.len() == 1 => write!(f, "({},)", dims[0]),
            Shape::Dims(dims) => {
                let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

impl From<i32> for Shape {
    fn from(n: i32) -> Self {
        Shape::Dim(n.into())
    }
}

impl From<i64> for Shape {
    fn from(n: i64) -> Self {
        Shape::Dim(n)
    }
}

impl From<usize> for Shape {
    fn from(n: usize) -> Self {
        Shape::Dim(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<Vec<i64>> for Shape {
    fn from(dims: Vec<i64>) -> Self {
        Shape::Dims(dims)
    }
}

impl<const N: usize> From<[i64; N]> for Shape {
    fn from(dims: [i64; N]) -> Self {
        Shape::Dims(dims.to_vec())
    }
}

/// Boolean element.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolType {
    pub default: Value,
    pub accessor: Option<ViewType>,
}

impl Default for BoolType {
    fn default() -> Self {
        Self {
            default: Value::Bool(false),
            accessor: None,
        }
    }
}

/// Reference to an arbitrary object. No layout constraint applies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    pub default: Value,
    pub accessor: Option<ViewType>,
}

/// Fixed-width numeric element.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberType {
    pub kind: ElementKind,
    pub default: Value,
    pub accessor: Option<ViewType>,
}

impl Default for NumberType {
    fn default() -> Self {
        Self {
            kind: ElementKind::Float64,
            default: Value::Int(0),
            accessor: None,
        }
    }
}

impl NumberType {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

/// Fixed-length byte string.
#[derive(Debug, Clone, PartialEq)]
pub struct BytesType {
    pub length: i64,
    pub default: Value,
    pub accessor: Option<ViewType>,
}

impl BytesType {
    pub fn new(length: i64) -> Self {
        Self {
            length,
            default: Value::Bytes(Vec::new()),
            accessor: None,
        }
    }
}

/// Fixed-length text string.
#[derive(Debug, Clone, PartialEq)]
pub struct TextType {
    pub length: i64,
    pub default: Value,
    pub accessor: Option<ViewType>,
}

impl TextType {
    pub fn new(length: i64) -> Self {
        Self {
            length,
            default: Value::Text(String::new()),
            accessor: None,
        }
    }
}

/// Homogeneous, fixed-shape repetition of an element type.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element_type: Box<Schema>,
    pub shape: Shape,
    /// Display name of the synthesized view
    pub name: Option<String>,
    pub accessor: Option<ViewType>,
}

impl ArrayType {
    pub fn new(element_type: impl Into<Schema>, shape: impl Into<Shape>) -> Self {
        Self {
            element_type: Box::new(element_type.into()),
            shape: shape.into(),
            name: None,
            accessor: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Heterogeneous named aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureType {
    pub fields: Vec<FieldDecl>,
    /// Display name of the synthesized view
    pub name: Option<String>,
    pub accessor: Option<ViewType>,
}

impl StructureType {
    pub fn new<F: Into<FieldDecl>>(fields: impl IntoIterator<Item = F>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            name: None,
            accessor: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Canonical fields. Raw tuples are skipped, so this is only complete on
    /// a consolidated node.
    pub fn canonical_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter_map(FieldDecl::as_field)
    }
}

macro_rules! impl_with_default {
    ($($t:ty),*) => {
        $(
            impl $t {
                pub fn with_default(mut self, default: impl Into<Value>) -> Self {
                    self.default = default.into();
                    self
                }
            }
        )*
    };
}

macro_rules! impl_with_accessor {
    ($($t:ty),*) => {
        $(
            impl $t {
                /// Overrides the view synthesized for this node.
                pub fn with_accessor(mut self, accessor: impl Into<ViewType>) -> Self {
                    self.accessor = Some(accessor.into());
                    self
                }
            }
        )*
    };
}

impl_with_default!(BoolType, ObjectType, NumberType, BytesType, TextType);
impl_with_accessor!(BoolType, ObjectType, NumberType, BytesType, TextType, ArrayType, StructureType);

/// A schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Bool(BoolType),
    Object(ObjectType),
    Number(NumberType),
    Bytes(BytesType),
    Text(TextType),
    Array(ArrayType),
    Structure(StructureType),
}

impl Schema {
    pub fn bool() -> Self {
        Schema::Bool(BoolType::default())
    }

    pub fn object() -> Self {
        Schema::Object(ObjectType::default())
    }

    pub fn number(kind: ElementKind) -> Self {
        Schema::Number(NumberType::new(kind))
    }

    pub fn bytes(length: i64) -> Self {
        Schema::Bytes(BytesType::new(length))
    }

    pub fn text(length: i64) -> Self {
        Schema::Text(TextType::new(length))
    }

    pub fn array(element_type: impl Into<Schema>, shape: impl Into<Shape>) -> Self {
        Schema::Array(ArrayType::new(element_type, shape))
    }

    pub fn structure<F: Into<FieldDecl>>(fields: impl IntoIterator<Item = F>) -> Self {
        Schema::Structure(StructureType::new(fields))
    }

    /// Returns the variant of this node
    pub fn kind(&self) -> SchemaKind {
        match self {
            Schema::Bool(_) => SchemaKind::Bool,
            Schema::Object(_) => SchemaKind::Object,
            Schema::Number(_) => SchemaKind::Number,
            Schema::Bytes(_) => SchemaKind::Bytes,
            Schema::Text(_) => SchemaKind::Text,
            Schema::Array(_) => SchemaKind::Array,
            Schema::Structure(_) => SchemaKind::Structure,
        }
    }

    pub fn is_atomic(&self) -> bool {
        self.kind().is_atomic()
    }

    /// Declared name. Only arrays and structures carry one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Schema::Array(array) => array.name.as_deref(),
            Schema::Structure(structure) => structure.name.as_deref(),
            _ => None,
        }
    }

    /// Path segment of this node: its declared name, or the variant name.
    pub fn display_name(&self) -> &str {
        match self.name() {
            Some(name) if !name.is_empty() => name,
            _ => self.kind().name(),
        }
    }

    /// Caller-supplied view, if any.
    pub fn accessor(&self) -> Option<&ViewType> {
        match self {
            Schema::Bool(node) => node.accessor.as_ref(),
            Schema::Object(node) => node.accessor.as_ref(),
            Schema::Number(node) => node.accessor.as_ref(),
            Schema::Bytes(node) => node.accessor.as_ref(),
            Schema::Text(node) => node.accessor.as_ref(),
            Schema::Array(node) => node.accessor.as_ref(),
            Schema::Structure(node) => node.accessor.as_ref(),
        }
    }

    /// Reads an attribute by name.
    ///
    /// Absent optional attributes come back as `Attr::None`.
    pub fn attribute(&self, name: &str) -> SchemaResult<Attr> {
        let attr = match (self, name) {
            (Schema::Bool(node), "default") => Attr::Value(node.default.clone()),
            (Schema::Object(node), "default") => Attr::Value(node.default.clone()),
            (Schema::Number(node), "kind") => Attr::Kind(node.kind),
            (Schema::Number(node), "default") => Attr::Value(node.default.clone()),
            (Schema::Bytes(node), "length") => Attr::Int(node.length),
            (Schema::Bytes(node), "default") => Attr::Value(node.default.clone()),
            (Schema::Text(node), "length") => Attr::Int(node.length),
            (Schema::Text(node), "default") => Attr::Value(node.default.clone()),
            (Schema::Array(node), "element_type") => Attr::Node((*node.element_type).clone()),
            (Schema::Array(node), "shape") => Attr::Shape(node.shape.clone()),
            (Schema::Array(node), "name") => Attr::from(node.name.clone()),
            (Schema::Structure(node), "fields") => Attr::Fields(node.fields.clone()),
            (Schema::Structure(node), "name") => Attr::from(node.name.clone()),
            (_, "accessor") => self
                .accessor()
                .map_or(Attr::None, |accessor| Attr::Accessor(accessor.clone())),
            _ => return Err(SchemaError::unknown_attributes(self.kind(), &[name])),
        };
        Ok(attr)
    }

    /// Returns a copy of this node with one attribute replaced.
    ///
    /// The attribute must exist on the node's variant and `value` must be
    /// storable in it. Contents are not validated here; run the validator on
    /// the result for that.
    pub fn replace(&self, name: &str, value: Attr) -> SchemaResult<Schema> {
        let kind = self.kind();
        if !kind.attributes().iter().any(|attr| *attr == name) {
            return Err(SchemaError::unknown_attributes(kind, &[name]));
        }

        let path = self.display_name().to_string();
        let mut node = self.clone();
        match name {
            "default" => {
                let default = value.into_value(&path, name)?;
                match &mut node {
                    Schema::Bool(n) => n.default = default,
                    Schema::Object(n) => n.default = default,
                    Schema::Number(n) => n.default = default,
                    Schema::Bytes(n) => n.default = default,
                    Schema::Text(n) => n.default = default,
                    _ => {}
                }
            }
            "accessor" => {
                let accessor = match value {
                    Attr::None => None,
                    Attr::Accessor(accessor) => Some(accessor),
                    _ => return Err(SchemaError::not_a_class(&path, name, true)),
                };
                match &mut node {
                    Schema::Bool(n) => n.accessor = accessor,
                    Schema::Object(n) => n.accessor = accessor,
                    Schema::Number(n) => n.accessor = accessor,
                    Schema::Bytes(n) => n.accessor = accessor,
                    Schema::Text(n) => n.accessor = accessor,
                    Schema::Array(n) => n.accessor = accessor,
                    Schema::Structure(n) => n.accessor = accessor,
                }
            }
            "kind" => {
                let element_kind = match value {
                    Attr::Kind(element_kind) => element_kind,
                    Attr::None => return Err(SchemaError::missing_attribute(&path, name)),
                    _ => return Err(SchemaError::not_a_class(&path, name, false)),
                };
                if let Schema::Number(n) = &mut node {
                    n.kind = element_kind;
                }
            }
            "length" => {
                let length = match value {
                    Attr::Int(length) => length,
                    Attr::None => return Err(SchemaError::missing_attribute(&path, name)),
                    other => {
                        return Err(SchemaError::wrong_instance(&path, name, &["int"], &other.type_name()))
                    }
                };
                match &mut node {
                    Schema::Bytes(n) => n.length = length,
                    Schema::Text(n) => n.length = length,
                    _ => {}
                }
            }
            "element_type" => {
                let element_type = match value {
                    Attr::Node(element_type) => element_type,
                    Attr::None => return Err(SchemaError::missing_attribute(&path, name)),
                    other => {
                        let supported: Vec<&str> =
                            SchemaKind::ALL.iter().map(|kind| kind.name()).collect();
                        return Err(SchemaError::wrong_instance(
                            &path,
                            name,
                            &supported,
                            &other.type_name(),
                        ));
                    }
                };
                if let Schema::Array(n) = &mut node {
                    n.element_type = Box::new(element_type);
                }
            }
            "shape" => {
                let shape = match value {
                    Attr::Shape(shape) => shape,
                    Attr::Int(dim) => Shape::Dim(dim),
                    Attr::None => return Err(SchemaError::missing_attribute(&path, name)),
                    other => {
                        return Err(SchemaError::wrong_instance(
                            &path,
                            name,
                            &["int", "tuple"],
                            &other.type_name(),
                        ))
                    }
                };
                if let Schema::Array(n) = &mut node {
                    n.shape = shape;
                }
            }
            "name" => {
                let declared = match value {
                    Attr::None => None,
                    Attr::Name(declared) => Some(declared),
                    other => {
                        return Err(SchemaError::wrong_instance(&path, name, &["str"], &other.type_name()))
                    }
                };
                match &mut node {
                    Schema::Array(n) => n.name = declared,
                    Schema::Structure(n) => n.name = declared,
                    _ => {}
                }
            }
            "fields" => {
                let fields = match value {
                    Attr::Fields(fields) => fields,
                    Attr::None => return Err(SchemaError::missing_attribute(&path, name)),
                    other => {
                        return Err(SchemaError::wrong_instance(
                            &path,
                            name,
                            &["list", "tuple"],
                            &other.type_name(),
                        ))
                    }
                };
                if let Schema::Structure(n) = &mut node {
                    n.fields = fields;
                }
            }
            _ => return Err(SchemaError::unknown_attributes(kind, &[name])),
        }
        Ok(node)
    }
}

impl From<BoolType> for Schema {
    fn from(node: BoolType) -> Self {
        Schema::Bool(node)
    }
}

impl From<ObjectType> for Schema {
    fn from(node: ObjectType) -> Self {
        Schema::Object(node)
    }
}

impl From<NumberType> for Schema {
    fn from(node: NumberType) -> Self {
        Schema::Number(node)
    }
}

impl From<BytesType> for Schema {
    fn from(node: BytesType) -> Self {
        Schema::Bytes(node)
    }
}

impl From<TextType> for Schema {
    fn from(node: TextType) -> Self {
        Schema::Text(node)
    }
}

impl From<ArrayType> for Schema {
    fn from(node: ArrayType) -> Self {
        Schema::Array(node)
    }
}

impl From<StructureType> for Schema {
    fn from(node: StructureType) -> Self {
        Schema::Structure(node)
    }
}

/// Canonical field of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    /// No setter is generated for read-only fields
    pub read_only: bool,
}

impl Field {
    /// Attribute names of a field, in tuple order.
    pub const ATTRIBUTES: [&'static str; 3] = ["name", "type", "read_only"];

    pub fn new(name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            read_only: false,
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// Loosely-typed element of a raw field tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Node(Schema),
    /// A bare variant where a node instance was meant
    Kind(SchemaKind),
    Value(Value),
}

impl Slot {
    /// Type name used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Slot::Node(node) => node.kind().name().to_string(),
            Slot::Kind(_) => "type".to_string(),
            Slot::Value(value) => value.type_name().to_string(),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Node(node) => write!(f, "{}(..)", node.kind().name()),
            Slot::Kind(kind) => write!(f, "{}", kind.name()),
            Slot::Value(Value::Text(s)) => write!(f, "'{}'", s),
            Slot::Value(value) => write!(f, "{}", value),
        }
    }
}

impl From<Schema> for Slot {
    fn from(node: Schema) -> Self {
        Slot::Node(node)
    }
}

impl From<SchemaKind> for Slot {
    fn from(kind: SchemaKind) -> Self {
        Slot::Kind(kind)
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Value(value)
    }
}

impl From<&str> for Slot {
    fn from(s: &str) -> Self {
        Slot::Value(Value::from(s))
    }
}

impl From<bool> for Slot {
    fn from(b: bool) -> Self {
        Slot::Value(Value::Bool(b))
    }
}

impl From<i64> for Slot {
    fn from(i: i64) -> Self {
        Slot::Value(Value::Int(i))
    }
}

impl From<f64> for Slot {
    fn from(x: f64) -> Self {
        Slot::Value(Value::Float(x))
    }
}

/// A structure field as declared: canonical, or a raw 2–3 element tuple of
/// `(name, type[, read_only])`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDecl {
    Field(Field),
    Tuple(Vec<Slot>),
}

impl FieldDecl {
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            FieldDecl::Field(field) => Some(field),
            FieldDecl::Tuple(_) => None,
        }
    }

    /// Declared name, when it is a string.
    pub fn name(&self) -> Option<&str> {
        match self {
            FieldDecl::Field(field) => Some(&field.name),
            FieldDecl::Tuple(slots) => match slots.first() {
                Some(Slot::Value(Value::Text(name))) => Some(name),
                _ => None,
            },
        }
    }
}

impl From<Field> for FieldDecl {
    fn from(field: Field) -> Self {
        FieldDecl::Field(field)
    }
}

impl From<Vec<Slot>> for FieldDecl {
    fn from(slots: Vec<Slot>) -> Self {
        FieldDecl::Tuple(slots)
    }
}

impl<N: Into<String>, S: Into<Schema>> From<(N, S)> for FieldDecl {
    fn from((name, schema): (N, S)) -> Self {
        FieldDecl::Tuple(vec![
            Slot::Value(Value::Text(name.into())),
            Slot::Node(schema.into()),
        ])
    }
}

impl<N: Into<String>, S: Into<Schema>> From<(N, S, bool)> for FieldDecl {
    fn from((name, schema, read_only): (N, S, bool)) -> Self {
        FieldDecl::Tuple(vec![
            Slot::Value(Value::Text(name.into())),
            Slot::Node(schema.into()),
            Slot::Value(Value::Bool(read_only)),
        ])
    }
}

/// Dynamically-typed attribute value, as read by [`Schema::attribute`] and
/// written by [`Schema::replace`].
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    None,
    Value(Value),
    Int(i64),
    /// Element kind (class-like)
    Kind(ElementKind),
    Shape(Shape),
    Name(String),
    Node(Schema),
    Fields(Vec<FieldDecl>),
    /// View type (class-like)
    Accessor(ViewType),
}

impl Attr {
    /// Absent, or a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Attr::None | Attr::Value(Value::None))
    }

    /// Type-valued attributes.
    pub fn is_class(&self) -> bool {
        matches!(self, Attr::Kind(_) | Attr::Accessor(_))
    }

    /// Type name used in error messages. Class-like attributes report their
    /// own name.
    pub fn type_name(&self) -> String {
        match self {
            Attr::None => "NoneType".to_string(),
            Attr::Value(value) => value.type_name().to_string(),
            Attr::Int(_) => "int".to_string(),
            Attr::Kind(kind) => kind.name().to_string(),
            Attr::Shape(Shape::Dim(_)) => "int".to_string(),
            Attr::Shape(Shape::Dims(_)) => "tuple".to_string(),
            Attr::Name(_) => "str".to_string(),
            Attr::Node(node) => node.kind().name().to_string(),
            Attr::Fields(_) => "tuple".to_string(),
            Attr::Accessor(view) => view.name().to_string(),
        }
    }

    fn into_value(self, path: &str, name: &str) -> SchemaResult<Value> {
        match self {
            Attr::None => Ok(Value::None),
            Attr::Value(value) => Ok(value),
            Attr::Int(i) => Ok(Value::Int(i)),
            Attr::Name(s) => Ok(Value::Text(s)),
            other => Err(SchemaError::wrong_instance(
                path,
                name,
                &["object"],
                &other.type_name(),
            )),
        }
    }
}

impl From<Value> for Attr {
    fn from(value: Value) -> Self {
        Attr::Value(value)
    }
}

impl From<i64> for Attr {
    fn from(i: i64) -> Self {
        Attr::Int(i)
    }
}

impl From<i32> for Attr {
    fn from(i: i32) -> Self {
        Attr::Int(i.into())
    }
}

impl From<ElementKind> for Attr {
    fn from(kind: ElementKind) -> Self {
        Attr::Kind(kind)
    }
}

impl From<Shape> for Attr {
    fn from(shape: Shape) -> Self {
        Attr::Shape(shape)
    }
}

impl From<&str> for Attr {
    fn from(s: &str) -> Self {
        Attr::Name(s.to_string())
    }
}

impl From<String> for Attr {
    fn from(s: String) -> Self {
        Attr::Name(s)
    }
}

impl From<Option<String>> for Attr {
    fn from(s: Option<String>) -> Self {
        s.map_or(Attr::None, Attr::Name)
    }
}

impl From<Schema> for Attr {
    fn from(node: Schema) -> Self {
        Attr::Node(node)
    }
}

impl From<Vec<FieldDecl>> for Attr {
    fn from(fields: Vec<FieldDecl>) -> Self {
        Attr::Fields(fields)
    }
}

impl From<ViewType> for Attr {
    fn from(view: ViewType) -> Self {
        Attr::Accessor(view)
    }
}
