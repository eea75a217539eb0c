//! Layout resolution
//!
//! Produces the descriptor an array library needs to allocate a contiguous
//! buffer for a schema. The descriptor is plain data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{consolidate, ElementKind, SchemaResult, Schema, Shape};

/// Memory layout descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// A single fixed-size cell
    Scalar(ElementKind),
    /// A fixed-length string cell
    Sized { kind: ElementKind, length: i64 },
    /// A fixed-shape repetition of an element layout
    Array { element: Box<Layout>, shape: Shape },
    /// Named fields, in declaration order
    Structure(Vec<(String, Layout)>),
}

impl Layout {
    /// Packed size in bytes of one element of this layout, or `None` when
    /// it does not fit in `usize`.
    pub fn item_size(&self) -> Option<usize> {
        match self {
            Layout::Scalar(kind) => Some(kind.size()),
            Layout::Sized { kind, length } => {
                kind.size().checked_mul(usize::try_from(*length).unwrap_or(0))
            }
            Layout::Array { element, shape } => match shape.element_count()? {
                0 => Some(0),
                count => element.item_size()?.checked_mul(count),
            },
            Layout::Structure(fields) => fields
                .iter()
                .try_fold(0usize, |size, (_, layout)| size.checked_add(layout.item_size()?)),
        }
    }

    /// Structure fields as `(name, byte offset, layout)`; empty for other
    /// layouts. Offsets past an oversized field are `None`.
    pub fn fields(&self) -> Vec<(&str, Option<usize>, &Layout)> {
        let Layout::Structure(fields) = self else {
            return Vec::new();
        };

        let mut offset = Some(0usize);
        fields
            .iter()
            .map(|(name, layout)| {
                let entry = (name.as_str(), offset, layout);
                offset = offset
                    .zip(layout.item_size())
                    .and_then(|(offset, size)| offset.checked_add(size));
                entry
            })
            .collect()
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Scalar(kind) => write!(f, "{}", kind.code()),
            Layout::Sized { kind, length } => write!(f, "{}{}", kind.code(), length),
            Layout::Array { element, shape } => write!(f, "({}, {})", element, shape),
            Layout::Structure(fields) => {
                write!(f, "[")?;
                for (i, (name, layout)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "('{}', {})", name, layout)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Resolves the layout descriptor of a schema.
pub fn resolve_layout(schema: &Schema) -> SchemaResult<Layout> {
    Ok(layout_of(&consolidate(schema)?))
}

/// Layout of a consolidated node.
///
/// A one-element shape tuple is collapsed to a bare dimension: nested
/// single-dimension tuple shapes are rejected by array libraries.
pub(crate) fn layout_of(node: &Schema) -> Layout {
    match node {
        Schema::Bool(_) => Layout::Scalar(ElementKind::Bool),
        Schema::Object(_) => Layout::Scalar(ElementKind::Object),
        Schema::Number(number) => Layout::Scalar(number.kind),
        Schema::Bytes(bytes) => Layout::Sized {
            kind: ElementKind::Bytes,
            length: bytes.length,
        },
        Schema::Text(text) => Layout::Sized {
            kind: ElementKind::Text,
            length: text.length,
        },
        Schema::Array(array) => Layout::Array {
            element: Box::new(layout_of(&array.element_type)),
            shape: array.shape.collapsed(),
        },
        Schema::Structure(structure) => Layout::Structure(
            structure
                .canonical_fields()
                .map(|field| (field.name.clone(), layout_of(&field.schema)))
                .collect(),
        ),
    }
}
