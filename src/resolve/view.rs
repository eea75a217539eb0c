//! Accessor type synthesis
//!
//! An explicit accessor on a node always wins and is returned as is. Atomic
//! nodes without one have no accessor: their cells are read directly. Arrays
//! and structures get a freshly synthesized accessor type on every call.

use tracing::debug;

use crate::schema::{consolidate, ArrayType, Schema, SchemaResult, StructureType};
use crate::view::{ArrayViewType, Fetch, FieldAccess, Strategy, StructureViewType, ViewType};

const ARRAY_VIEW_NAME: &str = "ArrayView";
const STRUCTURE_VIEW_NAME: &str = "StructureView";

/// Resolves the accessor type of a schema, `None` for atomic nodes without
/// an explicit accessor.
pub fn resolve_view(schema: &Schema) -> SchemaResult<Option<ViewType>> {
    Ok(view_of(&consolidate(schema)?))
}

/// Accessor type of a consolidated node.
pub(crate) fn view_of(node: &Schema) -> Option<ViewType> {
    if let Some(accessor) = node.accessor() {
        return Some(accessor.clone());
    }

    match node {
        Schema::Array(array) => Some(define_array_view(array).into()),
        Schema::Structure(structure) => Some(define_structure_view(structure).into()),
        _ => None,
    }
}

fn view_name(name: Option<&str>, fallback: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fallback.to_string(),
    }
}

/// Synthesizes the accessor type of a consolidated array node.
///
/// The explicit accessor of `array` itself is ignored; the element type
/// decides the access strategy.
pub fn define_array_view(array: &ArrayType) -> ArrayViewType {
    let strategy = match view_of(&array.element_type) {
        None => Strategy::Direct,
        Some(view) if array.element_type.is_atomic() => Strategy::IndirectAtomic(view),
        Some(view) => Strategy::IndirectComposite(view),
    };

    let name = view_name(array.name.as_deref(), ARRAY_VIEW_NAME);
    debug!(name = %name, strategy = ?strategy, "synthesized array view");
    ArrayViewType::new(name, strategy)
}

/// Synthesizes the accessor type of a consolidated structure node.
pub fn define_structure_view(structure: &StructureType) -> StructureViewType {
    let fields: Vec<FieldAccess> = structure
        .canonical_fields()
        .enumerate()
        .map(|(index, field)| {
            let fetch = match view_of(&field.schema) {
                None => Fetch::Direct,
                Some(view) if field.schema.is_atomic() => Fetch::Atomic(view),
                Some(view) => Fetch::Composite(view),
            };
            FieldAccess {
                name: field.name.clone(),
                index,
                fetch,
                read_only: field.read_only,
            }
        })
        .collect();

    let name = view_name(structure.name.as_deref(), STRUCTURE_VIEW_NAME);
    debug!(name = %name, fields = fields.len(), "synthesized structure view");
    StructureViewType::new(name, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ElementKind, FieldDecl, NumberType, Shape, READ_ONLY};
    use crate::view::{Arity, CustomView};

    #[derive(Debug)]
    struct Celsius;

    impl CustomView for Celsius {
        fn name(&self) -> &str {
            "Celsius"
        }

        fn accepts(&self, arity: Arity) -> bool {
            arity == Arity::Cell
        }
    }

    #[test]
    fn test_atomic_has_no_view() {
        assert!(resolve_view(&Schema::number(ElementKind::Int8)).unwrap().is_none());
        assert!(resolve_view(&Schema::object()).unwrap().is_none());
    }

    #[test]
    fn test_explicit_accessor_returned_unchanged() {
        let accessor = ViewType::custom(Celsius);
        let node = Schema::from(NumberType::new(ElementKind::Float32).with_accessor(accessor.clone()));
        assert_eq!(resolve_view(&node).unwrap(), Some(accessor));
    }

    #[test]
    fn test_array_strategies() {
        let direct = resolve_view(&Schema::array(Schema::bool(), 3)).unwrap().unwrap();
        assert!(matches!(direct.as_array().unwrap().strategy(), Strategy::Direct));
        assert_eq!(direct.name(), "ArrayView");

        let atomic = Schema::array(
            NumberType::new(ElementKind::Float32).with_accessor(ViewType::custom(Celsius)),
            3,
        );
        let view = resolve_view(&atomic).unwrap().unwrap();
        assert!(matches!(
            view.as_array().unwrap().strategy(),
            Strategy::IndirectAtomic(_)
        ));

        let nested = Schema::from(
            ArrayType::new(Schema::array(Schema::bool(), 2), Shape::Dims(vec![4])).with_name("Grid"),
        );
        let view = resolve_view(&nested).unwrap().unwrap();
        assert_eq!(view.name(), "Grid");
        let ty = view.as_array().unwrap();
        assert!(matches!(ty.strategy(), Strategy::IndirectComposite(_)));
        assert_eq!(ty.element_view().map(ViewType::name), Some("ArrayView"));
    }

    #[test]
    fn test_structure_fields() {
        let node = Schema::structure(vec![
            FieldDecl::from(("id", Schema::number(ElementKind::UInt32), READ_ONLY)),
            FieldDecl::from(("tags", Schema::array(Schema::bool(), 2))),
        ]);

        let view = resolve_view(&node).unwrap().unwrap();
        let ty = view.as_structure().unwrap();
        assert_eq!(ty.name(), "StructureView");

        let id = ty.field("id").unwrap();
        assert!(id.read_only);
        assert!(matches!(id.fetch, Fetch::Direct));

        let tags = ty.field("tags").unwrap();
        assert_eq!(tags.index, 1);
        assert!(matches!(tags.fetch, Fetch::Composite(_)));
    }

    #[test]
    fn test_repeated_resolution_yields_distinct_types() {
        let node = Schema::array(Schema::bool(), 3);
        let first = resolve_view(&node).unwrap();
        let second = resolve_view(&node).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.unwrap().name(), second.unwrap().name());
    }
}
