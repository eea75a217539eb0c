//! Property-based tests for schema resolution.
//!
//! These tests verify properties that must hold for any well-formed schema:
//! - Consolidation is idempotent and never changes what resolves from a tree
//! - Generated trees always validate
//! - Layouts never contain a one-element shape tuple
//! - Defaults have exactly the nesting their layout describes

use proptest::prelude::*;
use strata::schema::{consolidate, ElementKind, FieldDecl, Shape};
use strata::{resolve_default, resolve_layout, validate, Layout, Schema, Value};

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn numeric_kinds() -> Vec<ElementKind> {
    ElementKind::ALL
        .iter()
        .copied()
        .filter(ElementKind::is_numeric)
        .collect()
}

fn leaf_strategy() -> impl Strategy<Value = Schema> {
    prop_oneof![
        Just(Schema::bool()),
        Just(Schema::object()),
        prop::sample::select(numeric_kinds()).prop_map(Schema::number),
        (0i64..16).prop_map(Schema::bytes),
        (0i64..16).prop_map(Schema::text),
    ]
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (0i64..4).prop_map(Shape::Dim),
        prop::collection::vec(0i64..4, 0..3).prop_map(Shape::Dims),
    ]
}

fn schema_strategy() -> impl Strategy<Value = Schema> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), shape_strategy())
                .prop_map(|(element, shape)| Schema::array(element, shape)),
            prop::collection::vec((inner, any::<bool>()), 0..4).prop_map(|fields| {
                let fields: Vec<FieldDecl> = fields
                    .into_iter()
                    .enumerate()
                    .map(|(i, (schema, read_only))| {
                        FieldDecl::from((format!("f{}", i), schema, read_only))
                    })
                    .collect();
                Schema::structure(fields)
            }),
        ]
    })
}

// =============================================================================
// HELPERS
// =============================================================================

fn has_single_tuple(layout: &Layout) -> bool {
    match layout {
        Layout::Array { element, shape } => {
            matches!(shape, Shape::Dims(dims) if dims.len() == 1) || has_single_tuple(element)
        }
        Layout::Structure(fields) => fields.iter().any(|(_, layout)| has_single_tuple(layout)),
        Layout::Scalar(_) | Layout::Sized { .. } => false,
    }
}

fn matches_dims(value: &Value, dims: &[i64], element: &Layout) -> bool {
    let Some((&first, rest)) = dims.split_first() else {
        return matches_layout(value, element);
    };
    match value.items() {
        Some(items) => {
            items.len() as i64 == first && items.iter().all(|item| matches_dims(item, rest, element))
        }
        None => false,
    }
}

fn matches_layout(value: &Value, layout: &Layout) -> bool {
    match layout {
        Layout::Array { element, shape } => matches_dims(value, &shape.dims(), element),
        Layout::Structure(fields) => match value.items() {
            Some(items) => {
                items.len() == fields.len()
                    && items
                        .iter()
                        .zip(fields)
                        .all(|(item, (_, layout))| matches_layout(item, layout))
            }
            None => false,
        },
        Layout::Scalar(_) | Layout::Sized { .. } => value.items().is_none(),
    }
}

// =============================================================================
// CONSOLIDATION PROPERTY TESTS
// =============================================================================

mod consolidation_properties {
    use super::*;

    proptest! {
        /// Idempotence: consolidate(consolidate(S)) == consolidate(S)
        #[test]
        fn consolidation_is_idempotent(schema in schema_strategy()) {
            let once = consolidate(&schema).unwrap();
            let twice = consolidate(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Resolution does not depend on whether the input was consolidated
        #[test]
        fn consolidation_preserves_resolution(schema in schema_strategy()) {
            let consolidated = consolidate(&schema).unwrap();
            prop_assert_eq!(
                resolve_layout(&schema).unwrap(),
                resolve_layout(&consolidated).unwrap()
            );
            prop_assert_eq!(
                resolve_default(&schema, false).unwrap(),
                resolve_default(&consolidated, false).unwrap()
            );
        }

        /// Every generated tree satisfies the attribute contracts
        #[test]
        fn generated_schemas_validate(schema in schema_strategy()) {
            prop_assert!(validate(&schema).is_ok());
        }
    }
}

// =============================================================================
// RESOLUTION PROPERTY TESTS
// =============================================================================

mod resolution_properties {
    use super::*;

    proptest! {
        /// No layout contains a single-dimension shape tuple at any depth
        #[test]
        fn layouts_collapse_single_dimensions(schema in schema_strategy()) {
            let layout = resolve_layout(&schema).unwrap();
            prop_assert!(!has_single_tuple(&layout), "layout {} kept a one-element tuple", layout);
        }

        /// Defaults nest exactly as deep and as wide as their layout
        #[test]
        fn defaults_follow_layout(schema in schema_strategy(), listify in any::<bool>()) {
            let layout = resolve_layout(&schema).unwrap();
            let default = resolve_default(&schema, listify).unwrap();
            prop_assert!(matches_layout(&default, &layout), "default {} does not fit {}", default, layout);
        }
    }
}
