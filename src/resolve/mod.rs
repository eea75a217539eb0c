//! Schema resolution
//!
//! `resolve` turns a schema into everything needed to work with a buffer of
//! records:
//! - a layout descriptor, for allocating the buffer
//! - a default value, for filling it
//! - an array accessor type, for reading and writing it
//!
//! The schema describes one element. The accessor always treats it as the
//! element type of an implicit unbounded array, so it is array-like even for
//! a single repeated record.
//!
//! Nothing is cached: every call synthesizes new accessor types.

mod default;
mod layout;
mod options;
mod view;

pub use default::resolve_default;
pub use layout::{resolve_layout, Layout};
pub use options::ResolveOptions;
pub use view::{define_array_view, define_structure_view, resolve_view};

use tracing::debug;

use crate::buffer::{Data, MemoryBuffer};
use crate::schema::{consolidate, validate, ArrayType, Attr, Schema, SchemaError, SchemaResult, Shape};
use crate::value::Value;
use crate::view::{ArrayView, ArrayViewType, ViewData, ViewType};

/// Dimension of the implicit root array.
const UNBOUNDED: i64 = -1;

/// Output of [`resolve`].
#[derive(Debug, Clone)]
pub struct Resolved {
    pub layout: Layout,
    pub default: Value,
    /// Accessor type of a buffer of elements
    pub view: ArrayViewType,
}

impl Resolved {
    /// Wraps a buffer of elements.
    pub fn wrap(&self, data: Data) -> ArrayView {
        self.view.wrap(data)
    }

    /// Creates an in-memory buffer of `count` default elements.
    pub fn new_buffer(&self, count: usize) -> MemoryBuffer {
        MemoryBuffer::filled(count, &self.default)
    }
}

/// Resolves a schema into its layout, default value and accessor type.
///
/// The schema is consolidated once and all three resolvers run on the
/// consolidated tree.
///
/// # Errors
///
/// Returns the first validation error when `options.check` is set, or a
/// default that cannot be coerced into its element kind.
pub fn resolve(schema: &Schema, options: &ResolveOptions) -> SchemaResult<Resolved> {
    if options.check {
        validate(schema)?;
    }

    let node = consolidate(schema)?;
    let layout = layout::layout_of(&node);
    let default = default::default_of(&node, options.listify_default, "")?;

    let root = ArrayType {
        element_type: Box::new(node),
        shape: Shape::Dim(UNBOUNDED),
        name: options.name.clone(),
        accessor: None,
    };
    let view = define_array_view(&root);

    debug!(
        view = %view.name(),
        layout = %layout,
        item_size = ?layout.item_size(),
        "resolved schema"
    );

    Ok(Resolved {
        layout,
        default,
        view,
    })
}

/// Returns a copy of `schema` with the given attributes replaced.
///
/// The original node is left untouched.
///
/// # Errors
///
/// Fails with `STRATA_SCHEMA_UNKNOWN_ATTRIBUTE`, naming every offending
/// name, if any attribute does not exist on the node's variant.
pub fn update<'a>(
    schema: &Schema,
    overrides: impl IntoIterator<Item = (&'a str, Attr)>,
) -> SchemaResult<Schema> {
    let overrides: Vec<(&str, Attr)> = overrides.into_iter().collect();
    let kind = schema.kind();

    let unknown: Vec<&str> = overrides
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| !kind.attributes().iter().any(|attr| attr == name))
        .collect();
    if !unknown.is_empty() {
        return Err(SchemaError::unknown_attributes(kind, &unknown));
    }

    overrides
        .into_iter()
        .try_fold(schema.clone(), |node, (name, value)| node.replace(name, value))
}

/// Returns the buffer an accessor instance wraps.
///
/// `None` for anything that does not wrap a buffer.
pub fn get_data<V: ViewData + ?Sized>(view: &V) -> Option<Data> {
    view.view_data()
}

/// Returns the element accessor an array accessor type was specialized with.
///
/// `None` for direct-access arrays and for non-array accessor types.
pub fn get_element_view(view: &ViewType) -> Option<ViewType> {
    view.as_array().and_then(|ty| ty.element_view().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ElementKind, FieldDecl, NumberType, SchemaErrorCode};
    use crate::view::Strategy;

    #[test]
    fn test_root_view_is_array_like() {
        let resolved = resolve(&Schema::number(ElementKind::Int32), &ResolveOptions::default()).unwrap();
        assert_eq!(resolved.view.name(), "ArrayView");
        assert!(matches!(resolved.view.strategy(), Strategy::Direct));
        assert_eq!(resolved.layout, Layout::Scalar(ElementKind::Int32));
    }

    #[test]
    fn test_root_name() {
        let node = Schema::structure(vec![FieldDecl::from(("a", Schema::bool()))]);
        let resolved = resolve(&node, &ResolveOptions::named("Records")).unwrap();
        assert_eq!(resolved.view.name(), "Records");
        assert!(matches!(resolved.view.strategy(), Strategy::IndirectComposite(_)));
    }

    #[test]
    fn test_check_rejects_invalid_schema() {
        let node = Schema::text(-1);
        assert!(resolve(&node, &ResolveOptions::default()).is_err());
    }

    #[test]
    fn test_update_replaces_attributes() {
        let node = Schema::number(ElementKind::Int32);
        let updated = update(&node, [("default", Attr::from(5)), ("kind", Attr::from(ElementKind::Int64))]).unwrap();

        let expected = Schema::from(NumberType::new(ElementKind::Int64).with_default(5));
        assert_eq!(updated, expected);
        assert_eq!(node, Schema::number(ElementKind::Int32));
    }

    #[test]
    fn test_update_rejects_unknown_names() {
        let err = update(
            &Schema::bool(),
            [("shape", Attr::from(2)), ("default", Attr::Value(Value::Bool(true))), ("name", Attr::from("x"))],
        )
        .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::StrataSchemaUnknownAttribute);
        assert_eq!(err.message(), "Got unexpected field names for 'Bool': 'shape', and 'name'.");
    }

    #[test]
    fn test_get_element_view() {
        let direct = ViewType::from(resolve(&Schema::bool(), &ResolveOptions::default()).unwrap().view);
        assert!(get_element_view(&direct).is_none());

        let nested = resolve(&Schema::array(Schema::bool(), 2), &ResolveOptions::default()).unwrap();
        let element = get_element_view(&ViewType::from(nested.view)).unwrap();
        assert_eq!(element.name(), "ArrayView");
    }
}
