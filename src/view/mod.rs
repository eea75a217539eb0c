//! Accessor types and instances
//!
//! An accessor type ([`ViewType`]) describes how to read a buffer; wrapping a
//! buffer handle with it yields an accessor instance. Array and structure
//! accessor types are synthesized by the view resolver as closure-free
//! dispatch tables. Caller-supplied accessors implement [`CustomView`].
//!
//! Accessors hold a shared handle to the caller's buffer and copy nothing on
//! read. There is no synchronization: concurrent mutation through several
//! accessors over the same buffer is up to the caller.

mod errors;

pub use errors::{ViewError, ViewResult};

use std::any::Any;
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::buffer::{same_buffer, Data};
use crate::value::{items_loose_eq, Value};

/// Constructor forms an accessor type can be invoked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// `(data, index)`: wraps one atomic cell of its owning buffer
    Cell,
    /// `(data)`: wraps a whole buffer segment
    Segment,
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Cell => write!(f, "(data, index)"),
            Arity::Segment => write!(f, "(data)"),
        }
    }
}

/// A caller-supplied accessor type.
///
/// Implementations declare which constructor forms they accept and override
/// the matching `wrap_*` method. The resolver never inspects what the
/// produced element does.
pub trait CustomView: fmt::Debug {
    /// Display name of the accessor type.
    fn name(&self) -> &str;

    fn accepts(&self, arity: Arity) -> bool;

    /// Wraps cell `index` of `data`.
    fn wrap_cell(&self, data: Data, index: usize) -> ViewResult<Element> {
        let _ = (data, index);
        Err(ViewError::UnsupportedArity {
            view: self.name().to_string(),
            arity: Arity::Cell,
        })
    }

    /// Wraps the whole `data` segment.
    fn wrap_segment(&self, data: Data) -> ViewResult<Element> {
        let _ = data;
        Err(ViewError::UnsupportedArity {
            view: self.name().to_string(),
            arity: Arity::Segment,
        })
    }
}

/// An instance produced by a [`CustomView`].
pub trait CustomElement: fmt::Display + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    /// Buffer the element wraps, if it exposes one.
    fn data(&self) -> Option<Data> {
        None
    }

    /// Equality against another custom element; `None` when not comparable.
    fn try_eq(&self, other: &dyn CustomElement) -> Option<bool> {
        let _ = other;
        None
    }
}

/// An accessor type.
///
/// Equality is identity: two synthesized types with the same structure and
/// name are still distinct.
#[derive(Clone)]
pub enum ViewType {
    Array(ArrayViewType),
    Structure(StructureViewType),
    Custom(Rc<dyn CustomView>),
}

impl ViewType {
    pub fn custom(view: impl CustomView + 'static) -> Self {
        ViewType::Custom(Rc::new(view))
    }

    /// Display name of the accessor type.
    pub fn name(&self) -> &str {
        match self {
            ViewType::Array(ty) => ty.name(),
            ViewType::Structure(ty) => ty.name(),
            ViewType::Custom(view) => view.name(),
        }
    }

    /// Synthesized types only accept whole segments.
    pub fn accepts(&self, arity: Arity) -> bool {
        match self {
            ViewType::Array(_) | ViewType::Structure(_) => arity == Arity::Segment,
            ViewType::Custom(view) => view.accepts(arity),
        }
    }

    /// Invokes the `(data, index)` constructor.
    pub fn wrap_cell(&self, data: Data, index: usize) -> ViewResult<Element> {
        match self {
            ViewType::Custom(view) => view.wrap_cell(data, index),
            _ => Err(ViewError::UnsupportedArity {
                view: self.name().to_string(),
                arity: Arity::Cell,
            }),
        }
    }

    /// Invokes the `(data)` constructor.
    pub fn wrap_segment(&self, data: Data) -> ViewResult<Element> {
        match self {
            ViewType::Array(ty) => Ok(Element::Array(ty.wrap(data))),
            ViewType::Structure(ty) => Ok(Element::Structure(ty.wrap(data))),
            ViewType::Custom(view) => view.wrap_segment(data),
        }
    }

    pub fn as_array(&self) -> Option<&ArrayViewType> {
        match self {
            ViewType::Array(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&StructureViewType> {
        match self {
            ViewType::Structure(ty) => Some(ty),
            _ => None,
        }
    }
}

impl PartialEq for ViewType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ViewType::Array(a), ViewType::Array(b)) => a == b,
            (ViewType::Structure(a), ViewType::Structure(b)) => a == b,
            (ViewType::Custom(a), ViewType::Custom(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewType::Array(ty) => fmt::Debug::fmt(ty, f),
            ViewType::Structure(ty) => fmt::Debug::fmt(ty, f),
            ViewType::Custom(view) => fmt::Debug::fmt(view, f),
        }
    }
}

impl From<ArrayViewType> for ViewType {
    fn from(ty: ArrayViewType) -> Self {
        ViewType::Array(ty)
    }
}

impl From<StructureViewType> for ViewType {
    fn from(ty: StructureViewType) -> Self {
        ViewType::Structure(ty)
    }
}

/// How an array accessor produces its elements.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Cells are returned verbatim
    Direct,
    /// Each `(data, index)` pair goes through the element accessor
    IndirectAtomic(ViewType),
    /// Each element segment goes through the element accessor
    IndirectComposite(ViewType),
}

#[derive(Debug)]
struct ArrayViewDef {
    name: String,
    strategy: Strategy,
}

/// Synthesized accessor type of an array.
#[derive(Clone)]
pub struct ArrayViewType(Rc<ArrayViewDef>);

impl ArrayViewType {
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self(Rc::new(ArrayViewDef {
            name: name.into(),
            strategy,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn strategy(&self) -> &Strategy {
        &self.0.strategy
    }

    /// Element accessor the type was specialized with, `None` for direct access.
    pub fn element_view(&self) -> Option<&ViewType> {
        match &self.0.strategy {
            Strategy::Direct => None,
            Strategy::IndirectAtomic(view) | Strategy::IndirectComposite(view) => Some(view),
        }
    }

    /// Creates an accessor instance over `data`.
    pub fn wrap(&self, data: Data) -> ArrayView {
        ArrayView {
            ty: self.clone(),
            data,
        }
    }
}

impl PartialEq for ArrayViewType {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ArrayViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayViewType")
            .field("name", &self.0.name)
            .field("strategy", &self.0.strategy)
            .finish()
    }
}

/// How a structure field is fetched.
#[derive(Debug, Clone)]
pub enum Fetch {
    /// The cell itself
    Direct,
    /// `(data, index)` through the field accessor
    Atomic(ViewType),
    /// The field segment through the field accessor
    Composite(ViewType),
}

/// Accessor of a single structure field.
#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub name: String,
    /// Position of the field cell in the structure buffer
    pub index: usize,
    pub fetch: Fetch,
    /// No setter exists for read-only fields
    pub read_only: bool,
}

#[derive(Debug)]
struct StructureViewDef {
    name: String,
    fields: Vec<FieldAccess>,
}

/// Synthesized accessor type of a structure.
#[derive(Clone)]
pub struct StructureViewType(Rc<StructureViewDef>);

impl StructureViewType {
    pub fn new(name: impl Into<String>, fields: Vec<FieldAccess>) -> Self {
        Self(Rc::new(StructureViewDef {
            name: name.into(),
            fields,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn fields(&self) -> &[FieldAccess] {
        &self.0.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldAccess> {
        self.0.fields.iter().find(|field| field.name == name)
    }

    /// Creates an accessor instance over `data`.
    pub fn wrap(&self, data: Data) -> StructureView {
        StructureView {
            ty: self.clone(),
            data,
        }
    }
}

impl PartialEq for StructureViewType {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for StructureViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureViewType")
            .field("name", &self.0.name)
            .field("fields", &self.0.fields)
            .finish()
    }
}

fn compare_buffers(a: &Data, b: &Data) -> bool {
    if same_buffer(a, b) {
        return true;
    }
    match (a.values(), b.values()) {
        (Ok(a), Ok(b)) => items_loose_eq(&a, &b),
        _ => false,
    }
}

/// Array accessor instance.
#[derive(Clone)]
pub struct ArrayView {
    ty: ArrayViewType,
    data: Data,
}

impl ArrayView {
    pub fn view_type(&self) -> &ArrayViewType {
        &self.ty
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_index(&self, index: usize) -> ViewResult<()> {
        let len = self.len();
        if index >= len {
            return Err(ViewError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    /// Returns element `index`, wrapped according to the type's strategy.
    pub fn get(&self, index: usize) -> ViewResult<Element> {
        self.check_index(index)?;
        match self.ty.strategy() {
            Strategy::Direct => Ok(Element::Cell(self.data.get(index)?)),
            Strategy::IndirectAtomic(view) => view.wrap_cell(Rc::clone(&self.data), index),
            Strategy::IndirectComposite(view) => view.wrap_segment(self.data.segment(index)?),
        }
    }

    /// Assigns cell `index` directly, whatever the strategy.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> ViewResult<()> {
        self.check_index(index)?;
        self.data.set(index, value.into())
    }

    /// Lazy iteration over the elements. Every call starts a fresh,
    /// independent pass.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            view: self,
            next: 0,
            end: self.len(),
        }
    }

    /// Returns whether any cell equals `item` or, recursively, contains it.
    ///
    /// # Errors
    ///
    /// Fails when the buffer cannot be read.
    pub fn contains(&self, item: &Value) -> ViewResult<bool> {
        let cells = self.data.values()?;
        Ok(cells.iter().any(|cell| cell.contains(item)))
    }

    /// Compares underlying buffers. Views of different strategies are not
    /// comparable.
    pub fn try_eq(&self, other: &ArrayView) -> Option<bool> {
        if mem::discriminant(self.ty.strategy()) != mem::discriminant(other.ty.strategy()) {
            return None;
        }
        Some(compare_buffers(&self.data, &other.data))
    }
}

impl PartialEq for ArrayView {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other) == Some(true)
    }
}

impl fmt::Display for ArrayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, element) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let element = element.map_err(|_| fmt::Error)?;
            write!(f, "{}", element)?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for ArrayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayView")
            .field("type", &self.ty.name())
            .field("data", &self.data)
            .finish()
    }
}

impl<'a> IntoIterator for &'a ArrayView {
    type Item = ViewResult<Element>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of an [`ArrayView`].
pub struct Iter<'a> {
    view: &'a ArrayView,
    next: usize,
    end: usize,
}

impl Iterator for Iter<'_> {
    type Item = ViewResult<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.view.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

/// Structure accessor instance.
#[derive(Clone)]
pub struct StructureView {
    ty: StructureViewType,
    data: Data,
}

impl StructureView {
    pub fn view_type(&self) -> &StructureViewType {
        &self.ty
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.ty.fields().iter().map(|field| field.name.as_str())
    }

    fn access(&self, field: &str) -> ViewResult<&FieldAccess> {
        self.ty.field(field).ok_or_else(|| ViewError::NoSuchField {
            view: self.ty.name().to_string(),
            field: field.to_string(),
        })
    }

    /// Reads a field.
    pub fn get(&self, field: &str) -> ViewResult<Element> {
        let access = self.access(field)?;
        match &access.fetch {
            Fetch::Direct => Ok(Element::Cell(self.data.get(access.index)?)),
            Fetch::Atomic(view) => view.wrap_cell(Rc::clone(&self.data), access.index),
            Fetch::Composite(view) => view.wrap_segment(self.data.segment(access.index)?),
        }
    }

    /// Assigns a field cell.
    ///
    /// # Errors
    ///
    /// `ViewError::ReadOnlyField` if the field is read-only.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> ViewResult<()> {
        let access = self.access(field)?;
        if access.read_only {
            return Err(ViewError::ReadOnlyField {
                view: self.ty.name().to_string(),
                field: field.to_string(),
            });
        }
        self.data.set(access.index, value.into())
    }

    /// Compares underlying buffers.
    pub fn try_eq(&self, other: &StructureView) -> Option<bool> {
        Some(compare_buffers(&self.data, &other.data))
    }
}

impl PartialEq for StructureView {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other) == Some(true)
    }
}

impl fmt::Display for StructureView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.ty.name())?;
        for (i, field) in self.ty.fields().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let value = self.get(&field.name).map_err(|_| fmt::Error)?;
            write!(f, "{}={}", field.name, value)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for StructureView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureView")
            .field("type", &self.ty.name())
            .field("data", &self.data)
            .finish()
    }
}

/// What an index or field fetch yields.
#[derive(Debug)]
pub enum Element {
    /// A buffer cell, returned verbatim
    Cell(Value),
    Array(ArrayView),
    Structure(StructureView),
    /// An instance of a caller-supplied accessor
    Custom(Box<dyn CustomElement>),
}

impl Element {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Element::Cell(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Element::Cell(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayView> {
        match self {
            Element::Array(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&StructureView> {
        match self {
            Element::Structure(view) => Some(view),
            _ => None,
        }
    }

    /// Downcasts a custom element to its concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Element::Custom(element) => element.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Equality against another element; `None` when not comparable.
    pub fn try_eq(&self, other: &Element) -> Option<bool> {
        match (self, other) {
            (Element::Cell(a), Element::Cell(b)) => Some(a.loose_eq(b)),
            (Element::Array(a), Element::Array(b)) => a.try_eq(b),
            (Element::Structure(a), Element::Structure(b)) => a.try_eq(b),
            (Element::Custom(a), Element::Custom(b)) => a.try_eq(&**b),
            _ => None,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other) == Some(true)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Cell(value) => write!(f, "{}", value),
            Element::Array(view) => write!(f, "{}", view),
            Element::Structure(view) => write!(f, "{}", view),
            Element::Custom(element) => write!(f, "{}", element),
        }
    }
}

/// Things that may wrap a buffer.
pub trait ViewData {
    /// Buffer handle being wrapped, `None` for anything this crate did not
    /// produce.
    fn view_data(&self) -> Option<Data>;
}

impl ViewData for ArrayView {
    fn view_data(&self) -> Option<Data> {
        Some(Rc::clone(&self.data))
    }
}

impl ViewData for StructureView {
    fn view_data(&self) -> Option<Data> {
        Some(Rc::clone(&self.data))
    }
}

impl ViewData for Element {
    fn view_data(&self) -> Option<Data> {
        match self {
            Element::Cell(_) => None,
            Element::Array(view) => view.view_data(),
            Element::Structure(view) => view.view_data(),
            Element::Custom(element) => element.data(),
        }
    }
}

impl ViewData for Value {
    fn view_data(&self) -> Option<Data> {
        None
    }
}
